// crates/lf_mesh/src/geo_mesh.rs

//! 几何网格
//!
//! `GeoMesh` 组合了连接关系、边界片、单元度量与面几何，并持有本进程的
//! 通信器与耦合界面。体网格用于有限体积方程，面网格用于有限面积方程；
//! 两者只在度量的量纲上不同。

use std::fmt;
use std::sync::Arc;

use glam::DVec3;
use lf_foundation::{Communicator, DimensionSet, SerialComm};

use crate::addressing::LduAddressing;
use crate::error::{MeshError, MeshResult};
use crate::interface::{CyclicInterface, LduInterface, ProcessorInterface};
use crate::patch::{BoundaryMesh, PatchKind};

/// 网格类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeshKind {
    /// 体网格（有限体积）
    #[default]
    Volume,
    /// 面网格（有限面积）
    Area,
}

impl MeshKind {
    /// 单元度量量纲：体积或面积
    pub fn measure_dims(self) -> DimensionSet {
        match self {
            Self::Volume => DimensionSet::VOLUME,
            Self::Area => DimensionSet::AREA,
        }
    }

    /// 面度量量纲：面积或边长
    pub fn face_measure_dims(self) -> DimensionSet {
        match self {
            Self::Volume => DimensionSet::AREA,
            Self::Area => DimensionSet::LENGTH,
        }
    }

    /// 距离系数量纲
    pub fn delta_dims(self) -> DimensionSet {
        DimensionSet::LENGTH.pow(-1)
    }
}

/// 内部几何数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    /// 单元度量（体积或面积）
    pub cell_measures: Vec<f64>,
    /// 单元中心
    pub cell_centres: Vec<DVec3>,
    /// 内部面面积（面网格为边长）
    pub face_mags: Vec<f64>,
    /// 内部面距离系数 1/|d|
    pub delta_coeffs: Vec<f64>,
    /// 内部面 owner 侧插值权重
    pub weights: Vec<f64>,
}

/// 几何网格
pub struct GeoMesh {
    kind: MeshKind,
    addressing: Arc<LduAddressing>,
    geometry: MeshGeometry,
    boundary: BoundaryMesh,
    comm: Arc<dyn Communicator>,
    interfaces: Vec<Option<Arc<dyn LduInterface>>>,
}

impl GeoMesh {
    /// 创建几何网格，并为耦合边界片建立界面
    pub fn new(
        kind: MeshKind,
        addressing: LduAddressing,
        geometry: MeshGeometry,
        boundary: BoundaryMesh,
        comm: Arc<dyn Communicator>,
    ) -> MeshResult<Self> {
        let n_cells = addressing.n_cells();
        let n_faces = addressing.n_faces();
        MeshError::check_geometry("cell_measures", n_cells, geometry.cell_measures.len())?;
        MeshError::check_geometry("cell_centres", n_cells, geometry.cell_centres.len())?;
        MeshError::check_geometry("face_mags", n_faces, geometry.face_mags.len())?;
        MeshError::check_geometry("delta_coeffs", n_faces, geometry.delta_coeffs.len())?;
        MeshError::check_geometry("weights", n_faces, geometry.weights.len())?;
        if let Some(p) = boundary.iter().find(|p| p.start < n_faces) {
            return Err(MeshError::patch(&p.name, "起始面编号落在内部面范围内"));
        }

        let mut interfaces: Vec<Option<Arc<dyn LduInterface>>> = Vec::with_capacity(boundary.len());
        for (i, patch) in boundary.iter().enumerate() {
            let iface: Option<Arc<dyn LduInterface>> = match &patch.kind {
                PatchKind::Cyclic { neighbour_patch } => Some(Arc::new(CyclicInterface::new(
                    i,
                    patch.face_cells.clone(),
                    boundary[*neighbour_patch].face_cells.clone(),
                ))),
                PatchKind::Processor { my_rank, neighb_rank } => {
                    if *my_rank != comm.rank() {
                        return Err(MeshError::patch(
                            &patch.name,
                            format!("本进程号 {} 与通信器 rank {} 不一致", my_rank, comm.rank()),
                        ));
                    }
                    Some(Arc::new(ProcessorInterface::new(
                        i,
                        patch.face_cells.clone(),
                        *neighb_rank,
                        Arc::clone(&comm),
                    )))
                }
                PatchKind::Patch | PatchKind::Wall => None,
            };
            interfaces.push(iface);
        }

        log::debug!(
            "GeoMesh({:?}): {} 个单元, {} 个内部面, {} 个边界片, rank {}/{}",
            kind,
            n_cells,
            n_faces,
            boundary.len(),
            comm.rank(),
            comm.n_procs()
        );

        Ok(Self {
            kind,
            addressing: Arc::new(addressing),
            geometry,
            boundary,
            comm,
            interfaces,
        })
    }

    /// 使用串行通信器创建
    pub fn serial(
        kind: MeshKind,
        addressing: LduAddressing,
        geometry: MeshGeometry,
        boundary: BoundaryMesh,
    ) -> MeshResult<Self> {
        Self::new(kind, addressing, geometry, boundary, Arc::new(SerialComm::new()))
    }

    /// 网格类别
    #[inline]
    pub fn kind(&self) -> MeshKind {
        self.kind
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.addressing.n_cells()
    }

    /// 内部面数
    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.addressing.n_faces()
    }

    /// 连接关系
    #[inline]
    pub fn addressing(&self) -> &LduAddressing {
        &self.addressing
    }

    /// 共享的连接关系
    #[inline]
    pub fn addressing_arc(&self) -> &Arc<LduAddressing> {
        &self.addressing
    }

    /// 几何数据
    #[inline]
    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    /// 单元度量
    #[inline]
    pub fn measures(&self) -> &[f64] {
        &self.geometry.cell_measures
    }

    /// 单元中心
    #[inline]
    pub fn cell_centres(&self) -> &[DVec3] {
        &self.geometry.cell_centres
    }

    /// 内部面面积
    #[inline]
    pub fn face_mags(&self) -> &[f64] {
        &self.geometry.face_mags
    }

    /// 内部面距离系数
    #[inline]
    pub fn delta_coeffs(&self) -> &[f64] {
        &self.geometry.delta_coeffs
    }

    /// 内部面插值权重
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.geometry.weights
    }

    /// 边界网格
    #[inline]
    pub fn boundary(&self) -> &BoundaryMesh {
        &self.boundary
    }

    /// 通信器
    #[inline]
    pub fn comm(&self) -> &Arc<dyn Communicator> {
        &self.comm
    }

    /// 每个边界片的耦合界面（非耦合为 `None`）
    #[inline]
    pub fn interfaces(&self) -> &[Option<Arc<dyn LduInterface>>] {
        &self.interfaces
    }

    /// 单元度量量纲
    #[inline]
    pub fn measure_dims(&self) -> DimensionSet {
        self.kind.measure_dims()
    }

    /// 全局单元总数
    pub fn global_n_cells(&self) -> lf_foundation::LfResult<usize> {
        let n = self.comm.all_reduce_sum(self.n_cells() as f64)?;
        Ok(n.round() as usize)
    }
}

impl fmt::Debug for GeoMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoMesh")
            .field("kind", &self.kind)
            .field("n_cells", &self.n_cells())
            .field("n_internal_faces", &self.n_internal_faces())
            .field("n_patches", &self.boundary.len())
            .field("rank", &self.comm.rank())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Patch;

    #[test]
    fn test_geometry_size_check() {
        let addr = LduAddressing::new(2, vec![0], vec![1]).unwrap();
        let geometry = MeshGeometry {
            cell_measures: vec![1.0],
            cell_centres: vec![DVec3::ZERO; 2],
            face_mags: vec![1.0],
            delta_coeffs: vec![1.0],
            weights: vec![0.5],
        };
        let err = GeoMesh::serial(MeshKind::Volume, addr, geometry, BoundaryMesh::default())
            .unwrap_err();
        assert!(matches!(err, MeshError::GeometryMismatch { what: "cell_measures", .. }));
    }

    #[test]
    fn test_processor_rank_check() {
        let addr = LduAddressing::disconnected(1);
        let geometry = MeshGeometry {
            cell_measures: vec![1.0],
            cell_centres: vec![DVec3::ZERO],
            ..Default::default()
        };
        let patch = Patch::new(
            "procBoundary1to0",
            PatchKind::Processor { my_rank: 1, neighb_rank: 0 },
            vec![0],
            vec![1.0],
            vec![1.0],
        );
        let boundary = BoundaryMesh::new(vec![patch], 1, 0).unwrap();
        assert!(GeoMesh::serial(MeshKind::Volume, addr, geometry, boundary).is_err());
    }

    #[test]
    fn test_measure_dims() {
        assert_eq!(MeshKind::Volume.measure_dims(), DimensionSet::VOLUME);
        assert_eq!(MeshKind::Area.face_measure_dims(), DimensionSet::LENGTH);
    }
}
