// crates/lf_decompose/src/field_decomposer.rs

//! 场分解
//!
//! 把全局单元值与面值按子域映射拆开。输出是普通数组，由各 rank 在
//! 自己的线程中用本地网格构造场；场构造会经通信器交换界面值，
//! 所以不能在一个线程里为全部 rank 构造。
//!
//! 面值分解时，处理器面取对应全局面的值：来自内部面的取内部值，
//! 来自周期面的取该周期边界片上的值。有向量（通量）在反向面上取负。

use std::sync::Arc;

use lf_foundation::{DimensionSet, FieldValue};
use lf_matrix::{GeometricField, SurfaceField};
use lf_mesh::{GeoMesh, MeshError};

use crate::decomposition::ProcessorDomain;
use crate::error::{DecomposeError, DecomposeResult};

/// 子域上的面值
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposedSurface<T> {
    /// 本地内部面值
    pub internal: Vec<T>,
    /// 每个本地边界片的面值（含处理器边界片）
    pub boundary: Vec<Vec<T>>,
}

impl<T: FieldValue> DecomposedSurface<T> {
    /// 在本地网格上构造面场
    pub fn into_field(
        self,
        name: impl Into<String>,
        dimensions: DimensionSet,
        mesh: Arc<GeoMesh>,
    ) -> DecomposeResult<SurfaceField<T>> {
        Ok(SurfaceField::new(name, dimensions, mesh, self.internal, self.boundary)?)
    }
}

/// 场分解器
#[derive(Debug)]
pub struct FieldDecomposer<'a> {
    mesh: &'a GeoMesh,
    domains: &'a [ProcessorDomain],
    /// 全局边界面 -> (边界片, 片内编号)
    boundary_faces: Vec<(usize, usize)>,
}

impl<'a> FieldDecomposer<'a> {
    /// 创建分解器
    pub fn new(mesh: &'a GeoMesh, domains: &'a [ProcessorDomain]) -> Self {
        let boundary_faces = mesh
            .boundary()
            .iter()
            .enumerate()
            .flat_map(|(p, patch)| (0..patch.size()).map(move |j| (p, j)))
            .collect();
        Self {
            mesh,
            domains,
            boundary_faces,
        }
    }

    /// 子域
    #[inline]
    pub fn domains(&self) -> &[ProcessorDomain] {
        self.domains
    }

    /// 分解单元值
    pub fn decompose_cells<T: Copy>(&self, values: &[T]) -> DecomposeResult<Vec<Vec<T>>> {
        DecomposeError::check_size("单元值", self.mesh.n_cells(), values.len())?;
        Ok(self
            .domains
            .iter()
            .map(|d| d.cell_addressing().iter().map(|&c| values[c]).collect())
            .collect())
    }

    /// 分解体场的内部值
    pub fn decompose_field<T: FieldValue>(&self, field: &GeometricField<T>) -> DecomposeResult<Vec<Vec<T>>> {
        self.decompose_cells(field.internal())
    }

    /// 分解全局边界片上的值，每个子域得到其本地同名边界片的值
    pub fn decompose_patch<T: Copy>(&self, patch: usize, values: &[T]) -> DecomposeResult<Vec<Vec<T>>> {
        let global = self
            .mesh
            .boundary()
            .patch(patch)
            .ok_or_else(|| MeshError::patch(format!("#{}", patch), "边界片编号超出范围"))?;
        DecomposeError::check_size(&format!("边界片 '{}' 的值", global.name), global.size(), values.len())?;
        Ok(self
            .domains
            .iter()
            .map(|d| {
                let Some(local) = d.local_patch(patch) else {
                    return Vec::new();
                };
                let lp = &d.boundary()[local];
                (0..lp.size())
                    .map(|k| {
                        let (g, _) = d.maps().global_face(lp.start + k);
                        values[g - global.start]
                    })
                    .collect()
            })
            .collect())
    }

    /// 分解面值
    ///
    /// `oriented` 为真时按面方向取负（通量），否则原样复制（面系数）。
    pub fn decompose_surface<T: FieldValue>(
        &self,
        internal: &[T],
        boundary: &[Vec<T>],
        oriented: bool,
    ) -> DecomposeResult<Vec<DecomposedSurface<T>>> {
        let n_internal = self.mesh.n_internal_faces();
        DecomposeError::check_size("内部面值", n_internal, internal.len())?;
        DecomposeError::check_size("边界片数", self.mesh.boundary().len(), boundary.len())?;
        for (patch, values) in self.mesh.boundary().iter().zip(boundary) {
            DecomposeError::check_size(&format!("边界片 '{}' 的面值", patch.name), patch.size(), values.len())?;
        }

        let value = |d: &ProcessorDomain, local_face: usize| -> T {
            let (g, flipped) = d.maps().global_face(local_face);
            let v = if g < n_internal {
                internal[g]
            } else {
                let (p, j) = self.boundary_faces[g - n_internal];
                boundary[p][j]
            };
            if flipped && oriented {
                -v
            } else {
                v
            }
        };

        Ok(self
            .domains
            .iter()
            .map(|d| DecomposedSurface {
                internal: (0..d.n_internal_faces()).map(|f| value(d, f)).collect(),
                boundary: d
                    .boundary()
                    .iter()
                    .map(|p| (p.start..p.start + p.size()).map(|f| value(d, f)).collect())
                    .collect(),
            })
            .collect())
    }

    /// 分解面场
    pub fn decompose_surface_field<T: FieldValue>(
        &self,
        field: &SurfaceField<T>,
        oriented: bool,
    ) -> DecomposeResult<Vec<DecomposedSurface<T>>> {
        self.decompose_surface(field.internal(), field.boundary(), oriented)
    }
}
