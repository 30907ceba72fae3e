// crates/lf_decompose/src/decomposition.rs

//! 网格分解
//!
//! 给定单元到 rank 的分配表，把全局网格拆成每个 rank 一个
//! [`ProcessorDomain`]：
//!
//! - 单元按全局编号升序重新编号，两端都在本 rank 的内部面保持全局顺序
//! - 边界片先是全部全局边界片（可能为空），顺序与全局一致，
//!   随后是按相邻 rank 升序排列的处理器边界片
//! - 跨 rank 的内部面与跨 rank 的周期面对成为处理器面；两侧按相同的
//!   全局键排序，保证交换数组逐面对应
//!
//! 映射关系：
//!
//! - `cell_addressing[local] = global`
//! - `face_addressing[local]` 为带符号、从 1 开始的全局面编号，
//!   负号表示本地面方向与全局相反（本 rank 持有全局 neighbour）
//! - `boundary_addressing[local patch]` 为全局边界片编号，处理器边界片为 `None`

use std::collections::BTreeMap;
use std::sync::Arc;

use lf_foundation::Communicator;
use lf_mesh::{BoundaryMesh, GeoMesh, LduAddressing, MeshError, MeshGeometry, MeshKind, Patch, PatchKind};
use serde::{Deserialize, Serialize};

use crate::error::{DecomposeError, DecomposeResult};

/// 子域到全局网格的映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionMaps {
    /// 本地单元的全局编号
    pub cell_addressing: Vec<usize>,
    /// 本地面（内部面在前，边界面按边界片顺序在后）的带符号全局面编号，从 1 开始
    pub face_addressing: Vec<isize>,
    /// 本地边界片对应的全局边界片
    pub boundary_addressing: Vec<Option<usize>>,
}

impl DecompositionMaps {
    /// 本地面对应的全局面编号（从 0 开始）与是否反向
    #[inline]
    pub fn global_face(&self, local_face: usize) -> (usize, bool) {
        let a = self.face_addressing[local_face];
        (a.unsigned_abs() - 1, a < 0)
    }
}

/// 单个 rank 的子域
#[derive(Debug, Clone)]
pub struct ProcessorDomain {
    rank: usize,
    n_procs: usize,
    kind: MeshKind,
    addressing: LduAddressing,
    geometry: MeshGeometry,
    boundary: BoundaryMesh,
    maps: DecompositionMaps,
}

impl ProcessorDomain {
    /// 所属 rank
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// 进程总数
    #[inline]
    pub fn n_procs(&self) -> usize {
        self.n_procs
    }

    /// 本地单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.addressing.n_cells()
    }

    /// 本地内部面数
    #[inline]
    pub fn n_internal_faces(&self) -> usize {
        self.addressing.n_faces()
    }

    /// 本地连接关系
    #[inline]
    pub fn addressing(&self) -> &LduAddressing {
        &self.addressing
    }

    /// 本地几何
    #[inline]
    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    /// 本地边界片
    #[inline]
    pub fn boundary(&self) -> &BoundaryMesh {
        &self.boundary
    }

    /// 映射关系
    #[inline]
    pub fn maps(&self) -> &DecompositionMaps {
        &self.maps
    }

    /// 本地单元的全局编号
    #[inline]
    pub fn cell_addressing(&self) -> &[usize] {
        &self.maps.cell_addressing
    }

    /// 带符号的全局面编号
    #[inline]
    pub fn face_addressing(&self) -> &[isize] {
        &self.maps.face_addressing
    }

    /// 本地边界片对应的全局边界片
    #[inline]
    pub fn boundary_addressing(&self) -> &[Option<usize>] {
        &self.maps.boundary_addressing
    }

    /// 全局边界片在本地的索引
    pub fn local_patch(&self, global_patch: usize) -> Option<usize> {
        self.maps
            .boundary_addressing
            .iter()
            .position(|&g| g == Some(global_patch))
    }

    /// 相邻 rank，按升序
    pub fn neighbour_ranks(&self) -> Vec<usize> {
        self.boundary
            .iter()
            .filter_map(|p| match p.kind {
                PatchKind::Processor { neighb_rank, .. } => Some(neighb_rank),
                _ => None,
            })
            .collect()
    }

    /// 处理器面总数
    pub fn n_processor_faces(&self) -> usize {
        self.boundary
            .iter()
            .filter(|p| matches!(p.kind, PatchKind::Processor { .. }))
            .map(Patch::size)
            .sum()
    }

    /// 用本 rank 的通信器创建本地网格
    pub fn build_mesh(&self, comm: Arc<dyn Communicator>) -> DecomposeResult<GeoMesh> {
        if comm.rank() != self.rank {
            return Err(DecomposeError::RankMismatch {
                domain: self.rank,
                comm: comm.rank(),
            });
        }
        Ok(GeoMesh::new(
            self.kind,
            self.addressing.clone(),
            self.geometry.clone(),
            self.boundary.clone(),
            comm,
        )?)
    }
}

/// 处理器面
#[derive(Debug, Clone)]
struct ProcessorFace {
    /// 两侧一致的排序键：(0, 内部面, 0) 或 (1, 周期边界片对中较小者, 面)
    key: (u8, usize, usize),
    cell: usize,
    mag: f64,
    delta: f64,
    weight: f64,
    address: isize,
}

/// 单个 rank 的构建缓冲
#[derive(Debug, Default)]
struct DomainBuilder {
    cells: Vec<usize>,
    lower: Vec<usize>,
    upper: Vec<usize>,
    face_mags: Vec<f64>,
    delta_coeffs: Vec<f64>,
    weights: Vec<f64>,
    face_addressing: Vec<isize>,
    patches: Vec<Patch>,
    patch_addressing: Vec<Vec<isize>>,
    processor: BTreeMap<usize, Vec<ProcessorFace>>,
}

/// 全局边界片落在单个 rank 上的部分
#[derive(Debug, Default)]
struct PatchPart {
    face_cells: Vec<usize>,
    mag_sf: Vec<f64>,
    delta_coeffs: Vec<f64>,
    weights: Vec<f64>,
    addressing: Vec<isize>,
}

fn signed(face: usize, flipped: bool) -> isize {
    let a = face as isize + 1;
    if flipped {
        -a
    } else {
        a
    }
}

/// 按分配表分解网格
///
/// `cell_to_rank[c]` 为单元 `c` 所在 rank，必须小于 `n_procs`。
/// 没有分到单元的 rank 得到空子域。
pub fn decompose(mesh: &GeoMesh, cell_to_rank: &[usize], n_procs: usize) -> DecomposeResult<Vec<ProcessorDomain>> {
    let n_cells = mesh.n_cells();
    DecomposeError::check_size("单元分配表", n_cells, cell_to_rank.len())?;
    if let Some((cell, &rank)) = cell_to_rank.iter().enumerate().find(|(_, &r)| r >= n_procs) {
        return Err(DecomposeError::InvalidCellMap { cell, rank, n_procs });
    }
    if let Some(p) = mesh.boundary().iter().find(|p| matches!(p.kind, PatchKind::Processor { .. })) {
        return Err(MeshError::patch(&p.name, "含处理器边界片的网格不能再分解").into());
    }

    let mut builders: Vec<DomainBuilder> = (0..n_procs).map(|_| DomainBuilder::default()).collect();
    let mut local = vec![0usize; n_cells];
    for (c, &r) in cell_to_rank.iter().enumerate() {
        local[c] = builders[r].cells.len();
        builders[r].cells.push(c);
    }

    // 内部面
    let addr = mesh.addressing();
    let (mags, deltas, weights) = (mesh.face_mags(), mesh.delta_coeffs(), mesh.weights());
    for f in 0..mesh.n_internal_faces() {
        let (o, n) = (addr.lower_addr()[f], addr.upper_addr()[f]);
        let (ro, rn) = (cell_to_rank[o], cell_to_rank[n]);
        if ro == rn {
            let b = &mut builders[ro];
            b.lower.push(local[o]);
            b.upper.push(local[n]);
            b.face_mags.push(mags[f]);
            b.delta_coeffs.push(deltas[f]);
            b.weights.push(weights[f]);
            b.face_addressing.push(signed(f, false));
        } else {
            let key = (0, f, 0);
            builders[ro].processor.entry(rn).or_default().push(ProcessorFace {
                key,
                cell: local[o],
                mag: mags[f],
                delta: deltas[f],
                weight: weights[f],
                address: signed(f, false),
            });
            builders[rn].processor.entry(ro).or_default().push(ProcessorFace {
                key,
                cell: local[n],
                mag: mags[f],
                delta: deltas[f],
                weight: 1.0 - weights[f],
                address: signed(f, true),
            });
        }
    }

    // 全局边界片
    let boundary = mesh.boundary();
    for (pi, patch) in boundary.iter().enumerate() {
        let mut parts: Vec<PatchPart> = (0..n_procs).map(|_| PatchPart::default()).collect();
        let partner = match patch.kind {
            PatchKind::Cyclic { neighbour_patch } => Some(neighbour_patch),
            _ => None,
        };
        for (j, &c) in patch.face_cells.iter().enumerate() {
            let r = cell_to_rank[c];
            let global_face = patch.start + j;
            if let Some(q) = partner {
                let rp = cell_to_rank[boundary[q].face_cells[j]];
                if rp != r {
                    builders[r].processor.entry(rp).or_default().push(ProcessorFace {
                        key: (1, pi.min(q), j),
                        cell: local[c],
                        mag: patch.mag_sf[j],
                        delta: patch.delta_coeffs[j],
                        weight: patch.weights[j],
                        address: signed(global_face, false),
                    });
                    continue;
                }
            }
            let part = &mut parts[r];
            part.face_cells.push(local[c]);
            part.mag_sf.push(patch.mag_sf[j]);
            part.delta_coeffs.push(patch.delta_coeffs[j]);
            part.weights.push(patch.weights[j]);
            part.addressing.push(signed(global_face, false));
        }
        for (b, part) in builders.iter_mut().zip(parts) {
            b.patches.push(
                Patch::new(&patch.name, patch.kind.clone(), part.face_cells, part.mag_sf, part.delta_coeffs)
                    .with_weights(part.weights),
            );
            b.patch_addressing.push(part.addressing);
        }
    }

    let n_global_patches = boundary.len();
    builders
        .into_iter()
        .enumerate()
        .map(|(rank, b)| finish(mesh, rank, n_procs, n_global_patches, b))
        .collect()
}

fn finish(
    mesh: &GeoMesh,
    rank: usize,
    n_procs: usize,
    n_global_patches: usize,
    b: DomainBuilder,
) -> DecomposeResult<ProcessorDomain> {
    let DomainBuilder {
        cells,
        lower,
        upper,
        face_mags,
        delta_coeffs,
        weights,
        mut face_addressing,
        mut patches,
        patch_addressing,
        processor,
    } = b;
    let n_local = cells.len();
    let n_faces = lower.len();

    for addressing in patch_addressing {
        face_addressing.extend(addressing);
    }
    let mut boundary_addressing: Vec<Option<usize>> = (0..n_global_patches).map(Some).collect();
    for (nbr, mut faces) in processor {
        faces.sort_by_key(|f| f.key);
        face_addressing.extend(faces.iter().map(|f| f.address));
        patches.push(
            Patch::new(
                format!("procBoundary{}to{}", rank, nbr),
                PatchKind::Processor {
                    my_rank: rank,
                    neighb_rank: nbr,
                },
                faces.iter().map(|f| f.cell).collect(),
                faces.iter().map(|f| f.mag).collect(),
                faces.iter().map(|f| f.delta).collect(),
            )
            .with_weights(faces.iter().map(|f| f.weight).collect()),
        );
        boundary_addressing.push(None);
    }

    let geometry = MeshGeometry {
        cell_measures: cells.iter().map(|&c| mesh.measures()[c]).collect(),
        cell_centres: cells.iter().map(|&c| mesh.cell_centres()[c]).collect(),
        face_mags,
        delta_coeffs,
        weights,
    };
    let addressing = LduAddressing::new(n_local, lower, upper)?;
    let boundary = BoundaryMesh::new(patches, n_local, n_faces)?;

    let domain = ProcessorDomain {
        rank,
        n_procs,
        kind: mesh.kind(),
        addressing,
        geometry,
        boundary,
        maps: DecompositionMaps {
            cell_addressing: cells,
            face_addressing,
            boundary_addressing,
        },
    };
    log::info!(
        "rank {}: {} 个单元, {} 个内部面, {} 个处理器面, 相邻 rank {:?}",
        rank,
        domain.n_cells(),
        domain.n_internal_faces(),
        domain.n_processor_faces(),
        domain.neighbour_ranks()
    );
    Ok(domain)
}

/// 按单元中心坐标的简单几何分区
///
/// 单元按 (x, y, z) 字典序排序后切成 `n_procs` 段连续、大小相差不超过 1 的块。
pub fn simple_partition(mesh: &GeoMesh, n_procs: usize) -> Vec<usize> {
    let n = mesh.n_cells();
    if n_procs == 0 {
        return Vec::new();
    }
    let centres = mesh.cell_centres();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let (pa, pb) = (centres[a], centres[b]);
        pa.x.total_cmp(&pb.x)
            .then(pa.y.total_cmp(&pb.y))
            .then(pa.z.total_cmp(&pb.z))
    });
    let mut cell_to_rank = vec![0; n];
    for (i, &c) in order.iter().enumerate() {
        cell_to_rank[c] = i * n_procs / n;
    }
    cell_to_rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_mesh::generation::{LineMeshGenerator, RectMeshGenerator};

    #[test]
    fn test_line_split() {
        let mesh = LineMeshGenerator::new(4, 4.0).build().unwrap();
        let domains = decompose(&mesh, &[0, 0, 1, 1], 2).unwrap();
        let (d0, d1) = (&domains[0], &domains[1]);

        assert_eq!(d0.cell_addressing(), &[0, 1]);
        assert_eq!(d1.cell_addressing(), &[2, 3]);
        assert_eq!(d0.n_internal_faces(), 1);
        // 内部面 0；left 边界面（全局 3）；right 为空；处理器面来自内部面 1
        assert_eq!(d0.face_addressing(), &[1, 4, 2]);
        // 内部面 2；left 为空；right 边界面（全局 4）；处理器面反向
        assert_eq!(d1.face_addressing(), &[3, 5, -2]);
        assert_eq!(d0.boundary_addressing(), &[Some(0), Some(1), None]);

        let proc0 = &d0.boundary()[2];
        assert_eq!(proc0.name, "procBoundary0to1");
        assert_eq!(proc0.kind, PatchKind::Processor { my_rank: 0, neighb_rank: 1 });
        assert_eq!(proc0.face_cells, vec![1]);
        assert_eq!(d1.boundary()[2].face_cells, vec![0]);
        assert!(d1.boundary()[0].is_empty());
        assert_eq!(d1.neighbour_ranks(), vec![0]);
        assert_eq!(d0.maps().global_face(2), (1, false));
        assert_eq!(d1.maps().global_face(2), (1, true));
    }

    #[test]
    fn test_cyclic_pairs_across_ranks() {
        let mesh = LineMeshGenerator::new(4, 4.0).cyclic(true).build().unwrap();
        let domains = decompose(&mesh, &[0, 0, 1, 1], 2).unwrap();
        for d in &domains {
            assert!(d.boundary()[0].is_empty());
            assert!(d.boundary()[1].is_empty());
            assert_eq!(d.n_processor_faces(), 2);
        }
        // 先内部面 1，再周期面对
        assert_eq!(domains[0].boundary()[2].face_cells, vec![1, 0]);
        assert_eq!(domains[1].boundary()[2].face_cells, vec![0, 1]);
        assert_eq!(domains[1].boundary()[2].weights, vec![0.5, 0.5]);
    }

    #[test]
    fn test_cyclic_pairs_on_one_rank() {
        let mesh = LineMeshGenerator::new(4, 4.0).cyclic(true).build().unwrap();
        let domains = decompose(&mesh, &[0, 1, 1, 0], 2).unwrap();
        let d0 = &domains[0];
        assert_eq!(d0.cell_addressing(), &[0, 3]);
        assert_eq!(d0.boundary()[0].face_cells, vec![0]);
        assert_eq!(d0.boundary()[1].face_cells, vec![1]);
        assert_eq!(d0.n_internal_faces(), 0);
        assert_eq!(d0.n_processor_faces(), 2);
    }

    #[test]
    fn test_invalid_map() {
        let mesh = LineMeshGenerator::new(3, 3.0).build().unwrap();
        assert!(matches!(
            decompose(&mesh, &[0, 2, 0], 2),
            Err(DecomposeError::InvalidCellMap { cell: 1, rank: 2, .. })
        ));
        assert!(matches!(decompose(&mesh, &[0, 0], 2), Err(DecomposeError::SizeMismatch { .. })));
    }

    #[test]
    fn test_simple_partition_balance() {
        let mesh = RectMeshGenerator::new(5, 2, 5.0, 2.0).build().unwrap();
        let map = simple_partition(&mesh, 3);
        let counts: Vec<usize> = (0..3).map(|r| map.iter().filter(|&&m| m == r).count()).collect();
        assert_eq!(counts.iter().sum::<usize>(), 10);
        assert!(counts.iter().all(|&c| c == 3 || c == 4));
        // 第一列两个单元在 rank 0
        assert_eq!(map[0], map[5]);
        assert!(map[0] <= map[4]);
    }

    #[test]
    fn test_empty_rank_and_rank_check() {
        let mesh = LineMeshGenerator::new(2, 2.0).build().unwrap();
        let domains = decompose(&mesh, &[0, 0], 2).unwrap();
        assert_eq!(domains[1].n_cells(), 0);
        assert_eq!(domains[1].boundary().len(), 2);
        let comm: Arc<dyn Communicator> = Arc::new(lf_foundation::SerialComm::new());
        assert!(domains[0].build_mesh(Arc::clone(&comm)).is_ok());
        assert!(matches!(domains[1].build_mesh(comm), Err(DecomposeError::RankMismatch { .. })));
    }
}
