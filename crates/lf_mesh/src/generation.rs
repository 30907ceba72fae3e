// crates/lf_mesh/src/generation.rs

//! 网格生成模块
//!
//! 提供简单的结构化网格生成工具，用于测试、验证与命令行算例：
//!
//! - [`LineMeshGenerator`]: 一维均匀网格（可选周期）
//! - [`RectMeshGenerator`]: 二维矩形结构化网格
//!
//! 两者都可生成体网格或面网格。体网格在横向取单位厚度（或给定截面积），
//! 面网格取单位宽度。
//!
//! # 使用示例
//!
//! ```rust
//! use lf_mesh::generation::RectMeshGenerator;
//!
//! let mesh = RectMeshGenerator::new(4, 3, 4.0, 3.0).build().unwrap();
//! assert_eq!(mesh.n_cells(), 12);
//! assert_eq!(mesh.n_internal_faces(), 3 * 3 + 4 * 2);
//! assert_eq!(mesh.boundary().len(), 4);
//! ```

use glam::DVec3;

use crate::addressing::LduAddressing;
use crate::error::{MeshError, MeshResult};
use crate::geo_mesh::{GeoMesh, MeshGeometry, MeshKind};
use crate::patch::{BoundaryMesh, Patch, PatchKind};

/// 一维均匀网格生成器
///
/// 边界片依次为 `left`、`right`。
#[derive(Debug, Clone)]
pub struct LineMeshGenerator {
    /// 单元数
    n: usize,
    /// 域长度
    length: f64,
    /// 截面积（面网格为宽度）
    cross_section: f64,
    /// 是否周期
    cyclic: bool,
    /// 网格类别
    kind: MeshKind,
}

impl LineMeshGenerator {
    /// 创建一维网格生成器
    pub fn new(n: usize, length: f64) -> Self {
        Self {
            n,
            length,
            cross_section: 1.0,
            cyclic: false,
            kind: MeshKind::Volume,
        }
    }

    /// 设置截面积
    pub fn with_cross_section(mut self, cross_section: f64) -> Self {
        self.cross_section = cross_section;
        self
    }

    /// 左右边界配对为周期边界
    pub fn cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    /// 设置网格类别
    pub fn with_kind(mut self, kind: MeshKind) -> Self {
        self.kind = kind;
        self
    }

    /// 单元长度
    pub fn dx(&self) -> f64 {
        self.length / self.n as f64
    }

    /// 构建网格
    pub fn build(&self) -> MeshResult<GeoMesh> {
        if self.n == 0 || self.length <= 0.0 {
            return Err(MeshError::addressing(0, "一维网格需要正的单元数与长度"));
        }
        let n = self.n;
        let dx = self.dx();
        let a = self.cross_section;

        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        let addressing = LduAddressing::new(n, lower, upper)?;

        let geometry = MeshGeometry {
            cell_measures: vec![dx * a; n],
            cell_centres: (0..n)
                .map(|i| DVec3::new((i as f64 + 0.5) * dx, 0.0, 0.0))
                .collect(),
            face_mags: vec![a; n - 1],
            delta_coeffs: vec![1.0 / dx; n - 1],
            weights: vec![0.5; n - 1],
        };

        let patches = if self.cyclic {
            vec![
                Patch::new("left", PatchKind::Cyclic { neighbour_patch: 1 }, vec![0], vec![a], vec![1.0 / dx])
                    .with_weights(vec![0.5]),
                Patch::new("right", PatchKind::Cyclic { neighbour_patch: 0 }, vec![n - 1], vec![a], vec![1.0 / dx])
                    .with_weights(vec![0.5]),
            ]
        } else {
            vec![
                Patch::new("left", PatchKind::Patch, vec![0], vec![a], vec![2.0 / dx]),
                Patch::new("right", PatchKind::Patch, vec![n - 1], vec![a], vec![2.0 / dx]),
            ]
        };
        let boundary = BoundaryMesh::new(patches, n, n - 1)?;

        GeoMesh::serial(self.kind, addressing, geometry, boundary)
    }
}

/// 矩形结构化网格生成器
///
/// 单元按行主序编号 `c = j * nx + i`，内部面按 owner 升序排列。
/// 边界片依次为 `left`、`right`、`bottom`、`top`。
#[derive(Debug, Clone)]
pub struct RectMeshGenerator {
    /// x 方向单元数
    nx: usize,
    /// y 方向单元数
    ny: usize,
    /// x 方向域长度
    lx: f64,
    /// y 方向域长度
    ly: f64,
    /// z 方向厚度
    depth: f64,
    /// 网格类别
    kind: MeshKind,
}

impl RectMeshGenerator {
    /// 创建矩形网格生成器
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Self {
        Self {
            nx,
            ny,
            lx,
            ly,
            depth: 1.0,
            kind: MeshKind::Volume,
        }
    }

    /// 创建方形网格生成器
    pub fn square(n: usize, length: f64) -> Self {
        Self::new(n, n, length, length)
    }

    /// 设置网格类别
    pub fn with_kind(mut self, kind: MeshKind) -> Self {
        self.kind = kind;
        self
    }

    /// x 方向间距
    pub fn dx(&self) -> f64 {
        self.lx / self.nx as f64
    }

    /// y 方向间距
    pub fn dy(&self) -> f64 {
        self.ly / self.ny as f64
    }

    /// 构建网格
    pub fn build(&self) -> MeshResult<GeoMesh> {
        if self.nx == 0 || self.ny == 0 || self.lx <= 0.0 || self.ly <= 0.0 {
            return Err(MeshError::addressing(0, "矩形网格需要正的单元数与尺寸"));
        }
        let (nx, ny) = (self.nx, self.ny);
        let (dx, dy) = (self.dx(), self.dy());
        let n_cells = nx * ny;
        let cell = |i: usize, j: usize| j * nx + i;

        // 面网格的"面"是边，度量为边长
        let (measure, x_face, y_face) = match self.kind {
            MeshKind::Volume => (dx * dy * self.depth, dy * self.depth, dx * self.depth),
            MeshKind::Area => (dx * dy, dy, dx),
        };

        let mut lower = Vec::new();
        let mut upper = Vec::new();
        let mut face_mags = Vec::new();
        let mut delta_coeffs = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                let c = cell(i, j);
                if i + 1 < nx {
                    lower.push(c);
                    upper.push(cell(i + 1, j));
                    face_mags.push(x_face);
                    delta_coeffs.push(1.0 / dx);
                }
                if j + 1 < ny {
                    lower.push(c);
                    upper.push(cell(i, j + 1));
                    face_mags.push(y_face);
                    delta_coeffs.push(1.0 / dy);
                }
            }
        }
        let n_faces = lower.len();
        let addressing = LduAddressing::new(n_cells, lower, upper)?;

        let geometry = MeshGeometry {
            cell_measures: vec![measure; n_cells],
            cell_centres: (0..ny)
                .flat_map(|j| {
                    (0..nx).map(move |i| DVec3::new((i as f64 + 0.5) * dx, (j as f64 + 0.5) * dy, 0.0))
                })
                .collect(),
            face_mags,
            delta_coeffs,
            weights: vec![0.5; n_faces],
        };

        let side = |name: &str, cells: Vec<usize>, mag: f64, delta: f64| {
            let m = cells.len();
            Patch::new(name, PatchKind::Patch, cells, vec![mag; m], vec![delta; m])
        };
        let patches = vec![
            side("left", (0..ny).map(|j| cell(0, j)).collect(), x_face, 2.0 / dx),
            side("right", (0..ny).map(|j| cell(nx - 1, j)).collect(), x_face, 2.0 / dx),
            side("bottom", (0..nx).map(|i| cell(i, 0)).collect(), y_face, 2.0 / dy),
            side("top", (0..nx).map(|i| cell(i, ny - 1)).collect(), y_face, 2.0 / dy),
        ];
        let boundary = BoundaryMesh::new(patches, n_cells, n_faces)?;

        GeoMesh::serial(self.kind, addressing, geometry, boundary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_mesh() {
        let mesh = LineMeshGenerator::new(5, 5.0).build().unwrap();
        assert_eq!(mesh.n_cells(), 5);
        assert_eq!(mesh.boundary()[0].start, 4);
        assert_eq!(mesh.boundary()[1].face_cells, vec![4]);
        assert!((mesh.boundary()[0].delta_coeffs[0] - 2.0).abs() < 1e-12);
        assert!(mesh.interfaces().iter().all(Option::is_none));
        assert!((mesh.cell_centres()[2].x - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_cyclic_line_mesh() {
        let mesh = LineMeshGenerator::new(4, 4.0).cyclic(true).build().unwrap();
        assert!(mesh.boundary()[0].coupled());
        let iface = mesh.interfaces()[0].as_ref().unwrap();
        let psi = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(iface.transfer(&psi).unwrap(), vec![4.0]);
    }

    #[test]
    fn test_rect_mesh_faces_sorted() {
        let mesh = RectMeshGenerator::new(3, 2, 3.0, 2.0).build().unwrap();
        let addr = mesh.addressing();
        assert!(addr.is_upper_triangular());
        assert!(addr.lower_addr().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(mesh.boundary().n_faces(), 2 * 2 + 2 * 3);
        assert_eq!(mesh.boundary()[3].face_cells, vec![3, 4, 5]);
    }

    #[test]
    fn test_area_mesh_measures() {
        let mesh = RectMeshGenerator::square(2, 2.0)
            .with_kind(MeshKind::Area)
            .build()
            .unwrap();
        assert_eq!(mesh.kind(), MeshKind::Area);
        assert!((mesh.measures()[0] - 1.0).abs() < 1e-12);
        assert!((mesh.face_mags()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_line() {
        assert!(LineMeshGenerator::new(0, 1.0).build().is_err());
    }
}
