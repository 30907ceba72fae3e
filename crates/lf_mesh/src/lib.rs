// crates/lf_mesh/src/lib.rs

//! LduFlow 网格层 (Layer 2)
//!
//! 方程矩阵只消费网格的连接关系，不关心单元形状。本 crate 提供
//! 这一窄接口：
//!
//! # 核心类型
//!
//! - [`LduAddressing`]: 内部面 (owner, neighbour) 连接图及其排序辅助数组
//! - [`BoundaryMesh`] / [`Patch`]: 有序、具名、连续的边界面分组
//! - [`LduInterface`]: 耦合边界（周期、处理器）的界面值交换
//! - [`GeoMesh`]: 体网格（有限体积）或面网格（有限面积）的几何与拓扑
//!
//! # 示例
//!
//! ```rust
//! use lf_mesh::generation::LineMeshGenerator;
//!
//! let mesh = LineMeshGenerator::new(5, 5.0).build().unwrap();
//! assert_eq!(mesh.n_cells(), 5);
//! assert_eq!(mesh.n_internal_faces(), 4);
//! assert_eq!(mesh.boundary().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod addressing;
pub mod error;
pub mod generation;
pub mod geo_mesh;
pub mod interface;
pub mod patch;

/// 层级标识
pub const LAYER: u8 = 2;

pub use addressing::LduAddressing;
pub use error::{MeshError, MeshResult};
pub use geo_mesh::{GeoMesh, MeshGeometry, MeshKind};
pub use interface::{CyclicInterface, LduInterface, ProcessorInterface};
pub use patch::{BoundaryMesh, Patch, PatchKind};
