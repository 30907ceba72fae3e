// crates/lf_matrix/src/lib.rs

//! LduFlow 方程矩阵层 (Layer 3)
//!
//! 把离散算子产生的系数组装成线性方程组并求解：
//!
//! # 核心类型
//!
//! - [`LduMatrix`]: 按 owner/neighbour 连接存储的对角、上三角、下三角系数
//! - [`BoundaryCoeffs`]: 每个边界片的 `internalCoeffs`/`boundaryCoeffs`
//! - [`PatchField`]: 边界条件，提供值与梯度的线性化系数
//! - [`EquationMatrix`]: 绑定到一个场的方程（[`FvMatrix`]/[`FaMatrix`]）
//! - [`SolverRegistry`]: 按名称与矩阵对称性选择迭代求解器
//!
//! # 示例
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//! use lf_config::SolverControls;
//! use lf_foundation::{DimensionSet, DimensionedScalar};
//! use lf_matrix::boundary::PatchFieldSpec;
//! use lf_matrix::field::VolScalarField;
//! use lf_matrix::fvm;
//! use lf_mesh::generation::LineMeshGenerator;
//!
//! let mesh = Arc::new(LineMeshGenerator::new(5, 5.0).build().unwrap());
//! let specs = BTreeMap::from([
//!     ("left".to_string(), PatchFieldSpec::fixed_value(0.0)),
//!     ("right".to_string(), PatchFieldSpec::fixed_value(10.0)),
//! ]);
//! let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, mesh, 0.0, &specs).unwrap();
//!
//! let kappa = DimensionedScalar::new("kappa", DimensionSet::DIFFUSIVITY, 1.0);
//! let mut eqn = -fvm::laplacian(&kappa, &t).unwrap();
//! let perf = eqn
//!     .solve(&mut t, &SolverControls::new("PCG").with_preconditioner("DIC").with_tolerance(1e-12, 0.0))
//!     .unwrap();
//! assert!(perf.converged());
//! assert!((t.internal()[2] - 5.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod boundary;
pub mod error;
pub mod field;
pub mod fv;
pub mod fvm;
pub mod ldu;
pub mod preconditioners;
pub mod smoothers;
pub mod solvers;
pub mod vector_ops;

/// 有限面积隐式算子，与 [`fvm`] 相同
pub mod fam {
    pub use crate::fvm::*;
}

/// 层级标识
pub const LAYER: u8 = 3;

pub use boundary::{BoundaryCoeffs, PatchField, PatchFieldRegistry, PatchFieldSpec};
pub use error::{MatrixError, MatrixResult};
pub use field::{GeometricField, SurfaceField, SurfaceScalarField};
pub use fv::{EquationMatrix, FaMatrix, FvMatrix, MatrixState};
pub use ldu::{LduMatrix, LduSystem};
pub use solvers::{LduSolver, SolverPerformance, SolverRegistry};
