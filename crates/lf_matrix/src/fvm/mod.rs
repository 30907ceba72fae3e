// crates/lf_matrix/src/fvm/mod.rs

//! 隐式离散算子
//!
//! 每个算子返回一个处于 `Assembling` 状态的新方程矩阵，通过
//! `+`/`-`/`try_add`/`try_equate` 组合成完整方程：
//!
//! ```text
//! ddt(T) − laplacian(κ, T) == su
//! ```
//!
//! 边界贡献按边界场的值系数（对流）与梯度系数（扩散）写入
//! `internalCoeffs`/`boundaryCoeffs`，在求解时折叠。同一组算子也用于
//! 面网格（`fam`），区别只在于单元度量与面度量的量纲。

mod ddt;
mod div;
mod laplacian;
mod sources;

pub use ddt::ddt;
pub use div::{div, ConvectionScheme};
pub use laplacian::{laplacian, laplacian_field};
pub use sources::{sp, sp_uniform, su, susp, susp_uniform};

use std::sync::Arc;

use crate::error::{MatrixError, MatrixResult};
use crate::field::{GeometricField, SurfaceScalarField};
use lf_foundation::FieldValue;

/// 面场与场必须定义在同一网格上
pub(crate) fn check_same_mesh<T: FieldValue>(face: &SurfaceScalarField, psi: &GeometricField<T>) -> MatrixResult<()> {
    if Arc::ptr_eq(face.mesh(), psi.mesh()) {
        Ok(())
    } else {
        Err(MatrixError::FieldMismatch {
            expected: format!("{} 的网格", psi.name()),
            actual: format!("{} 的网格", face.name()),
        })
    }
}
