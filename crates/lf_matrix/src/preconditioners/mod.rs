// crates/lf_matrix/src/preconditioners/mod.rs

//! 预条件器
//!
//! 预条件器的核心操作是 `apply`: z = M⁻¹ * r。非对称 Krylov 方法还需要
//! 转置形式 `apply_transpose`: z = M⁻ᵀ * r。
//!
//! | 名称 | 对称矩阵 | 非对称矩阵 |
//! |------|---------|-----------|
//! | `DIC` | ✓ | |
//! | `DILU` | ✓ | ✓ |
//! | `diagonal` | ✓ | ✓ |
//! | `none` | ✓ | ✓ |
//!
//! 预条件器只使用本进程矩阵，不含耦合界面。

pub mod diagonal;
pub mod dic;
pub mod dilu;
pub mod none;

pub use diagonal::DiagonalPreconditioner;
pub use dic::DicPreconditioner;
pub use dilu::DiluPreconditioner;
pub use none::NoPreconditioner;

use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduMatrix;

/// 对称矩阵可用的预条件器
pub const SYMMETRIC: &[&str] = &["DIC", "DILU", "diagonal", "none"];

/// 非对称矩阵可用的预条件器
pub const ASYMMETRIC: &[&str] = &["DILU", "diagonal", "none"];

/// 预条件器 trait
pub trait LduPreconditioner: Send + Sync {
    /// 应用预条件器: z = M⁻¹ * r
    fn apply(&self, r: &[f64], z: &mut [f64]);

    /// 应用转置预条件器: z = M⁻ᵀ * r，对称预条件器与 `apply` 相同
    fn apply_transpose(&self, r: &[f64], z: &mut [f64]) {
        self.apply(r, z);
    }

    /// 名称
    fn name(&self) -> &'static str;
}

/// 按名称和矩阵对称性选择预条件器
pub fn select<'a>(name: &str, matrix: &'a LduMatrix) -> MatrixResult<Box<dyn LduPreconditioner + 'a>> {
    let symmetric = !matrix.asymmetric();
    let valid = if symmetric { SYMMETRIC } else { ASYMMETRIC };
    if !valid.contains(&name) {
        return Err(MatrixError::UnknownPreconditioner {
            name: name.to_string(),
            symmetry: if symmetric { "对称" } else { "非对称" },
            valid: MatrixError::list(valid),
        });
    }
    Ok(match name {
        "DIC" => Box::new(DicPreconditioner::new(matrix)),
        "DILU" => Box::new(DiluPreconditioner::new(matrix)),
        "diagonal" => Box::new(DiagonalPreconditioner::new(matrix)),
        _ => Box::new(NoPreconditioner),
    })
}
