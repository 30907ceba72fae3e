// crates/lf_matrix/src/smoothers/mod.rs

//! 光滑器
//!
//! 光滑器对 `A·ψ = b` 做固定次数的松弛扫描，用于 `smoothSolver`
//! 和 GAMG 的各层。与预条件器不同，光滑器通过 [`LduSystem`] 计入耦合界面。
//!
//! | 名称 | 对称矩阵 | 非对称矩阵 |
//! |------|---------|-----------|
//! | `GaussSeidel` | ✓ | ✓ |
//! | `symGaussSeidel` | ✓ | ✓ |
//! | `DIC` | ✓ | |
//! | `DILU` | ✓ | ✓ |

pub mod gauss_seidel;
pub mod ilu;

pub use gauss_seidel::{GaussSeidelSmoother, SymGaussSeidelSmoother};
pub use ilu::IluSmoother;

use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduSystem;

/// 对称矩阵可用的光滑器
pub const SYMMETRIC: &[&str] = &["GaussSeidel", "symGaussSeidel", "DIC", "DILU"];

/// 非对称矩阵可用的光滑器
pub const ASYMMETRIC: &[&str] = &["GaussSeidel", "symGaussSeidel", "DILU"];

/// 光滑器 trait
pub trait LduSmoother: Send + Sync {
    /// 执行 `n_sweeps` 次扫描，就地更新 `psi`
    fn smooth(&self, psi: &mut [f64], source: &[f64], n_sweeps: usize) -> MatrixResult<()>;

    /// 名称
    fn name(&self) -> &'static str;
}

/// 按名称和矩阵对称性选择光滑器
pub fn select<'a>(name: &str, system: LduSystem<'a>) -> MatrixResult<Box<dyn LduSmoother + 'a>> {
    let symmetric = !system.matrix().asymmetric();
    let valid = if symmetric { SYMMETRIC } else { ASYMMETRIC };
    if !valid.contains(&name) {
        return Err(MatrixError::UnknownSmoother {
            name: name.to_string(),
            symmetry: if symmetric { "对称" } else { "非对称" },
            valid: MatrixError::list(valid),
        });
    }
    Ok(match name {
        "GaussSeidel" => Box::new(GaussSeidelSmoother::new(system)),
        "symGaussSeidel" => Box::new(SymGaussSeidelSmoother::new(system)),
        "DIC" => Box::new(IluSmoother::new(system, "DIC")),
        _ => Box::new(IluSmoother::new(system, "DILU")),
    })
}
