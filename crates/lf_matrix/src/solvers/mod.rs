// crates/lf_matrix/src/solvers/mod.rs

//! 迭代线性求解器
//!
//! 求解器面向 [`LduSystem`]：标量矩阵 + 耦合界面 + 通信器。每个求解器
//! 返回一条 [`ScalarPerformance`]，不收敛不视为错误。
//!
//! # 求解器类型
//!
//! - [`PcgSolver`]: 预条件共轭梯度法（对称）
//! - [`PbicgSolver`]: 预条件双共轭梯度法（非对称）
//! - [`PbicgStabSolver`]: 预条件稳定双共轭梯度法
//! - [`SmoothSolver`]: 光滑器迭代
//! - [`GamgSolver`]: 几何无关代数多重网格
//! - [`DiagonalSolver`]: 对角矩阵直接求解
//!
//! # 残差
//!
//! ```text
//! normFactor = Σ(|A·ψ − Σ_A·ψ̄| + |b − Σ_A·ψ̄|) + 1e-20
//! residual   = Σ|b − A·ψ| / normFactor
//! ```

pub mod diagonal;
pub mod gamg;
pub mod pbicg;
pub mod pbicgstab;
pub mod pcg;
pub mod performance;
pub mod registry;
pub mod smooth_solver;

pub use diagonal::DiagonalSolver;
pub use gamg::GamgSolver;
pub use pbicg::PbicgSolver;
pub use pbicgstab::PbicgStabSolver;
pub use pcg::PcgSolver;
pub use performance::{ScalarPerformance, SolverPerformance};
pub use registry::{SolverConstructor, SolverRegistry};
pub use smooth_solver::SmoothSolver;

use lf_config::SolverControls;

use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduSystem;

/// 线性求解器 trait
pub trait LduSolver: Send + Sync {
    /// 求解器类型名
    fn type_name(&self) -> &'static str;

    /// 所求解的场名
    fn field_name(&self) -> &str;

    /// 控制参数
    fn controls(&self) -> &SolverControls;

    /// 求解 `A·ψ = b`，就地更新 `psi`
    fn solve(&self, system: &LduSystem<'_>, psi: &mut [f64], source: &[f64])
        -> MatrixResult<ScalarPerformance>;
}

/// 求解起点：`A·ψ`、残差 `b − A·ψ` 与归一化因子
pub(crate) struct InitialResidual {
    /// 残差
    pub r: Vec<f64>,
    /// 归一化因子
    pub norm_factor: f64,
}

impl InitialResidual {
    /// 计算并写入性能记录的初始与最终残差
    pub fn compute(
        system: &LduSystem<'_>,
        psi: &[f64],
        source: &[f64],
        perf: &mut ScalarPerformance,
    ) -> MatrixResult<Self> {
        let n = system.n_cells();
        MatrixError::check_len("solve psi", n, psi.len())?;
        MatrixError::check_len("solve source", n, source.len())?;
        let mut a_psi = vec![0.0; n];
        system.amul(psi, &mut a_psi)?;
        let norm_factor = system.norm_factor(psi, source, &a_psi)?;
        let r: Vec<f64> = source.iter().zip(&a_psi).map(|(b, a)| b - a).collect();
        perf.initial_residual = system.g_sum_mag(&r)? / norm_factor;
        perf.final_residual = perf.initial_residual;
        Ok(Self { r, norm_factor })
    }
}

/// 是否需要迭代：未收敛或要求最少迭代次数
#[inline]
pub(crate) fn needs_iteration(perf: &mut ScalarPerformance, controls: &SolverControls) -> bool {
    controls.min_iter > 0 || !perf.check_convergence(controls.tolerance, controls.rel_tol)
}

/// 迭代继续条件：`(nIter < maxIter && !converged) || nIter < minIter`
#[inline]
pub(crate) fn keep_iterating(perf: &mut ScalarPerformance, controls: &SolverControls) -> bool {
    let converged = perf.check_convergence(controls.tolerance, controls.rel_tol);
    (perf.n_iterations < controls.max_iter && !converged) || perf.n_iterations < controls.min_iter
}

/// 迭代结束后的日志
pub(crate) fn report_iteration(controls: &SolverControls, perf: &ScalarPerformance) {
    if controls.verbose {
        log::trace!(
            "{} {}: 迭代 {} 残差 {:e}",
            perf.solver_name,
            perf.field_name,
            perf.n_iterations,
            perf.final_residual
        );
    }
}
