// crates/lf_matrix/src/solvers/performance.rs

//! 求解性能记录
//!
//! 每次标量求解返回一条 [`ScalarPerformance`]；向量、张量方程按分量求解，
//! 再由 [`SolverPerformance::combine`] 汇总为值类型的残差。

use std::fmt;

use lf_foundation::constants::VSMALL;
use lf_foundation::FieldValue;
use serde::Serialize;

/// 标量求解性能
pub type ScalarPerformance = SolverPerformance<f64>;

/// 求解性能记录
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverPerformance<T> {
    /// 求解器名称
    pub solver_name: String,
    /// 场名（分量求解时带分量后缀，如 `Ux`）
    pub field_name: String,
    /// 初始残差
    pub initial_residual: T,
    /// 最终残差
    pub final_residual: T,
    /// 迭代次数（多分量时取最大值）
    pub n_iterations: usize,
    /// 是否收敛
    pub converged: bool,
    /// 是否遇到奇异
    pub singular: bool,
}

impl<T: FieldValue> SolverPerformance<T> {
    /// 创建空记录
    pub fn new(solver_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            solver_name: solver_name.into(),
            field_name: field_name.into(),
            initial_residual: T::zero(),
            final_residual: T::zero(),
            n_iterations: 0,
            converged: false,
            singular: false,
        }
    }

    /// 是否收敛
    #[inline]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// 是否奇异
    #[inline]
    pub fn singular(&self) -> bool {
        self.singular
    }

    /// 收敛判据：`final ≤ tolerance` 或 `final ≤ relTol·initial`
    pub fn check_convergence(&mut self, tolerance: f64, rel_tol: f64) -> bool {
        let final_max = self.final_residual.cmpt_max();
        let initial_max = self.initial_residual.cmpt_max();
        self.converged =
            final_max <= tolerance || (rel_tol > 0.0 && final_max <= rel_tol * initial_max);
        self.converged
    }

    /// 奇异判据：`|x| < 1e-300`
    pub fn check_singularity(&mut self, x: f64) -> bool {
        self.singular = x.abs() < VSMALL;
        self.singular
    }

    /// 把各分量的标量记录合并为值类型记录
    pub fn combine(field_name: impl Into<String>, components: &[ScalarPerformance]) -> Self {
        let mut perf = Self::new(
            components.first().map(|c| c.solver_name.as_str()).unwrap_or("none"),
            field_name,
        );
        perf.converged = !components.is_empty();
        for (d, c) in components.iter().enumerate().take(T::N_COMPONENTS) {
            perf.initial_residual.set_component(d, c.initial_residual);
            perf.final_residual.set_component(d, c.final_residual);
            perf.n_iterations = perf.n_iterations.max(c.n_iterations);
            perf.converged &= c.converged;
            perf.singular |= c.singular;
        }
        perf
    }
}

impl fmt::Display for SolverPerformance<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:  Solving for {}, Initial residual = {:e}, Final residual = {:e}, No Iterations {}",
            self.solver_name,
            self.field_name,
            self.initial_residual,
            self.final_residual,
            self.n_iterations
        )
    }
}
