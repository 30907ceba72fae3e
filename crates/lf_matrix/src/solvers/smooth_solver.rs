// crates/lf_matrix/src/solvers/smooth_solver.rs

//! 光滑器迭代求解器
//!
//! 每次迭代执行 `nSweeps` 次光滑扫描，迭代计数按扫描次数累加。
//! 归一化因子只在初始解上计算一次。

use lf_config::SolverControls;

use super::{keep_iterating, needs_iteration, report_iteration, InitialResidual, LduSolver};
use crate::error::MatrixResult;
use crate::ldu::LduSystem;
use crate::smoothers;
use crate::solvers::ScalarPerformance;

/// smoothSolver
#[derive(Debug, Clone)]
pub struct SmoothSolver {
    field_name: String,
    controls: SolverControls,
}

impl SmoothSolver {
    /// 创建求解器
    pub fn new(field_name: &str, controls: &SolverControls) -> Self {
        Self {
            field_name: field_name.to_string(),
            controls: controls.clone(),
        }
    }

    /// 注册表构造函数
    pub fn boxed(field_name: &str, controls: &SolverControls) -> Box<dyn LduSolver> {
        Box::new(Self::new(field_name, controls))
    }
}

impl LduSolver for SmoothSolver {
    fn type_name(&self) -> &'static str {
        "smoothSolver"
    }

    fn field_name(&self) -> &str {
        &self.field_name
    }

    fn controls(&self) -> &SolverControls {
        &self.controls
    }

    fn solve(
        &self,
        system: &LduSystem<'_>,
        psi: &mut [f64],
        source: &[f64],
    ) -> MatrixResult<ScalarPerformance> {
        let controls = &self.controls;
        let smoother = smoothers::select(controls.smoother_name(), *system)?;
        let mut perf = ScalarPerformance::new(self.type_name(), &self.field_name);
        let InitialResidual { mut r, norm_factor } =
            InitialResidual::compute(system, psi, source, &mut perf)?;

        if needs_iteration(&mut perf, controls) {
            let n_sweeps = controls.n_sweeps.max(1);
            loop {
                smoother.smooth(psi, source, n_sweeps)?;
                system.residual(psi, source, &mut r)?;
                perf.final_residual = system.g_sum_mag(&r)? / norm_factor;
                perf.n_iterations += n_sweeps;
                report_iteration(controls, &perf);

                if !keep_iterating(&mut perf, controls) {
                    break;
                }
            }
        }
        Ok(perf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldu::LduMatrix;
    use lf_foundation::SerialComm;
    use lf_mesh::LduAddressing;
    use std::sync::Arc;

    fn matrix() -> LduMatrix {
        let addr = Arc::new(LduAddressing::new(5, vec![0, 1, 2, 3], vec![1, 2, 3, 4]).unwrap());
        let mut m = LduMatrix::new(addr);
        m.diag_mut().fill(3.0);
        m.upper_mut().fill(-1.0);
        m
    }

    #[test]
    fn test_sweep_counting() {
        let m = matrix();
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 5];
        let mut controls = SolverControls::new("smoothSolver")
            .with_smoother("symGaussSeidel")
            .with_tolerance(1e-30, 0.0)
            .with_max_iter(6);
        controls.n_sweeps = 2;
        let perf = SmoothSolver::new("k", &controls).solve(&sys, &mut psi, &[1.0; 5]).unwrap();
        assert_eq!(perf.n_iterations, 6);
        assert!(perf.final_residual < perf.initial_residual);
    }

    #[test]
    fn test_converges() {
        let m = matrix();
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 5];
        let controls = SolverControls::new("smoothSolver").with_tolerance(1e-10, 0.0);
        let perf = SmoothSolver::new("k", &controls).solve(&sys, &mut psi, &[1.0; 5]).unwrap();
        assert!(perf.converged());
        assert_eq!(perf.solver_name, "smoothSolver");
    }

    #[test]
    fn test_unknown_smoother() {
        let m = matrix();
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 5];
        let controls = SolverControls::new("smoothSolver").with_smoother("Jacobi");
        assert!(SmoothSolver::new("k", &controls).solve(&sys, &mut psi, &[1.0; 5]).is_err());
    }
}
