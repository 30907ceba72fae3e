// crates/lf_matrix/src/solvers/pcg.rs

//! 预条件共轭梯度法（PCG）
//!
//! 适用于对称矩阵。每次迭代：
//!
//! ```text
//! w = M⁻¹ r,  ρ = w·r
//! p = w + (ρ/ρ_old) p
//! α = ρ / (p·A p)
//! ψ += α p,  r −= α A p
//! ```

use lf_config::SolverControls;

use super::{keep_iterating, needs_iteration, report_iteration, InitialResidual, LduSolver};
use crate::error::MatrixResult;
use crate::ldu::LduSystem;
use crate::preconditioners;
use crate::solvers::ScalarPerformance;
use crate::vector_ops::{axpy, xpay};

/// PCG 求解器
#[derive(Debug, Clone)]
pub struct PcgSolver {
    field_name: String,
    controls: SolverControls,
}

impl PcgSolver {
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

impl LduSolver for PcgSolver {
    fn type_name(&self) -> &'static str {
        "PCG"
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
        let precon = preconditioners::select(controls.preconditioner_name(), system.matrix())?;
        let mut perf = ScalarPerformance::new(self.type_name(), &self.field_name);
        let InitialResidual { mut r, norm_factor } =
            InitialResidual::compute(system, psi, source, &mut perf)?;

        if needs_iteration(&mut perf, controls) {
            let n = psi.len();
            let mut w = vec![0.0; n];
            let mut p = vec![0.0; n];
            let mut w_r = f64::MAX;

            loop {
                let w_r_old = w_r;
                precon.apply(&r, &mut w);
                w_r = system.g_sum_prod(&w, &r)?;

                if perf.n_iterations == 0 {
                    p.copy_from_slice(&w);
                } else {
                    xpay(&w, w_r / w_r_old, &mut p);
                }

                system.amul(&p, &mut w)?;
                let w_p = system.g_sum_prod(&w, &p)?;
                if perf.check_singularity(w_p.abs() / norm_factor) {
                    break;
                }

                let alpha = w_r / w_p;
                axpy(alpha, &p, psi);
                axpy(-alpha, &w, &mut r);
                perf.final_residual = system.g_sum_mag(&r)? / norm_factor;
                perf.n_iterations += 1;
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

    /// 一维 Poisson 矩阵，n 个单元，两端 Dirichlet
    fn poisson(n: usize) -> LduMatrix {
        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        let addr = Arc::new(LduAddressing::new(n, lower, upper).unwrap());
        let mut m = LduMatrix::new(addr);
        m.diag_mut().fill(2.0);
        m.upper_mut().fill(-1.0);
        m
    }

    #[test]
    fn test_pcg_dic() {
        let m = poisson(20);
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let b = vec![1.0; 20];
        let mut psi = vec![0.0; 20];
        let controls = SolverControls::new("PCG")
            .with_preconditioner("DIC")
            .with_tolerance(1e-10, 0.0);
        let perf = PcgSolver::new("T", &controls).solve(&sys, &mut psi, &b).unwrap();
        assert!(perf.converged());
        assert!(perf.n_iterations <= 20);
        let mut r = vec![0.0; 20];
        sys.residual(&psi, &b, &mut r).unwrap();
        assert!(r.iter().all(|v| v.abs() < 1e-7));
    }

    #[test]
    fn test_already_converged() {
        let m = poisson(4);
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 4];
        let perf = PcgSolver::new("T", &SolverControls::new("PCG"))
            .solve(&sys, &mut psi, &[0.0; 4])
            .unwrap();
        assert_eq!(perf.n_iterations, 0);
        assert!(perf.converged());
        assert_eq!(perf.initial_residual, 0.0);
    }

    #[test]
    fn test_min_iter() {
        let m = poisson(4);
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 4];
        let controls = SolverControls::new("PCG").with_min_iter(2);
        let perf = PcgSolver::new("T", &controls).solve(&sys, &mut psi, &[1.0; 4]).unwrap();
        assert!(perf.n_iterations >= 2);
    }
}
