// crates/lf_matrix/src/solvers/pbicgstab.rs

//! 预条件稳定双共轭梯度法（PBiCGStab）
//!
//! 对称与非对称矩阵均适用。影子残差 r₀ 在迭代中保持不变。
//! 中间残差 s 已满足收敛判据时提前结束，只做半步更新。

use lf_config::SolverControls;
use lf_foundation::constants::VSMALL;

use super::{keep_iterating, needs_iteration, report_iteration, InitialResidual, LduSolver};
use crate::error::MatrixResult;
use crate::ldu::LduSystem;
use crate::preconditioners;
use crate::solvers::ScalarPerformance;
use crate::vector_ops::{axpy, dot};

/// PBiCGStab 求解器
#[derive(Debug, Clone)]
pub struct PbicgStabSolver {
    field_name: String,
    controls: SolverControls,
}

impl PbicgStabSolver {
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

impl LduSolver for PbicgStabSolver {
    fn type_name(&self) -> &'static str {
        "PBiCGStab"
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

        if !needs_iteration(&mut perf, controls) {
            return Ok(perf);
        }

        let n = psi.len();
        let r0 = r.clone();
        let mut p = vec![0.0; n];
        let mut y = vec![0.0; n];
        let mut ay = vec![0.0; n];
        let mut s = vec![0.0; n];
        let mut z = vec![0.0; n];
        let mut t = vec![0.0; n];
        let mut rho_old = 0.0;
        let mut alpha = 0.0;
        let mut omega = 0.0;

        loop {
            let rho = system.g_sum_prod(&r0, &r)?;
            if perf.check_singularity(rho) {
                break;
            }

            if perf.n_iterations == 0 {
                p.copy_from_slice(&r);
            } else {
                if perf.check_singularity(omega) {
                    break;
                }
                let beta = (rho / rho_old) * (alpha / omega);
                for ((pi, &ri), &ayi) in p.iter_mut().zip(&r).zip(&ay) {
                    *pi = ri + beta * (*pi - omega * ayi);
                }
            }

            precon.apply(&p, &mut y);
            system.amul(&y, &mut ay)?;
            let r0_ay = system.g_sum_prod(&r0, &ay)?;
            alpha = rho / r0_ay;

            for ((si, &ri), &ayi) in s.iter_mut().zip(&r).zip(&ay) {
                *si = ri - alpha * ayi;
            }
            perf.final_residual = system.g_sum_mag(&s)? / norm_factor;

            if perf.check_convergence(controls.tolerance, controls.rel_tol)
                && perf.n_iterations + 1 >= controls.min_iter
            {
                axpy(alpha, &y, psi);
                perf.n_iterations += 1;
                report_iteration(controls, &perf);
                break;
            }

            precon.apply(&s, &mut z);
            system.amul(&z, &mut t)?;
            let t_t = system.comm().all_reduce_sum(dot(&t, &t))?;
            if t_t < VSMALL {
                // A·M⁻¹s 退化，只保留半步更新
                axpy(alpha, &y, psi);
                r.copy_from_slice(&s);
                perf.n_iterations += 1;
                report_iteration(controls, &perf);
                break;
            }
            omega = system.g_sum_prod(&t, &s)? / t_t;

            axpy(alpha, &y, psi);
            axpy(omega, &z, psi);
            for ((ri, &si), &ti) in r.iter_mut().zip(&s).zip(&t) {
                *ri = si - omega * ti;
            }
            perf.final_residual = system.g_sum_mag(&r)? / norm_factor;
            rho_old = rho;
            perf.n_iterations += 1;
            report_iteration(controls, &perf);

            if !keep_iterating(&mut perf, controls) {
                break;
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

    fn matrix(n: usize, asymmetric: bool) -> LduMatrix {
        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        let addr = Arc::new(LduAddressing::new(n, lower, upper).unwrap());
        let mut m = LduMatrix::new(addr);
        m.diag_mut().fill(4.0);
        m.upper_mut().fill(-1.0);
        if asymmetric {
            m.lower_mut().fill(-2.5);
        }
        m
    }

    fn check(m: &LduMatrix, precon: &str) {
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(m, &comm);
        let n = m.n_cells();
        let b: Vec<f64> = (0..n).map(|i| 1.0 + (i % 3) as f64).collect();
        let mut psi = vec![0.0; n];
        let controls = SolverControls::new("PBiCGStab")
            .with_preconditioner(precon)
            .with_tolerance(1e-12, 0.0);
        let perf = PbicgStabSolver::new("p", &controls).solve(&sys, &mut psi, &b).unwrap();
        assert!(perf.converged(), "{} 未收敛: {}", precon, perf);
        let mut r = vec![0.0; n];
        sys.residual(&psi, &b, &mut r).unwrap();
        assert!(r.iter().all(|v| v.abs() < 1e-8));
    }

    #[test]
    fn test_symmetric() {
        check(&matrix(25, false), "DIC");
        check(&matrix(25, false), "none");
    }

    #[test]
    fn test_asymmetric() {
        check(&matrix(25, true), "DILU");
        check(&matrix(25, true), "diagonal");
    }
}
