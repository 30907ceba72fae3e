// crates/lf_matrix/src/solvers/pbicg.rs

//! 预条件双共轭梯度法（PBiCG）
//!
//! 非对称矩阵的经典 Krylov 方法，同时迭代原问题与转置问题：
//!
//! ```text
//! w = M⁻¹ r,  wᵀ = M⁻ᵀ rᵀ,  ρ = w·rᵀ
//! p = w + β p,  pᵀ = wᵀ + β pᵀ
//! α = ρ / (A p · pᵀ)
//! ψ += α p,  r −= α A p,  rᵀ −= α Aᵀ pᵀ
//! ```

use lf_config::SolverControls;

use super::{keep_iterating, needs_iteration, report_iteration, InitialResidual, LduSolver};
use crate::error::MatrixResult;
use crate::ldu::LduSystem;
use crate::preconditioners;
use crate::solvers::ScalarPerformance;
use crate::vector_ops::{axpy, xpay};

/// PBiCG 求解器
#[derive(Debug, Clone)]
pub struct PbicgSolver {
    field_name: String,
    controls: SolverControls,
}

impl PbicgSolver {
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

impl LduSolver for PbicgSolver {
    fn type_name(&self) -> &'static str {
        "PBiCG"
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
            let mut w_t = vec![0.0; n];
            let mut p_t = vec![0.0; n];
            let mut r_t = r.clone();
            let mut w_rt = f64::MAX;

            loop {
                let w_rt_old = w_rt;
                precon.apply(&r, &mut w);
                precon.apply_transpose(&r_t, &mut w_t);
                w_rt = system.g_sum_prod(&w, &r_t)?;

                if perf.n_iterations == 0 {
                    p.copy_from_slice(&w);
                    p_t.copy_from_slice(&w_t);
                } else {
                    let beta = w_rt / w_rt_old;
                    xpay(&w, beta, &mut p);
                    xpay(&w_t, beta, &mut p_t);
                }

                system.amul(&p, &mut w)?;
                system.tmul(&p_t, &mut w_t)?;
                let w_pt = system.g_sum_prod(&w, &p_t)?;
                if perf.check_singularity(w_pt.abs() / norm_factor) {
                    break;
                }

                let alpha = w_rt / w_pt;
                axpy(alpha, &p, psi);
                axpy(-alpha, &w, &mut r);
                axpy(-alpha, &w_t, &mut r_t);
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
