// crates/lf_matrix/src/fv/solve.rs

//! 方程矩阵求解
//!
//! 向量、张量方程按分量分离求解：每个分量使用
//! `diag + internalCoeffs[cmpt] − cmptAv(internalCoeffs)` 作为对角元，
//! 耦合边界片的系数作为界面系数交给求解器，求解后恢复折叠后的对角元。

use lf_config::{FvSolution, SolverControls};
use lf_foundation::FieldValue;

use super::matrix::EquationMatrix;
use super::MatrixState;
use crate::error::MatrixResult;
use crate::field::GeometricField;
use crate::ldu::LduSystem;
use crate::solvers::{ScalarPerformance, SolverPerformance, SolverRegistry};

impl<T: FieldValue> EquationMatrix<T> {
    /// 使用内置求解器表求解
    pub fn solve(&mut self, psi: &mut GeometricField<T>, controls: &SolverControls) -> MatrixResult<SolverPerformance<T>> {
        self.solve_with_registry(psi, controls, &SolverRegistry::new())
    }

    /// 从求解字典中按场名查找控制参数后求解
    pub fn solve_from(&mut self, psi: &mut GeometricField<T>, solution: &FvSolution) -> MatrixResult<SolverPerformance<T>> {
        let controls = solution.solver_controls(&self.psi_name)?;
        self.solve(psi, controls)
    }

    /// 使用给定求解器表求解
    ///
    /// 未折叠时先折叠边界系数；重复调用不会再次折叠。不收敛不是错误，
    /// 通过返回记录的 `converged()` 报告。
    pub fn solve_with_registry(
        &mut self,
        psi: &mut GeometricField<T>,
        controls: &SolverControls,
        registry: &SolverRegistry,
    ) -> MatrixResult<SolverPerformance<T>> {
        self.check_psi(psi)?;
        self.fold_boundary()?;

        let mesh = std::sync::Arc::clone(&self.mesh);
        let boundary = mesh.boundary();
        let folded_diag = self.ldu.diag().to_vec();
        let mut parts: Vec<ScalarPerformance> = Vec::with_capacity(T::N_COMPONENTS);

        for cmpt in 0..T::N_COMPONENTS {
            let field_name = format!("{}{}", self.psi_name, T::component_name(cmpt));
            let solver = registry.select(&field_name, controls, &self.ldu)?;

            let diag = self.component_diag(&folded_diag, cmpt);
            self.ldu.diag_mut().copy_from_slice(&diag);

            let source: Vec<f64> = self.source.iter().map(|v| v.component(cmpt)).collect();
            let mut psi_cmpt = psi.component(cmpt);
            let bou = self.coeffs.interface_bou_coeffs(cmpt, boundary);
            let int = self.coeffs.interface_int_coeffs(cmpt, boundary);
            let result = {
                let system = LduSystem::new(&self.ldu, &bou, &int, mesh.interfaces(), mesh.comm().as_ref());
                solver.solve(&system, &mut psi_cmpt, &source)
            };
            self.ldu.diag_mut().copy_from_slice(&folded_diag);
            let perf = result?;

            psi.replace_component(cmpt, &psi_cmpt)?;
            log::info!("{}", perf);
            if !perf.converged() {
                log::warn!(
                    "{}: {} 次迭代后未收敛，最终残差 {:e}",
                    field_name,
                    perf.n_iterations,
                    perf.final_residual
                );
            }
            parts.push(perf);
        }

        psi.correct_boundary_conditions()?;
        self.state = MatrixState::Solved;
        Ok(SolverPerformance::combine(self.psi_name.clone(), &parts))
    }
}
