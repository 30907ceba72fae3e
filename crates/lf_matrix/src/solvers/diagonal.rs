// crates/lf_matrix/src/solvers/diagonal.rs

//! 对角矩阵求解：ψ = b / D

use lf_config::SolverControls;

use super::LduSolver;
use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduSystem;
use crate::solvers::ScalarPerformance;

/// 对角求解器
#[derive(Debug, Clone)]
pub struct DiagonalSolver {
    field_name: String,
    controls: SolverControls,
}

impl DiagonalSolver {
    /// 创建求解器
    pub fn new(field_name: &str, controls: &SolverControls) -> Self {
        Self {
            field_name: field_name.to_string(),
            controls: controls.clone(),
        }
    }
}

impl LduSolver for DiagonalSolver {
    fn type_name(&self) -> &'static str {
        "diagonal"
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
        let diag = system.matrix().diag();
        MatrixError::check_len("solve psi", diag.len(), psi.len())?;
        MatrixError::check_len("solve source", diag.len(), source.len())?;
        for ((p, &b), &d) in psi.iter_mut().zip(source).zip(diag) {
            *p = b / d;
        }
        let mut perf = ScalarPerformance::new(self.type_name(), &self.field_name);
        perf.converged = true;
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

    #[test]
    fn test_diagonal_solve() {
        let mut m = LduMatrix::new(Arc::new(LduAddressing::disconnected(3)));
        m.diag_mut().copy_from_slice(&[2.0, 4.0, 0.5]);
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 3];
        let perf = DiagonalSolver::new("T", &SolverControls::new("PCG"))
            .solve(&sys, &mut psi, &[1.0, 1.0, 1.0])
            .unwrap();
        assert_eq!(psi, vec![0.5, 0.25, 2.0]);
        assert!(perf.converged());
        assert_eq!(perf.n_iterations, 0);
        assert_eq!(perf.initial_residual, 0.0);
    }
}
