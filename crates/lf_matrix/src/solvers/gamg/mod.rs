// crates/lf_matrix/src/solvers/gamg/mod.rs

//! 代数多重网格求解器（GAMG）
//!
//! # 层级
//!
//! 从最细层开始反复做成对聚合，直到单元数不超过
//! `nCellsInCoarsestLevel` 或聚合不再减少单元。粗层只保留本进程矩阵，
//! 耦合界面在粗层上被忽略。
//!
//! # V 循环
//!
//! ```text
//! 细层:   前光滑 nPreSweeps → 限制残差 → 粗层修正 → 延拓 → 后光滑 nPostSweeps
//! 粗层:   从零初值递归同样的流程
//! 最粗层: PCG + DIC（对称）或 PBiCGStab + DILU（非对称）
//! ```
//!
//! 对称矩阵的修正量按能量极小缩放，并附加一次 Jacobi 修正。

pub mod agglomeration;

pub use agglomeration::Agglomeration;

use lf_config::SolverControls;
use lf_foundation::constants::VSMALL;
use lf_foundation::SerialComm;

use super::{
    keep_iterating, needs_iteration, report_iteration, DiagonalSolver, InitialResidual, LduSolver,
    PbicgStabSolver, PcgSolver,
};
use crate::error::MatrixResult;
use crate::ldu::{LduMatrix, LduSystem};
use crate::smoothers::{self, LduSmoother};
use crate::solvers::ScalarPerformance;
use crate::vector_ops::axpy;

/// 层数上限
const MAX_LEVELS: usize = 50;

/// 一个粗层：到该层的聚合与该层矩阵
#[derive(Debug, Clone)]
pub struct CoarseLevel {
    /// 上一层到本层的聚合
    pub agglomeration: Agglomeration,
    /// 本层 Galerkin 矩阵
    pub matrix: LduMatrix,
}

/// 构造粗层序列
pub fn build_hierarchy(fine: &LduMatrix, n_cells_in_coarsest_level: usize) -> MatrixResult<Vec<CoarseLevel>> {
    let mut levels: Vec<CoarseLevel> = Vec::new();
    while levels.len() < MAX_LEVELS {
        let current = levels.last().map_or(fine, |lvl| &lvl.matrix);
        if current.n_cells() <= n_cells_in_coarsest_level {
            break;
        }
        let agglomeration = Agglomeration::pairwise(current);
        if agglomeration.n_coarse() >= current.n_cells() {
            break;
        }
        let matrix = agglomeration.coarse_matrix(current)?;
        levels.push(CoarseLevel { agglomeration, matrix });
    }
    log::debug!(
        "GAMG: {} 个粗层, 单元数 {} -> {:?}",
        levels.len(),
        fine.n_cells(),
        levels.iter().map(|l| l.matrix.n_cells()).collect::<Vec<_>>()
    );
    Ok(levels)
}

/// GAMG 求解器
#[derive(Debug, Clone)]
pub struct GamgSolver {
    field_name: String,
    controls: SolverControls,
}

impl GamgSolver {
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

    /// 最粗层求解器的控制参数
    fn coarsest_controls(&self, asymmetric: bool) -> SolverControls {
        let (solver, precon) = if asymmetric {
            ("PBiCGStab", "DILU")
        } else {
            ("PCG", "DIC")
        };
        SolverControls::new(solver)
            .with_preconditioner(precon)
            .with_tolerance(self.controls.tolerance, self.controls.rel_tol)
            .with_max_iter(self.controls.max_iter)
    }

    /// 最粗层求解
    fn solve_coarsest(&self, system: &LduSystem<'_>, psi: &mut [f64], source: &[f64]) -> MatrixResult<ScalarPerformance> {
        let matrix = system.matrix();
        let controls = self.coarsest_controls(matrix.asymmetric());
        let name = format!("{}Coarsest", self.field_name);
        if matrix.diagonal() {
            DiagonalSolver::new(&name, &controls).solve(system, psi, source)
        } else if matrix.asymmetric() {
            PbicgStabSolver::new(&name, &controls).solve(system, psi, source)
        } else {
            PcgSolver::new(&name, &controls).solve(system, psi, source)
        }
    }

    /// 本进程矩阵上的最粗层修正，从零初值开始
    fn local_coarsest_correction(&self, matrix: &LduMatrix, rhs: &[f64]) -> MatrixResult<Vec<f64>> {
        let comm = SerialComm::new();
        let system = LduSystem::uncoupled(matrix, &comm);
        let mut e = vec![0.0; matrix.n_cells()];
        self.solve_coarsest(&system, &mut e, rhs)?;
        Ok(e)
    }

    /// 第 `k` 个粗层上 `A_k·e = rhs` 的近似解
    fn coarse_correction(
        &self,
        levels: &[CoarseLevel],
        k: usize,
        rhs: &[f64],
        symmetric: bool,
    ) -> MatrixResult<Vec<f64>> {
        let matrix = &levels[k].matrix;
        if k + 1 == levels.len() {
            return self.local_coarsest_correction(matrix, rhs);
        }

        let comm = SerialComm::new();
        let system = LduSystem::uncoupled(matrix, &comm);
        let smoother = smoothers::select(self.controls.smoother_name(), system)?;
        let n = matrix.n_cells();

        let mut e = vec![0.0; n];
        if self.controls.n_pre_sweeps > 0 {
            smoother.smooth(&mut e, rhs, self.controls.n_pre_sweeps)?;
        }
        let mut r = vec![0.0; n];
        system.residual(&e, rhs, &mut r)?;

        let next = &levels[k + 1].agglomeration;
        let coarse_e = self.coarse_correction(levels, k + 1, &next.restrict_field(&r), symmetric)?;
        let mut correction = vec![0.0; n];
        next.prolong_add(&coarse_e, &mut correction);
        if symmetric {
            scale_correction(&system, &mut correction, &r)?;
        }
        axpy(1.0, &correction, &mut e);

        smoother.smooth(&mut e, rhs, self.controls.n_post_sweeps)?;
        Ok(e)
    }

    /// 最细层的一次 V 循环
    fn v_cycle(
        &self,
        system: &LduSystem<'_>,
        smoother: &dyn LduSmoother,
        levels: &[CoarseLevel],
        psi: &mut [f64],
        source: &[f64],
        symmetric: bool,
    ) -> MatrixResult<()> {
        let n = psi.len();
        if self.controls.n_pre_sweeps > 0 {
            smoother.smooth(psi, source, self.controls.n_pre_sweeps)?;
        }
        let mut r = vec![0.0; n];
        system.residual(psi, source, &mut r)?;

        let mut correction = vec![0.0; n];
        match levels.first() {
            Some(first) => {
                let coarse_e =
                    self.coarse_correction(levels, 0, &first.agglomeration.restrict_field(&r), symmetric)?;
                first.agglomeration.prolong_add(&coarse_e, &mut correction);
            }
            // 其他进程仍有粗层：本进程直接在局部矩阵上求修正
            None => correction = self.local_coarsest_correction(system.matrix(), &r)?,
        }
        if symmetric {
            scale_correction(system, &mut correction, &r)?;
        }
        axpy(1.0, &correction, psi);

        smoother.smooth(psi, source, self.controls.n_post_sweeps)
    }
}

/// 修正量缩放：`sf = (e·r)/(e·A·e)`，再做一次 Jacobi 修正
fn scale_correction(system: &LduSystem<'_>, correction: &mut [f64], r: &[f64]) -> MatrixResult<()> {
    let mut a_e = vec![0.0; correction.len()];
    system.amul(correction, &mut a_e)?;
    let num = system.g_sum_prod(correction, r)?;
    let den = system.g_sum_prod(correction, &a_e)?;
    let sf = if den.abs() > VSMALL { num / den } else { 1.0 };
    let diag = system.matrix().diag();
    for (((c, &ae), &ri), &d) in correction.iter_mut().zip(&a_e).zip(r).zip(diag) {
        *c = sf * *c + (ri - sf * ae) / d;
    }
    Ok(())
}

impl LduSolver for GamgSolver {
    fn type_name(&self) -> &'static str {
        "GAMG"
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
        let comm = system.comm();
        let symmetric = comm.all_reduce_and(!system.matrix().asymmetric())?;
        let levels = build_hierarchy(system.matrix(), controls.n_cells_in_coarsest_level)?;
        let direct = comm.all_reduce_and(levels.is_empty())?;

        let mut perf = ScalarPerformance::new(self.type_name(), &self.field_name);
        let InitialResidual { mut r, norm_factor } =
            InitialResidual::compute(system, psi, source, &mut perf)?;

        if !needs_iteration(&mut perf, controls) {
            return Ok(perf);
        }

        if direct {
            // 最细层即最粗层
            let coarse_perf = self.solve_coarsest(system, psi, source)?;
            perf.final_residual = coarse_perf.final_residual;
            perf.n_iterations = coarse_perf.n_iterations;
            perf.singular = coarse_perf.singular;
            perf.check_convergence(controls.tolerance, controls.rel_tol);
            return Ok(perf);
        }

        loop {
            self.v_cycle(system, smoother.as_ref(), &levels, psi, source, symmetric)?;
            system.residual(psi, source, &mut r)?;
            perf.final_residual = system.g_sum_mag(&r)? / norm_factor;
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
    use lf_mesh::LduAddressing;
    use std::sync::Arc;

    /// nx × ny 五点 Poisson 矩阵，对角略加强保证正定
    fn poisson_2d(nx: usize, ny: usize) -> LduMatrix {
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for j in 0..ny {
            for i in 0..nx {
                let c = j * nx + i;
                if i + 1 < nx {
                    lower.push(c);
                    upper.push(c + 1);
                }
                if j + 1 < ny {
                    lower.push(c);
                    upper.push(c + nx);
                }
            }
        }
        let addr = Arc::new(LduAddressing::new(nx * ny, lower, upper).unwrap());
        let mut m = LduMatrix::new(addr);
        m.upper_mut().fill(-1.0);
        m.neg_sum_diag();
        for d in m.diag_mut() {
            *d += 0.01;
        }
        m
    }

    #[test]
    fn test_hierarchy() {
        let m = poisson_2d(16, 16);
        let levels = build_hierarchy(&m, 10).unwrap();
        assert!(levels.len() >= 3);
        let last = levels.last().unwrap();
        assert!(last.matrix.n_cells() <= 10 || levels.len() == MAX_LEVELS);
        let mut prev = m.n_cells();
        for lvl in &levels {
            assert_eq!(lvl.agglomeration.n_fine(), prev);
            assert!(lvl.matrix.n_cells() < prev);
            prev = lvl.matrix.n_cells();
        }
    }

    #[test]
    fn test_gamg_converges() {
        let m = poisson_2d(16, 16);
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let n = m.n_cells();
        let b: Vec<f64> = (0..n).map(|i| ((i * 7) % 11) as f64 - 5.0).collect();
        let mut psi = vec![0.0; n];
        let controls = SolverControls::new("GAMG")
            .with_smoother("GaussSeidel")
            .with_tolerance(1e-8, 0.0)
            .with_max_iter(200);
        let perf = GamgSolver::new("p", &controls).solve(&sys, &mut psi, &b).unwrap();
        assert!(perf.converged(), "{}", perf);
        assert!(perf.n_iterations < 200);
    }

    #[test]
    fn test_gamg_small_matrix_solved_directly() {
        let m = poisson_2d(3, 2);
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 6];
        let controls = SolverControls::new("GAMG").with_tolerance(1e-10, 0.0);
        let perf = GamgSolver::new("p", &controls).solve(&sys, &mut psi, &[1.0; 6]).unwrap();
        assert!(perf.converged());
        assert_eq!(perf.solver_name, "GAMG");
    }

    #[test]
    fn test_gamg_asymmetric() {
        let mut m = poisson_2d(12, 12);
        let lower: Vec<f64> = m.upper().iter().map(|u| 0.5 * u).collect();
        m.lower_mut().copy_from_slice(&lower);
        for d in m.diag_mut() {
            *d += 1.0;
        }
        let comm = SerialComm::new();
        let sys = LduSystem::uncoupled(&m, &comm);
        let mut psi = vec![0.0; 144];
        let controls = SolverControls::new("GAMG")
            .with_smoother("DILU")
            .with_tolerance(1e-8, 0.0)
            .with_max_iter(200);
        let perf = GamgSolver::new("U", &controls).solve(&sys, &mut psi, &vec![1.0; 144]).unwrap();
        assert!(perf.converged(), "{}", perf);
    }
}
