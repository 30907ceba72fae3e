// crates/lf_matrix/src/smoothers/gauss_seidel.rs

//! Gauss-Seidel 光滑器
//!
//! 每次扫描先交换耦合界面值，把界面贡献显式移到右端：
//!
//! ```text
//! b' = b + bouCoeffs · ψ_nbr
//! ψ_i = (b'_i − Σ_j a(i,j)·ψ_j) / a(i,i)
//! ```
//!
//! 行内求和使用最新的 ψ 值，因此结果与单元顺序有关。

use super::LduSmoother;
use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduSystem;

/// 按给定单元顺序做一次 Gauss-Seidel 扫描
fn sweep(system: &LduSystem<'_>, psi: &mut [f64], b_prime: &[f64], cells: impl Iterator<Item = usize>) {
    let matrix = system.matrix();
    let addr = matrix.addressing();
    let l = addr.lower_addr();
    let u = addr.upper_addr();
    let diag = matrix.diag();
    let upper = matrix.upper();
    let lower = matrix.lower();

    for c in cells {
        let mut psi_c = b_prime[c];
        for &f in addr.owned_faces(c) {
            psi_c -= upper[f] * psi[u[f]];
        }
        for &f in addr.neighbour_faces(c) {
            psi_c -= lower[f] * psi[l[f]];
        }
        psi[c] = psi_c / diag[c];
    }
}

fn check(system: &LduSystem<'_>, psi: &[f64], source: &[f64]) -> MatrixResult<()> {
    MatrixError::check_len("smoother psi", system.n_cells(), psi.len())?;
    MatrixError::check_len("smoother source", system.n_cells(), source.len())
}

/// Gauss-Seidel 光滑器（按单元编号正序）
#[derive(Clone, Copy)]
pub struct GaussSeidelSmoother<'a> {
    system: LduSystem<'a>,
}

impl<'a> GaussSeidelSmoother<'a> {
    /// 创建
    pub fn new(system: LduSystem<'a>) -> Self {
        Self { system }
    }
}

impl LduSmoother for GaussSeidelSmoother<'_> {
    fn smooth(&self, psi: &mut [f64], source: &[f64], n_sweeps: usize) -> MatrixResult<()> {
        check(&self.system, psi, source)?;
        let n = psi.len();
        for _ in 0..n_sweeps {
            let b_prime = self.system.coupled_source(psi, source)?;
            sweep(&self.system, psi, &b_prime, 0..n);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "GaussSeidel"
    }
}

/// 对称 Gauss-Seidel 光滑器：正序扫描后再逆序扫描
#[derive(Clone, Copy)]
pub struct SymGaussSeidelSmoother<'a> {
    system: LduSystem<'a>,
}

impl<'a> SymGaussSeidelSmoother<'a> {
    /// 创建
    pub fn new(system: LduSystem<'a>) -> Self {
        Self { system }
    }
}

impl LduSmoother for SymGaussSeidelSmoother<'_> {
    fn smooth(&self, psi: &mut [f64], source: &[f64], n_sweeps: usize) -> MatrixResult<()> {
        check(&self.system, psi, source)?;
        let n = psi.len();
        for _ in 0..n_sweeps {
            let b_prime = self.system.coupled_source(psi, source)?;
            sweep(&self.system, psi, &b_prime, 0..n);
            let b_prime = self.system.coupled_source(psi, source)?;
            sweep(&self.system, psi, &b_prime, (0..n).rev());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "symGaussSeidel"
    }
}
