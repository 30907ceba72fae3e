// crates/lf_matrix/src/preconditioners/dilu.rs

//! 对角不完全 LU 预条件器（DILU）
//!
//! M = (D* + L) D*⁻¹ (D* + U)，其中修正对角 D* 满足
//!
//! ```text
//! D*[hi] = D[hi] − Σ a(hi,lo)·a(lo,hi) / D*[lo]
//! ```
//!
//! 不要求面按 owner < neighbour 排列：前代按 (max, min) 排序的面顺序，
//! 回代按 (min, max) 排序的逆序进行。

use super::LduPreconditioner;
use crate::ldu::LduMatrix;

/// 计算修正对角的倒数 1/D*
pub(crate) fn reciprocal_d(matrix: &LduMatrix) -> Vec<f64> {
    let addr = matrix.addressing();
    let l = addr.lower_addr();
    let u = addr.upper_addr();
    let upper = matrix.upper();
    let lower = matrix.lower();
    let mut r_d = matrix.diag().to_vec();
    for &f in addr.backward_order() {
        let (lo, hi) = ordered(l[f], u[f]);
        r_d[hi] -= upper[f] * lower[f] / r_d[lo];
    }
    for d in r_d.iter_mut() {
        *d = 1.0 / *d;
    }
    r_d
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// 前代、回代：w = M⁻¹·r（`transpose` 时为 M⁻ᵀ·r）
pub(crate) fn substitute(matrix: &LduMatrix, r_d: &[f64], r: &[f64], w: &mut [f64], transpose: bool) {
    let addr = matrix.addressing();
    let l = addr.lower_addr();
    let u = addr.upper_addr();
    let (upper, lower) = if transpose {
        (matrix.lower(), matrix.upper())
    } else {
        (matrix.upper(), matrix.lower())
    };

    for ((wi, &ri), &di) in w.iter_mut().zip(r).zip(r_d) {
        *wi = di * ri;
    }

    for &f in addr.forward_order() {
        let (lo, hi) = ordered(l[f], u[f]);
        // a(hi, lo)
        let a = if l[f] == lo { lower[f] } else { upper[f] };
        w[hi] -= r_d[hi] * a * w[lo];
    }

    for &f in addr.backward_order().iter().rev() {
        let (lo, hi) = ordered(l[f], u[f]);
        // a(lo, hi)
        let a = if l[f] == lo { upper[f] } else { lower[f] };
        w[lo] -= r_d[lo] * a * w[hi];
    }
}

/// DILU 预条件器
#[derive(Debug, Clone)]
pub struct DiluPreconditioner<'a> {
    matrix: &'a LduMatrix,
    /// 修正对角的倒数
    r_d: Vec<f64>,
}

impl<'a> DiluPreconditioner<'a> {
    /// 构造并计算修正对角
    pub fn new(matrix: &'a LduMatrix) -> Self {
        Self {
            matrix,
            r_d: reciprocal_d(matrix),
        }
    }

    /// 修正对角的倒数
    pub fn reciprocal_d(&self) -> &[f64] {
        &self.r_d
    }
}

impl LduPreconditioner for DiluPreconditioner<'_> {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        substitute(self.matrix, &self.r_d, r, z, false);
    }

    fn apply_transpose(&self, r: &[f64], z: &mut [f64]) {
        substitute(self.matrix, &self.r_d, r, z, true);
    }

    fn name(&self) -> &'static str {
        "DILU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_mesh::LduAddressing;
    use std::sync::Arc;

    /// 三对角矩阵上 ILU(0) 没有填充，预条件器即精确逆
    fn chain(lower: Vec<usize>, upper: Vec<usize>, u: f64, lo: f64) -> LduMatrix {
        let addr = Arc::new(LduAddressing::new(4, lower, upper).unwrap());
        let mut m = LduMatrix::new(addr);
        m.diag_mut().copy_from_slice(&[4.0, 5.0, 4.0, 6.0]);
        m.upper_mut().fill(u);
        m.lower_mut().fill(lo);
        m
    }

    fn check_exact(m: &LduMatrix) {
        let p = DiluPreconditioner::new(m);
        let r = [1.0, -2.0, 3.0, 0.5];

        let mut z = [0.0; 4];
        p.apply(&r, &mut z);
        let mut az = [0.0; 4];
        m.amul(&z, &mut az).unwrap();
        for (a, b) in az.iter().zip(&r) {
            assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
        }

        p.apply_transpose(&r, &mut z);
        m.tmul(&z, &mut az).unwrap();
        for (a, b) in az.iter().zip(&r) {
            assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_exact_on_chain() {
        check_exact(&chain(vec![0, 1, 2], vec![1, 2, 3], -1.0, -2.0));
    }

    #[test]
    fn test_exact_on_flipped_faces() {
        // 面的 owner 大于 neighbour，且面顺序打乱
        check_exact(&chain(vec![3, 1, 2], vec![2, 0, 1], -1.5, -0.5));
    }
}
