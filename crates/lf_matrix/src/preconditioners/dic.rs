// crates/lf_matrix/src/preconditioners/dic.rs

//! 对角不完全 Cholesky 预条件器（DIC）
//!
//! DILU 在对称矩阵上的特例：`D*[hi] = D[hi] − Σ upper² / D*[lo]`，
//! 转置与自身相同。

use super::dilu::{reciprocal_d, substitute};
use super::LduPreconditioner;
use crate::ldu::LduMatrix;

/// DIC 预条件器（仅对称矩阵）
#[derive(Debug, Clone)]
pub struct DicPreconditioner<'a> {
    matrix: &'a LduMatrix,
    r_d: Vec<f64>,
}

impl<'a> DicPreconditioner<'a> {
    /// 构造并计算修正对角
    pub fn new(matrix: &'a LduMatrix) -> Self {
        debug_assert!(!matrix.asymmetric());
        Self {
            matrix,
            r_d: reciprocal_d(matrix),
        }
    }
}

impl LduPreconditioner for DicPreconditioner<'_> {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        substitute(self.matrix, &self.r_d, r, z, false);
    }

    fn name(&self) -> &'static str {
        "DIC"
    }
}
