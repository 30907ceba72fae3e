// crates/lf_matrix/src/preconditioners/diagonal.rs

//! 对角预条件器

use super::LduPreconditioner;
use crate::ldu::LduMatrix;

/// 对角（Jacobi）预条件器
///
/// M = diag(A)，即 z_i = r_i / A_ii
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner {
    /// 对角元素的倒数
    r_d: Vec<f64>,
}

impl DiagonalPreconditioner {
    /// 从矩阵对角构造
    pub fn new(matrix: &LduMatrix) -> Self {
        Self {
            r_d: matrix.diag().iter().map(|&d| 1.0 / d).collect(),
        }
    }
}

impl LduPreconditioner for DiagonalPreconditioner {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        for ((zi, &ri), &di) in z.iter_mut().zip(r).zip(&self.r_d) {
            *zi = di * ri;
        }
    }

    fn name(&self) -> &'static str {
        "diagonal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_mesh::LduAddressing;
    use std::sync::Arc;

    #[test]
    fn test_apply() {
        let mut m = LduMatrix::new(Arc::new(LduAddressing::disconnected(2)));
        m.diag_mut().copy_from_slice(&[2.0, 4.0]);
        let p = DiagonalPreconditioner::new(&m);
        let mut z = [0.0; 2];
        p.apply(&[1.0, 1.0], &mut z);
        assert_eq!(z, [0.5, 0.25]);
    }
}
