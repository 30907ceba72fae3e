// crates/lf_matrix/src/solvers/gamg/agglomeration.rs

//! 成对代数聚合
//!
//! 按单元编号依次处理未分组单元：
//!
//! 1. 与连接强度最大的未分组邻居组成一对
//! 2. 邻居均已分组时并入连接强度最大的邻居所在组
//! 3. 没有邻居时单独成组
//!
//! 面连接强度为 `max(|upper|, |lower|)`。粗层矩阵按 Galerkin 求和构造：
//! 组内面的系数并入粗层对角，组间面的系数累加到粗层面。

use std::collections::BTreeMap;
use std::sync::Arc;

use lf_mesh::LduAddressing;

use crate::error::{MatrixError, MatrixResult};
use crate::ldu::LduMatrix;

const UNGROUPED: usize = usize::MAX;

/// 细层到粗层的单元映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agglomeration {
    /// 每个细层单元所属的粗层单元
    restrict_addressing: Vec<usize>,
    /// 粗层单元数
    n_coarse: usize,
}

impl Agglomeration {
    /// 对矩阵的连接图做成对聚合
    pub fn pairwise(matrix: &LduMatrix) -> Self {
        let addr = matrix.addressing();
        let l = addr.lower_addr();
        let u = addr.upper_addr();
        let upper = matrix.upper();
        let lower = matrix.lower();
        let n = addr.n_cells();

        let mut group = vec![UNGROUPED; n];
        let mut n_coarse = 0;

        for c in 0..n {
            if group[c] != UNGROUPED {
                continue;
            }
            let mut best_free: Option<(usize, f64)> = None;
            let mut best_grouped: Option<(usize, f64)> = None;
            for f in addr.cell_faces(c) {
                let other = if l[f] == c { u[f] } else { l[f] };
                let strength = upper[f].abs().max(lower[f].abs());
                let best = if group[other] == UNGROUPED {
                    &mut best_free
                } else {
                    &mut best_grouped
                };
                if best.map_or(true, |(_, s)| strength > s) {
                    *best = Some((other, strength));
                }
            }

            match (best_free, best_grouped) {
                (Some((other, _)), _) => {
                    group[c] = n_coarse;
                    group[other] = n_coarse;
                    n_coarse += 1;
                }
                (None, Some((other, _))) => group[c] = group[other],
                (None, None) => {
                    group[c] = n_coarse;
                    n_coarse += 1;
                }
            }
        }

        Self {
            restrict_addressing: group,
            n_coarse,
        }
    }

    /// 细层单元数
    #[inline]
    pub fn n_fine(&self) -> usize {
        self.restrict_addressing.len()
    }

    /// 粗层单元数
    #[inline]
    pub fn n_coarse(&self) -> usize {
        self.n_coarse
    }

    /// 细层单元到粗层单元的映射
    #[inline]
    pub fn restrict_addressing(&self) -> &[usize] {
        &self.restrict_addressing
    }

    /// 限制：粗层值为组内细层值之和
    pub fn restrict_field(&self, fine: &[f64]) -> Vec<f64> {
        let mut coarse = vec![0.0; self.n_coarse];
        for (&g, &v) in self.restrict_addressing.iter().zip(fine) {
            coarse[g] += v;
        }
        coarse
    }

    /// 延拓并累加：`fine[i] += coarse[group(i)]`
    pub fn prolong_add(&self, coarse: &[f64], fine: &mut [f64]) {
        for (f, &g) in fine.iter_mut().zip(&self.restrict_addressing) {
            *f += coarse[g];
        }
    }

    /// Galerkin 粗层矩阵
    pub fn coarse_matrix(&self, fine: &LduMatrix) -> MatrixResult<LduMatrix> {
        MatrixError::check_len("agglomeration", self.n_fine(), fine.n_cells())?;
        let addr = fine.addressing();
        let l = addr.lower_addr();
        let u = addr.upper_addr();
        let upper = fine.upper();
        let lower = fine.lower();
        let g = &self.restrict_addressing;

        let mut diag = self.restrict_field(fine.diag());
        // (lo, hi) -> (a(lo,hi), a(hi,lo))
        let mut faces: BTreeMap<(usize, usize), (f64, f64)> = BTreeMap::new();
        for f in 0..addr.n_faces() {
            let (cl, cu) = (g[l[f]], g[u[f]]);
            if cl == cu {
                diag[cl] += upper[f] + lower[f];
            } else if cl < cu {
                let e = faces.entry((cl, cu)).or_insert((0.0, 0.0));
                e.0 += upper[f];
                e.1 += lower[f];
            } else {
                let e = faces.entry((cu, cl)).or_insert((0.0, 0.0));
                e.0 += lower[f];
                e.1 += upper[f];
            }
        }

        let (coarse_lower, coarse_upper): (Vec<usize>, Vec<usize>) = faces.keys().copied().unzip();
        let coarse_addr = LduAddressing::new(self.n_coarse, coarse_lower, coarse_upper)?;
        let mut coarse = LduMatrix::new(Arc::new(coarse_addr));
        coarse.diag_mut().copy_from_slice(&diag);
        if !faces.is_empty() {
            for (dst, &(a_up, _)) in coarse.upper_mut().iter_mut().zip(faces.values()) {
                *dst = a_up;
            }
            if fine.asymmetric() {
                for (dst, &(_, a_lo)) in coarse.lower_mut().iter_mut().zip(faces.values()) {
                    *dst = a_lo;
                }
            }
        }
        Ok(coarse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize, asymmetric: bool) -> LduMatrix {
        let lower: Vec<usize> = (0..n - 1).collect();
        let upper: Vec<usize> = (1..n).collect();
        let addr = Arc::new(LduAddressing::new(n, lower, upper).unwrap());
        let mut m = LduMatrix::new(addr);
        m.diag_mut().fill(2.0);
        m.upper_mut().fill(-1.0);
        if asymmetric {
            m.lower_mut().fill(-0.5);
        }
        m
    }

    #[test]
    fn test_pairwise_even_chain() {
        let a = Agglomeration::pairwise(&chain(6, false));
        assert_eq!(a.n_coarse(), 3);
        assert_eq!(a.restrict_addressing(), &[0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_pairwise_odd_chain() {
        let a = Agglomeration::pairwise(&chain(5, false));
        assert_eq!(a.n_coarse(), 2);
        assert_eq!(a.restrict_addressing(), &[0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_disconnected_singletons() {
        let m = LduMatrix::new(Arc::new(LduAddressing::disconnected(3)));
        let a = Agglomeration::pairwise(&m);
        assert_eq!(a.n_coarse(), 3);
    }

    #[test]
    fn test_coarse_matrix_values() {
        let fine = chain(4, false);
        let a = Agglomeration::pairwise(&fine);
        let coarse = a.coarse_matrix(&fine).unwrap();
        assert_eq!(coarse.diag(), &[2.0, 2.0]);
        assert_eq!(coarse.upper(), &[-1.0]);
        assert!(coarse.symmetric());
    }

    #[test]
    fn test_galerkin_identity() {
        // A_c·x_c == R·A·P·x_c
        for asymmetric in [false, true] {
            let fine = chain(7, asymmetric);
            let a = Agglomeration::pairwise(&fine);
            let coarse = a.coarse_matrix(&fine).unwrap();
            assert_eq!(coarse.asymmetric(), asymmetric);
            let xc: Vec<f64> = (0..a.n_coarse()).map(|i| 1.0 + i as f64 * 0.7).collect();
            let mut xf = vec![0.0; 7];
            a.prolong_add(&xc, &mut xf);
            let mut axf = vec![0.0; 7];
            fine.amul(&xf, &mut axf).unwrap();
            let expected = a.restrict_field(&axf);
            let mut actual = vec![0.0; a.n_coarse()];
            coarse.amul(&xc, &mut actual).unwrap();
            for (x, y) in actual.iter().zip(&expected) {
                assert!((x - y).abs() < 1e-12);
            }
        }
    }
}
