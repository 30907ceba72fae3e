// crates/lf_matrix/src/fv/constraints.rs

//! 隐式松弛、参考值与定值约束

use lf_config::FvSolution;
use lf_foundation::FieldValue;

use super::matrix::EquationMatrix;
use crate::error::{MatrixError, MatrixResult};
use crate::field::GeometricField;

impl<T: FieldValue> EquationMatrix<T> {
    /// 隐式欠松弛
    ///
    /// 先把边界贡献计入有效对角元并保证对角占优
    /// `D = max(D, Σ|offdiag|)`，再 `D ← D/α`，最后
    /// `source += (D_new − D_old)·ψ`，因此收敛解不变。
    /// `α ≤ 0` 或 `α ≥ 1` 时矩阵与右端项保持不变。
    pub fn relax(&mut self, alpha: f64, psi: &GeometricField<T>) -> MatrixResult<()> {
        self.require_unsolved("relax")?;
        self.check_psi(psi)?;
        if alpha <= 0.0 || alpha >= 1.0 {
            return Ok(());
        }
        let folded = self.state.folded();
        let boundary = self.mesh.boundary();
        let d0 = self.ldu.diag().to_vec();
        let mut d = d0.clone();
        let mut sum_off = vec![0.0; d.len()];
        self.ldu.sum_mag_off_diag(&mut sum_off)?;

        for (i, patch) in boundary.iter().enumerate() {
            let ic = self.coeffs.internal(i);
            let bc = self.coeffs.boundary(i);
            for ((&c, &ic), &bc) in patch.face_cells.iter().zip(ic).zip(bc) {
                if folded {
                    d[c] -= ic.cmpt_av();
                }
                if patch.coupled() {
                    d[c] += ic.component(0);
                    sum_off[c] += bc.component(0).abs();
                } else {
                    d[c] += ic.cmpt_mag().cmpt_max();
                }
            }
        }

        for (c, (dc, &off)) in d.iter_mut().zip(&sum_off).enumerate() {
            if *dc <= 0.0 {
                return Err(MatrixError::NonPositiveDiagonal { cell: c, value: *dc });
            }
            *dc = dc.max(off) / alpha;
        }

        for (i, patch) in boundary.iter().enumerate() {
            for (&c, &ic) in patch.face_cells.iter().zip(self.coeffs.internal(i)) {
                if patch.coupled() {
                    d[c] -= ic.component(0);
                } else {
                    d[c] -= ic.cmpt_min();
                }
                if folded {
                    d[c] += ic.cmpt_av();
                }
            }
        }

        for ((s, &p), (&dn, &dold)) in self.source.iter_mut().zip(psi.internal()).zip(d.iter().zip(&d0)) {
            *s += p * (dn - dold);
        }
        self.ldu.diag_mut().copy_from_slice(&d);
        log::debug!("{}: 隐式松弛 α = {}", self.psi_name, alpha);
        Ok(())
    }

    /// 使用求解字典中的方程松弛因子松弛，未配置时不做任何事
    pub fn relax_from(&mut self, solution: &FvSolution, psi: &GeometricField<T>) -> MatrixResult<()> {
        match solution.relaxation_factors.equation_factor(&self.psi_name) {
            Some(alpha) => self.relax(alpha, psi),
            None => Ok(()),
        }
    }

    /// 固定参考值
    ///
    /// 当场需要参考值（各 rank 上都没有固定场水平的边界）或 `force` 为真时，
    /// `source[cell] += diag[cell]·value; diag[cell] += diag[cell]`。
    /// 参考单元不在本 rank 时传 `None`；所有 rank 都必须调用。
    /// 返回是否施加了参考值。
    pub fn set_reference(
        &mut self,
        psi: &GeometricField<T>,
        cell: Option<usize>,
        value: T,
        force: bool,
    ) -> MatrixResult<bool> {
        self.require_unsolved("set_reference")?;
        self.check_psi(psi)?;
        let need = psi.need_reference()? || force;
        let Some(cell) = cell.filter(|_| need) else {
            return Ok(false);
        };
        if cell >= self.ldu.n_cells() {
            return Err(MatrixError::AddressingMismatch {
                what: "参考单元".to_string(),
                expected: self.ldu.n_cells(),
                actual: cell,
            });
        }
        let d = self.ldu.diag()[cell];
        self.source[cell] += value * d;
        self.ldu.diag_mut()[cell] += d;
        log::debug!("{}: 单元 {} 参考值 {:?}", self.psi_name, cell, value);
        Ok(true)
    }

    /// 把指定单元约束为给定值
    ///
    /// 该行变为 `ψ = v`（对角取 1，右端项取 v），被消去列的贡献移到
    /// 相邻单元的右端项，行与列的非对角系数以及该单元的边界系数清零。
    pub fn set_values(&mut self, psi: &mut GeometricField<T>, cells: &[usize], values: &[T]) -> MatrixResult<()> {
        self.require_unsolved("set_values")?;
        self.check_psi(psi)?;
        MatrixError::check_len("约束值", cells.len(), values.len())?;
        let n = self.ldu.n_cells();
        if let Some(&c) = cells.iter().find(|&&c| c >= n) {
            return Err(MatrixError::AddressingMismatch {
                what: "约束单元".to_string(),
                expected: n,
                actual: c,
            });
        }
        let addressing = std::sync::Arc::clone(self.ldu.addressing_arc());
        let l = addressing.lower_addr();
        let u = addressing.upper_addr();
        let has_lower = self.ldu.has_lower();

        for (&c, &v) in cells.iter().zip(values) {
            psi.internal_mut()[c] = v;
            self.ldu.diag_mut()[c] = 1.0;
            self.source[c] = v;

            for &f in addressing.owned_faces(c) {
                let coeff = self.ldu.lower()[f];
                self.source[u[f]] -= v * coeff;
            }
            for &f in addressing.neighbour_faces(c) {
                let coeff = self.ldu.upper()[f];
                self.source[l[f]] -= v * coeff;
            }
            self.coeffs.zero_cell(c, self.mesh.boundary());
            if self.ldu.diagonal() {
                continue;
            }
            let faces: Vec<usize> = addressing.cell_faces(c).collect();
            if has_lower {
                let (upper, lower) = self.ldu.upper_lower_mut();
                for &f in &faces {
                    upper[f] = 0.0;
                    lower[f] = 0.0;
                }
            } else {
                let upper = self.ldu.upper_mut();
                for &f in &faces {
                    upper[f] = 0.0;
                }
            }
        }
        log::debug!("{}: 约束 {} 个单元的值", self.psi_name, cells.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PatchFieldSpec;
    use crate::fv::MatrixState;
    use lf_config::SolverControls;
    use lf_foundation::DimensionSet;
    use lf_mesh::generation::LineMeshGenerator;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn field(left: PatchFieldSpec) -> GeometricField<f64> {
        let mesh = Arc::new(LineMeshGenerator::new(4, 4.0).build().unwrap());
        let mut specs = BTreeMap::new();
        specs.insert("left".to_string(), left);
        specs.insert("right".to_string(), PatchFieldSpec::zero_gradient());
        GeometricField::from_specs("p", DimensionSet::DIMLESS, mesh, vec![1.0, 2.0, 3.0, 4.0], &specs).unwrap()
    }

    /// 一维扩散算子，左边界系数 ic
    fn diffusion(psi: &GeometricField<f64>, ic: f64, bc: f64) -> EquationMatrix<f64> {
        let mut m = EquationMatrix::new(psi, DimensionSet::VOLUME);
        m.ldu.upper_mut().fill(-1.0);
        m.ldu.neg_sum_diag();
        m.coeffs.set_patch(0, vec![ic], vec![bc]).unwrap();
        m
    }

    #[test]
    fn test_relax_scales_diagonal() {
        let psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 0.0);
        m.relax(0.5, &psi).unwrap();
        // (1 + 2)/0.5 − 2
        assert_eq!(m.ldu().diag(), &[4.0, 4.0, 4.0, 2.0]);
        assert_eq!(m.source(), &[3.0, 4.0, 6.0, 4.0]);
    }

    #[test]
    fn test_relax_after_fold_matches() {
        let psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut a = diffusion(&psi, 2.0, 1.0);
        let mut b = a.clone();
        a.relax(0.7, &psi).unwrap();
        a.fold_boundary().unwrap();
        b.fold_boundary().unwrap();
        b.relax(0.7, &psi).unwrap();
        for (x, y) in a.ldu().diag().iter().zip(b.ldu().diag()) {
            assert!((x - y).abs() < 1e-12);
        }
        for (x, y) in a.source().iter().zip(b.source()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_relax_unit_factor_is_noop() {
        let psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 1.0);
        // 非对角占优：行 1 的 Σ|offdiag| = 4 > diag = 2
        m.ldu.lower_mut().fill(3.0);
        let diag = m.ldu().diag().to_vec();
        let source = m.source().to_vec();
        for alpha in [1.0, 1.5] {
            m.relax(alpha, &psi).unwrap();
            assert_eq!(m.ldu().diag(), diag.as_slice());
            assert_eq!(m.source(), source.as_slice());
        }
    }

    #[test]
    fn test_relax_rejects_negative_diagonal() {
        let psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 0.0);
        m.try_negate().unwrap();
        let err = m.relax(0.5, &psi).unwrap_err();
        assert!(matches!(err, MatrixError::NonPositiveDiagonal { cell: 1, .. }));
        // α ≤ 0 不做任何事
        assert!(m.relax(0.0, &psi).is_ok());
    }

    #[test]
    fn test_relax_from_dictionary() {
        let psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 0.0);
        let solution = FvSolution::from_json_str(r#"{ "relaxationFactors": { "equations": { "U": 0.5 } } }"#).unwrap();
        m.relax_from(&solution, &psi).unwrap();
        assert_eq!(m.ldu().diag(), &[1.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn test_set_reference_only_when_needed() {
        let psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 0.0);
        assert!(!m.set_reference(&psi, Some(0), 5.0, false).unwrap());
        assert!(m.set_reference(&psi, Some(3), 5.0, true).unwrap());
        assert_eq!(m.ldu().diag()[3], 2.0);
        assert_eq!(m.source()[3], 5.0);
        assert!(m.set_reference(&psi, Some(9), 5.0, true).is_err());

        let psi = field(PatchFieldSpec::zero_gradient());
        let mut m = diffusion(&psi, 0.0, 0.0);
        assert!(m.set_reference(&psi, Some(0), 5.0, false).unwrap());
        assert!(!m.set_reference(&psi, None, 5.0, false).unwrap());
    }

    #[test]
    fn test_set_values_decouples_row() {
        let mut psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 0.0);
        m.set_values(&mut psi, &[1], &[7.0]).unwrap();
        assert_eq!(psi.internal()[1], 7.0);
        assert_eq!(m.ldu().diag(), &[1.0, 1.0, 2.0, 1.0]);
        assert_eq!(m.source(), &[7.0, 7.0, 7.0, 0.0]);
        assert_eq!(m.ldu().upper(), &[0.0, 0.0, -1.0]);
        assert!(m.ldu().symmetric());
        assert!(m.set_values(&mut psi, &[1], &[]).is_err());
    }

    #[test]
    fn test_constraints_rejected_after_solve() {
        let mut psi = field(PatchFieldSpec::fixed_value(0.0));
        let mut m = diffusion(&psi, 2.0, 0.0);
        m.solve(&mut psi, &SolverControls::new("PCG").with_preconditioner("DIC")).unwrap();
        assert_eq!(m.state(), MatrixState::Solved);
        assert!(matches!(m.relax(0.5, &psi), Err(MatrixError::InvalidState { .. })));
        assert!(m.set_reference(&psi, Some(0), 0.0, true).is_err());
        assert!(m.set_values(&mut psi, &[0], &[0.0]).is_err());
    }
}
