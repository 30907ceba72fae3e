// crates/lf_matrix/src/fvm/sources.rs

//! 源项
//!
//! - `su`：显式源项，`source −= V·su`
//! - `sp`：隐式线性源项，`diag += V·sp`
//! - `susp`：按符号拆分，正系数隐式、负系数显式，保持对角占优

use lf_foundation::{DimensionSet, DimensionedScalar, FieldValue};

use crate::error::{MatrixError, MatrixResult};
use crate::field::GeometricField;
use crate::fv::EquationMatrix;

/// 显式源项
///
/// 矩阵量纲为 `su_dims × 单元度量`。
pub fn su<T: FieldValue>(su: &[T], su_dims: DimensionSet, psi: &GeometricField<T>) -> MatrixResult<EquationMatrix<T>> {
    let mut m = EquationMatrix::new(psi, su_dims * psi.mesh().measure_dims());
    m.add_source(su, su_dims)?;
    Ok(m)
}

/// 逐单元系数的隐式源项 `sp·ψ`
pub fn sp<T: FieldValue>(sp: &[f64], sp_dims: DimensionSet, psi: &GeometricField<T>) -> MatrixResult<EquationMatrix<T>> {
    let mesh = psi.mesh();
    MatrixError::check_len("Sp 系数", mesh.n_cells(), sp.len())?;
    let mut m = EquationMatrix::new(psi, sp_dims * psi.dimensions() * mesh.measure_dims());
    for ((d, &s), &v) in m.ldu_mut()?.diag_mut().iter_mut().zip(sp).zip(mesh.measures()) {
        *d += v * s;
    }
    Ok(m)
}

/// 均匀系数的隐式源项
pub fn sp_uniform<T: FieldValue>(sp_value: &DimensionedScalar, psi: &GeometricField<T>) -> MatrixResult<EquationMatrix<T>> {
    sp(&vec![sp_value.value; psi.mesh().n_cells()], sp_value.dimensions, psi)
}

/// 逐单元系数的隐式/显式混合源项 `susp·ψ`
///
/// `susp > 0` 的单元进入对角元，其余以当前 ψ 显式进入右端项。
pub fn susp<T: FieldValue>(
    susp: &[f64],
    susp_dims: DimensionSet,
    psi: &GeometricField<T>,
) -> MatrixResult<EquationMatrix<T>> {
    let mesh = psi.mesh();
    MatrixError::check_len("SuSp 系数", mesh.n_cells(), susp.len())?;
    let mut m = EquationMatrix::new(psi, susp_dims * psi.dimensions() * mesh.measure_dims());
    for ((d, &s), &v) in m.ldu_mut()?.diag_mut().iter_mut().zip(susp).zip(mesh.measures()) {
        *d += v * s.max(0.0);
    }
    for (((b, &s), &v), &p) in m
        .source_mut()?
        .iter_mut()
        .zip(susp)
        .zip(mesh.measures())
        .zip(psi.internal())
    {
        *b -= p * (v * s.min(0.0));
    }
    Ok(m)
}

/// 均匀系数的混合源项
pub fn susp_uniform<T: FieldValue>(
    susp_value: &DimensionedScalar,
    psi: &GeometricField<T>,
) -> MatrixResult<EquationMatrix<T>> {
    susp(&vec![susp_value.value; psi.mesh().n_cells()], susp_value.dimensions, psi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PatchFieldSpec;
    use lf_mesh::generation::LineMeshGenerator;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn field() -> GeometricField<f64> {
        let mesh = Arc::new(LineMeshGenerator::new(2, 4.0).build().unwrap());
        let specs = BTreeMap::from([
            ("left".to_string(), PatchFieldSpec::zero_gradient()),
            ("right".to_string(), PatchFieldSpec::zero_gradient()),
        ]);
        GeometricField::from_specs("T", DimensionSet::TEMPERATURE, mesh, vec![3.0, 5.0], &specs).unwrap()
    }

    #[test]
    fn test_su() {
        let t = field();
        let dims = DimensionSet::TEMPERATURE / DimensionSet::TIME;
        let m = su(&[1.0, 2.0], dims, &t).unwrap();
        assert_eq!(m.source(), &[-2.0, -4.0]);
        assert!(m.ldu().diagonal());
        assert!(su(&[1.0], dims, &t).is_err());
    }

    #[test]
    fn test_sp() {
        let t = field();
        let rate = DimensionedScalar::new("k", DimensionSet::TIME.pow(-1), 0.5);
        let m = sp_uniform(&rate, &t).unwrap();
        assert_eq!(m.ldu().diag(), &[1.0, 1.0]);
        assert_eq!(m.source(), &[0.0, 0.0]);
        assert_eq!(m.dimensions(), DimensionSet::TEMPERATURE / DimensionSet::TIME * DimensionSet::VOLUME);
    }

    #[test]
    fn test_susp_splits_by_sign() {
        let t = field();
        let m = susp(&[1.0, -1.0], DimensionSet::TIME.pow(-1), &t).unwrap();
        assert_eq!(m.ldu().diag(), &[2.0, 0.0]);
        // 负系数显式：source −= V·s·ψ
        assert_eq!(m.source(), &[0.0, 10.0]);
    }
}
