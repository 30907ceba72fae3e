// crates/lf_matrix/src/fv/ops.rs

//! 组合运算符
//!
//! 运算符消耗左操作数并返回结果；出错（量纲不一致、场不匹配、状态错误）
//! 时以诊断信息 panic。需要处理错误时使用 `try_*` 方法。

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use lf_foundation::FieldValue;

use super::matrix::EquationMatrix;
use crate::error::MatrixResult;

#[track_caller]
fn fail_fast(result: MatrixResult<()>) {
    if let Err(e) = result {
        panic!("方程矩阵运算失败: {}", e);
    }
}

impl<T: FieldValue> AddAssign<&EquationMatrix<T>> for EquationMatrix<T> {
    #[track_caller]
    fn add_assign(&mut self, rhs: &EquationMatrix<T>) {
        fail_fast(self.try_add(rhs));
    }
}

impl<T: FieldValue> AddAssign for EquationMatrix<T> {
    #[track_caller]
    fn add_assign(&mut self, rhs: EquationMatrix<T>) {
        fail_fast(self.try_add(&rhs));
    }
}

impl<T: FieldValue> SubAssign<&EquationMatrix<T>> for EquationMatrix<T> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: &EquationMatrix<T>) {
        fail_fast(self.try_sub(rhs));
    }
}

impl<T: FieldValue> SubAssign for EquationMatrix<T> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: EquationMatrix<T>) {
        fail_fast(self.try_sub(&rhs));
    }
}

impl<T: FieldValue> Add for EquationMatrix<T> {
    type Output = EquationMatrix<T>;

    #[track_caller]
    fn add(mut self, rhs: EquationMatrix<T>) -> Self::Output {
        fail_fast(self.try_add(&rhs));
        self
    }
}

impl<T: FieldValue> Sub for EquationMatrix<T> {
    type Output = EquationMatrix<T>;

    #[track_caller]
    fn sub(mut self, rhs: EquationMatrix<T>) -> Self::Output {
        fail_fast(self.try_sub(&rhs));
        self
    }
}

impl<T: FieldValue> Neg for EquationMatrix<T> {
    type Output = EquationMatrix<T>;

    #[track_caller]
    fn neg(mut self) -> Self::Output {
        fail_fast(self.try_negate());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PatchFieldSpec;
    use crate::field::GeometricField;
    use lf_foundation::DimensionSet;
    use lf_mesh::generation::LineMeshGenerator;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn psi() -> GeometricField<f64> {
        let mesh = Arc::new(LineMeshGenerator::new(2, 2.0).build().unwrap());
        let specs = BTreeMap::from([
            ("left".to_string(), PatchFieldSpec::zero_gradient()),
            ("right".to_string(), PatchFieldSpec::zero_gradient()),
        ]);
        GeometricField::from_specs("T", DimensionSet::DIMLESS, mesh, vec![0.0; 2], &specs).unwrap()
    }

    fn diag(psi: &GeometricField<f64>, d: f64, dims: DimensionSet) -> EquationMatrix<f64> {
        let mut m = EquationMatrix::new(psi, dims);
        m.ldu_mut().unwrap().diag_mut().fill(d);
        m.source_mut().unwrap().fill(d);
        m
    }

    #[test]
    fn test_operators() {
        let p = psi();
        let a = diag(&p, 1.0, DimensionSet::VOLUME);
        let b = diag(&p, 2.0, DimensionSet::VOLUME);
        let mut c = -(a.clone() + b.clone()) - a.clone();
        assert_eq!(c.ldu().diag(), &[-4.0, -4.0]);
        c += &b;
        c -= a;
        assert_eq!(c.ldu().diag(), &[-3.0, -3.0]);
        assert_eq!(c.source(), &[-3.0, -3.0]);
    }

    #[test]
    #[should_panic(expected = "量纲不一致")]
    fn test_dimension_mismatch_panics() {
        let p = psi();
        let a = diag(&p, 1.0, DimensionSet::VOLUME);
        let b = diag(&p, 1.0, DimensionSet::AREA);
        let _ = a + b;
    }
}
