// crates/lf_matrix/src/boundary/zero_gradient.rs

//! 零梯度边界

use lf_foundation::FieldValue;
use lf_mesh::Patch;

use super::patch_field::{patch_internal_field, uniform_coeffs, PatchField};
use super::spec::PatchFieldSpec;
use crate::error::MatrixResult;

/// 零梯度边界：ψ_b = ψ_P
#[derive(Debug, Clone)]
pub struct ZeroGradientPatchField<T> {
    patch_index: usize,
    values: Vec<T>,
}

impl<T: FieldValue> ZeroGradientPatchField<T> {
    /// 创建，边界值在首次求值前为零
    pub fn new(patch_index: usize, patch: &Patch) -> Self {
        Self {
            patch_index,
            values: vec![T::zero(); patch.size()],
        }
    }

    /// 注册表构造函数
    pub fn from_spec(patch_index: usize, patch: &Patch, _spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>> {
        Ok(Box::new(Self::new(patch_index, patch)))
    }
}

impl<T: FieldValue> PatchField<T> for ZeroGradientPatchField<T> {
    fn type_name(&self) -> &'static str {
        "zeroGradient"
    }

    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn evaluate(&mut self, patch: &Patch, internal: &[T], _neighbour: Option<&[T]>) -> MatrixResult<()> {
        self.values = patch_internal_field(patch, internal);
        Ok(())
    }

    fn sn_grad(&self, patch: &Patch, _internal: &[T]) -> Vec<T> {
        uniform_coeffs(patch, 0.0)
    }

    fn value_internal_coeffs(&self, patch: &Patch, _weights: &[f64]) -> Vec<T> {
        uniform_coeffs(patch, 1.0)
    }

    fn value_boundary_coeffs(&self, patch: &Patch, _weights: &[f64]) -> Vec<T> {
        uniform_coeffs(patch, 0.0)
    }

    fn gradient_internal_coeffs(&self, patch: &Patch) -> Vec<T> {
        uniform_coeffs(patch, 0.0)
    }

    fn gradient_boundary_coeffs(&self, patch: &Patch) -> Vec<T> {
        uniform_coeffs(patch, 0.0)
    }

    fn clone_box(&self) -> Box<dyn PatchField<T>> {
        Box::new(self.clone())
    }
}
