// crates/lf_matrix/src/boundary/fixed_value.rs

//! 定值边界

use lf_foundation::FieldValue;
use lf_mesh::Patch;

use super::patch_field::{patch_internal_field, uniform_coeffs, PatchField};
use super::spec::PatchFieldSpec;
use crate::error::MatrixResult;

/// 定值边界：ψ_b = value
#[derive(Debug, Clone)]
pub struct FixedValuePatchField<T> {
    patch_index: usize,
    values: Vec<T>,
}

impl<T: FieldValue> FixedValuePatchField<T> {
    /// 逐面给定边界值
    pub fn new(patch_index: usize, values: Vec<T>) -> Self {
        Self { patch_index, values }
    }

    /// 均匀边界值
    pub fn uniform(patch_index: usize, patch: &Patch, value: T) -> Self {
        Self::new(patch_index, vec![value; patch.size()])
    }

    /// 注册表构造函数
    pub fn from_spec(patch_index: usize, patch: &Patch, spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>> {
        let value = PatchFieldSpec::require(&patch.name, "value", &spec.value)?;
        Ok(Box::new(Self::uniform(patch_index, patch, value)))
    }

    /// 修改边界值
    pub fn set_values(&mut self, values: Vec<T>) {
        self.values = values;
    }
}

impl<T: FieldValue> PatchField<T> for FixedValuePatchField<T> {
    fn type_name(&self) -> &'static str {
        "fixedValue"
    }

    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn fixes_value(&self) -> bool {
        true
    }

    fn evaluate(&mut self, _patch: &Patch, _internal: &[T], _neighbour: Option<&[T]>) -> MatrixResult<()> {
        Ok(())
    }

    fn sn_grad(&self, patch: &Patch, internal: &[T]) -> Vec<T> {
        patch_internal_field(patch, internal)
            .into_iter()
            .zip(&self.values)
            .zip(&patch.delta_coeffs)
            .map(|((pi, &vb), &d)| (vb - pi) * d)
            .collect()
    }

    fn value_internal_coeffs(&self, patch: &Patch, _weights: &[f64]) -> Vec<T> {
        uniform_coeffs(patch, 0.0)
    }

    fn value_boundary_coeffs(&self, _patch: &Patch, _weights: &[f64]) -> Vec<T> {
        self.values.clone()
    }

    fn gradient_internal_coeffs(&self, patch: &Patch) -> Vec<T> {
        patch.delta_coeffs.iter().map(|&d| T::uniform(-d)).collect()
    }

    fn gradient_boundary_coeffs(&self, patch: &Patch) -> Vec<T> {
        self.values
            .iter()
            .zip(&patch.delta_coeffs)
            .map(|(&v, &d)| v * d)
            .collect()
    }

    fn clone_box(&self) -> Box<dyn PatchField<T>> {
        Box::new(self.clone())
    }
}
