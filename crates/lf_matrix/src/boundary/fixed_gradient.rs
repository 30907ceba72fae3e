// crates/lf_matrix/src/boundary/fixed_gradient.rs

//! 定梯度边界

use lf_foundation::FieldValue;
use lf_mesh::Patch;

use super::patch_field::{patch_internal_field, uniform_coeffs, PatchField};
use super::spec::PatchFieldSpec;
use crate::error::MatrixResult;

/// 定梯度边界：∇ψ_b·n = gradient，ψ_b = ψ_P + gradient/δ
#[derive(Debug, Clone)]
pub struct FixedGradientPatchField<T> {
    patch_index: usize,
    gradient: Vec<T>,
    values: Vec<T>,
}

impl<T: FieldValue> FixedGradientPatchField<T> {
    /// 逐面给定梯度
    pub fn new(patch_index: usize, gradient: Vec<T>) -> Self {
        let values = vec![T::zero(); gradient.len()];
        Self {
            patch_index,
            gradient,
            values,
        }
    }

    /// 注册表构造函数
    pub fn from_spec(patch_index: usize, patch: &Patch, spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>> {
        let gradient = PatchFieldSpec::require(&patch.name, "gradient", &spec.gradient)?;
        Ok(Box::new(Self::new(patch_index, vec![gradient; patch.size()])))
    }

    /// 法向梯度
    pub fn gradient(&self) -> &[T] {
        &self.gradient
    }
}

impl<T: FieldValue> PatchField<T> for FixedGradientPatchField<T> {
    fn type_name(&self) -> &'static str {
        "fixedGradient"
    }

    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn evaluate(&mut self, patch: &Patch, internal: &[T], _neighbour: Option<&[T]>) -> MatrixResult<()> {
        self.values = patch_internal_field(patch, internal)
            .into_iter()
            .zip(&self.gradient)
            .zip(&patch.delta_coeffs)
            .map(|((pi, &g), &d)| pi + g * (1.0 / d))
            .collect();
        Ok(())
    }

    fn sn_grad(&self, _patch: &Patch, _internal: &[T]) -> Vec<T> {
        self.gradient.clone()
    }

    fn value_internal_coeffs(&self, patch: &Patch, _weights: &[f64]) -> Vec<T> {
        uniform_coeffs(patch, 1.0)
    }

    fn value_boundary_coeffs(&self, patch: &Patch, _weights: &[f64]) -> Vec<T> {
        self.gradient
            .iter()
            .zip(&patch.delta_coeffs)
            .map(|(&g, &d)| g * (1.0 / d))
            .collect()
    }

    fn gradient_internal_coeffs(&self, patch: &Patch) -> Vec<T> {
        uniform_coeffs(patch, 0.0)
    }

    fn gradient_boundary_coeffs(&self, _patch: &Patch) -> Vec<T> {
        self.gradient.clone()
    }

    fn clone_box(&self) -> Box<dyn PatchField<T>> {
        Box::new(self.clone())
    }
}
