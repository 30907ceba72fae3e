// crates/lf_matrix/src/boundary/mixed.rs

//! 混合边界
//!
//! 按值分数 f 在定值与定梯度之间线性组合：
//!
//! ```text
//! ψ_b = f·refValue + (1 − f)·(ψ_P + refGradient/δ)
//! ```

use lf_foundation::FieldValue;
use lf_mesh::Patch;

use super::patch_field::{patch_internal_field, PatchField};
use super::spec::PatchFieldSpec;
use crate::error::{MatrixError, MatrixResult};

/// 混合边界
#[derive(Debug, Clone)]
pub struct MixedPatchField<T> {
    patch_index: usize,
    ref_value: Vec<T>,
    ref_gradient: Vec<T>,
    value_fraction: Vec<f64>,
    values: Vec<T>,
}

impl<T: FieldValue> MixedPatchField<T> {
    /// 逐面给定参考值、参考梯度与值分数
    pub fn new(patch_index: usize, ref_value: Vec<T>, ref_gradient: Vec<T>, value_fraction: Vec<f64>) -> Self {
        let values = ref_value.clone();
        Self {
            patch_index,
            ref_value,
            ref_gradient,
            value_fraction,
            values,
        }
    }

    /// 注册表构造函数
    pub fn from_spec(patch_index: usize, patch: &Patch, spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>> {
        let ref_value: T = PatchFieldSpec::require(&patch.name, "refValue", &spec.ref_value)?;
        let ref_gradient: T = PatchFieldSpec::require(&patch.name, "refGradient", &spec.ref_gradient)?;
        let f = spec
            .value_fraction
            .ok_or_else(|| MatrixError::patch_field(&patch.name, "缺少条目 'valueFraction'"))?;
        if !(0.0..=1.0).contains(&f) {
            return Err(MatrixError::patch_field(
                &patch.name,
                format!("valueFraction {} 不在 [0, 1] 范围内", f),
            ));
        }
        let n = patch.size();
        Ok(Box::new(Self::new(
            patch_index,
            vec![ref_value; n],
            vec![ref_gradient; n],
            vec![f; n],
        )))
    }

    /// 值分数
    pub fn value_fraction(&self) -> &[f64] {
        &self.value_fraction
    }
}

impl<T: FieldValue> PatchField<T> for MixedPatchField<T> {
    fn type_name(&self) -> &'static str {
        "mixed"
    }

    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn fixes_value(&self) -> bool {
        self.value_fraction.iter().any(|&f| f > 0.0)
    }

    fn evaluate(&mut self, patch: &Patch, internal: &[T], _neighbour: Option<&[T]>) -> MatrixResult<()> {
        let pif = patch_internal_field(patch, internal);
        self.values = (0..patch.size())
            .map(|i| {
                let f = self.value_fraction[i];
                let d = patch.delta_coeffs[i];
                self.ref_value[i] * f + (pif[i] + self.ref_gradient[i] * (1.0 / d)) * (1.0 - f)
            })
            .collect();
        Ok(())
    }

    fn sn_grad(&self, patch: &Patch, internal: &[T]) -> Vec<T> {
        let pif = patch_internal_field(patch, internal);
        (0..patch.size())
            .map(|i| {
                let f = self.value_fraction[i];
                let d = patch.delta_coeffs[i];
                (self.ref_value[i] - pif[i]) * (f * d) + self.ref_gradient[i] * (1.0 - f)
            })
            .collect()
    }

    fn value_internal_coeffs(&self, _patch: &Patch, _weights: &[f64]) -> Vec<T> {
        self.value_fraction.iter().map(|&f| T::uniform(1.0 - f)).collect()
    }

    fn value_boundary_coeffs(&self, patch: &Patch, _weights: &[f64]) -> Vec<T> {
        (0..patch.size())
            .map(|i| {
                let f = self.value_fraction[i];
                self.ref_value[i] * f + self.ref_gradient[i] * ((1.0 - f) / patch.delta_coeffs[i])
            })
            .collect()
    }

    fn gradient_internal_coeffs(&self, patch: &Patch) -> Vec<T> {
        self.value_fraction
            .iter()
            .zip(&patch.delta_coeffs)
            .map(|(&f, &d)| T::uniform(-f * d))
            .collect()
    }

    fn gradient_boundary_coeffs(&self, patch: &Patch) -> Vec<T> {
        (0..patch.size())
            .map(|i| {
                let f = self.value_fraction[i];
                self.ref_value[i] * (f * patch.delta_coeffs[i]) + self.ref_gradient[i] * (1.0 - f)
            })
            .collect()
    }

    fn clone_box(&self) -> Box<dyn PatchField<T>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::FixedValuePatchField;
    use lf_mesh::PatchKind;

    fn patch() -> Patch {
        Patch::new("inlet", PatchKind::Patch, vec![0, 1], vec![1.0, 1.0], vec![2.0, 2.0])
    }

    #[test]
    fn test_full_fraction_matches_fixed_value() {
        let p = patch();
        let mixed = MixedPatchField::new(0, vec![3.0; 2], vec![0.0; 2], vec![1.0; 2]);
        let fixed = FixedValuePatchField::uniform(0, &p, 3.0);
        let w = [1.0, 1.0];
        assert_eq!(mixed.value_internal_coeffs(&p, &w), fixed.value_internal_coeffs(&p, &w));
        assert_eq!(mixed.gradient_internal_coeffs(&p), fixed.gradient_internal_coeffs(&p));
        assert_eq!(mixed.gradient_boundary_coeffs(&p), fixed.gradient_boundary_coeffs(&p));
        assert!(mixed.fixes_value());
    }

    #[test]
    fn test_zero_fraction_is_gradient() {
        let p = patch();
        let mut mixed = MixedPatchField::new(0, vec![3.0; 2], vec![4.0; 2], vec![0.0; 2]);
        mixed.evaluate(&p, &[1.0, 2.0], None).unwrap();
        // ψ_P + g/δ
        assert_eq!(mixed.values(), &[3.0, 4.0]);
        assert_eq!(mixed.sn_grad(&p, &[1.0, 2.0]), vec![4.0, 4.0]);
        assert!(!mixed.fixes_value());
    }

    #[test]
    fn test_from_spec_range() {
        let p = patch();
        let spec = PatchFieldSpec::mixed(1.0, 0.0, 1.5);
        assert!(MixedPatchField::<f64>::from_spec(0, &p, &spec).is_err());
        let spec = PatchFieldSpec::mixed(1.0, 0.0, 0.5);
        let pf = MixedPatchField::<f64>::from_spec(0, &p, &spec).unwrap();
        assert_eq!(pf.type_name(), "mixed");
    }
}
