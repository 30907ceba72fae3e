// crates/lf_matrix/src/boundary/coupled.rs

//! 耦合边界（周期、处理器）
//!
//! 边界值由两侧单元值按插值权重给出，另一侧的值在求值时通过界面交换
//! 得到并缓存，供组装右端项与 `H` 使用。

use lf_foundation::FieldValue;
use lf_mesh::Patch;

use super::patch_field::{patch_internal_field, uniform_coeffs, PatchField};
use super::spec::PatchFieldSpec;
use crate::error::{MatrixError, MatrixResult};

/// 耦合边界
#[derive(Debug, Clone)]
pub struct CoupledPatchField<T> {
    patch_index: usize,
    values: Vec<T>,
    neighbour: Option<Vec<T>>,
}

impl<T: FieldValue> CoupledPatchField<T> {
    /// 创建，边界值在首次求值前为零
    pub fn new(patch_index: usize, patch: &Patch) -> Self {
        Self {
            patch_index,
            values: vec![T::zero(); patch.size()],
            neighbour: None,
        }
    }

    /// 注册表构造函数
    pub fn from_spec(patch_index: usize, patch: &Patch, _spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>> {
        if !patch.coupled() {
            return Err(MatrixError::patch_field(
                &patch.name,
                format!("{} 边界片不能使用耦合边界条件", patch.kind.type_name()),
            ));
        }
        Ok(Box::new(Self::new(patch_index, patch)))
    }
}

impl<T: FieldValue> PatchField<T> for CoupledPatchField<T> {
    fn type_name(&self) -> &'static str {
        "coupled"
    }

    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn coupled(&self) -> bool {
        true
    }

    fn evaluate(&mut self, patch: &Patch, internal: &[T], neighbour: Option<&[T]>) -> MatrixResult<()> {
        let nbr = neighbour.ok_or_else(|| MatrixError::patch_field(&patch.name, "耦合边界求值缺少另一侧的值"))?;
        MatrixError::check_len("耦合边界另一侧的值", patch.size(), nbr.len())?;
        self.values = patch_internal_field(patch, internal)
            .into_iter()
            .zip(nbr)
            .zip(&patch.weights)
            .map(|((pi, &pn), &w)| pi * w + pn * (1.0 - w))
            .collect();
        self.neighbour = Some(nbr.to_vec());
        Ok(())
    }

    fn sn_grad(&self, patch: &Patch, internal: &[T]) -> Vec<T> {
        let Some(nbr) = self.neighbour.as_deref() else {
            return uniform_coeffs(patch, 0.0);
        };
        patch_internal_field(patch, internal)
            .into_iter()
            .zip(nbr)
            .zip(&patch.delta_coeffs)
            .map(|((pi, &pn), &d)| (pn - pi) * d)
            .collect()
    }

    fn value_internal_coeffs(&self, _patch: &Patch, weights: &[f64]) -> Vec<T> {
        weights.iter().map(|&w| T::uniform(w)).collect()
    }

    fn value_boundary_coeffs(&self, _patch: &Patch, weights: &[f64]) -> Vec<T> {
        weights.iter().map(|&w| T::uniform(1.0 - w)).collect()
    }

    fn gradient_internal_coeffs(&self, patch: &Patch) -> Vec<T> {
        patch.delta_coeffs.iter().map(|&d| T::uniform(-d)).collect()
    }

    fn gradient_boundary_coeffs(&self, patch: &Patch) -> Vec<T> {
        patch.delta_coeffs.iter().map(|&d| T::uniform(d)).collect()
    }

    fn patch_neighbour_field(&self) -> Option<&[T]> {
        self.neighbour.as_deref()
    }

    fn clone_box(&self) -> Box<dyn PatchField<T>> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_mesh::PatchKind;

    fn patch() -> Patch {
        Patch::new("left", PatchKind::Cyclic { neighbour_patch: 1 }, vec![0], vec![1.0], vec![1.0])
            .with_weights(vec![0.5])
    }

    #[test]
    fn test_evaluate_interpolates() {
        let p = patch();
        let mut pf = CoupledPatchField::<f64>::new(0, &p);
        assert!(pf.evaluate(&p, &[2.0, 6.0], None).is_err());
        pf.evaluate(&p, &[2.0, 6.0], Some(&[6.0])).unwrap();
        assert_eq!(pf.values(), &[4.0]);
        assert_eq!(pf.sn_grad(&p, &[2.0, 6.0]), vec![4.0]);
        assert_eq!(pf.patch_neighbour_field(), Some(&[6.0][..]));
    }

    #[test]
    fn test_rejects_plain_patch() {
        let p = Patch::new("wall", PatchKind::Wall, vec![0], vec![1.0], vec![2.0]);
        let spec = PatchFieldSpec::new("coupled");
        assert!(CoupledPatchField::<f64>::from_spec(0, &p, &spec).is_err());
    }
}
