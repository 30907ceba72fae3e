// crates/lf_matrix/src/boundary/patch_field.rs

//! 边界场 trait
//!
//! 离散算子通过四组系数把边界值表示为面相邻单元值的线性函数：
//!
//! ```text
//! ψ_b     = valueInternalCoeffs    ⊙ ψ_P + valueBoundaryCoeffs
//! ∇ψ_b·n  = gradientInternalCoeffs ⊙ ψ_P + gradientBoundaryCoeffs
//! ```
//!
//! 耦合边界片上 `valueBoundaryCoeffs` 与 `gradientBoundaryCoeffs` 乘以
//! 另一侧单元值而不是常数 1。

use std::fmt::Debug;

use lf_foundation::FieldValue;
use lf_mesh::Patch;

use crate::error::MatrixResult;

/// 边界场 trait
pub trait PatchField<T: FieldValue>: Debug + Send + Sync {
    /// 类型名，如 `fixedValue`
    fn type_name(&self) -> &'static str;

    /// 边界片索引
    fn patch_index(&self) -> usize;

    /// 边界面上的值
    fn values(&self) -> &[T];

    /// 是否固定了场的水平（决定是否需要参考值）
    fn fixes_value(&self) -> bool {
        false
    }

    /// 是否为耦合边界
    fn coupled(&self) -> bool {
        false
    }

    /// 组装矩阵前更新系数，默认无操作
    fn update_coeffs(&mut self, _patch: &Patch) {}

    /// 由内部场（及耦合边界另一侧的值）更新边界值
    fn evaluate(&mut self, patch: &Patch, internal: &[T], neighbour: Option<&[T]>) -> MatrixResult<()>;

    /// 面法向梯度
    fn sn_grad(&self, patch: &Patch, internal: &[T]) -> Vec<T>;

    /// 值的内部系数，`weights` 为插值权重
    fn value_internal_coeffs(&self, patch: &Patch, weights: &[f64]) -> Vec<T>;

    /// 值的边界系数
    fn value_boundary_coeffs(&self, patch: &Patch, weights: &[f64]) -> Vec<T>;

    /// 梯度的内部系数
    fn gradient_internal_coeffs(&self, patch: &Patch) -> Vec<T>;

    /// 梯度的边界系数
    fn gradient_boundary_coeffs(&self, patch: &Patch) -> Vec<T>;

    /// 最近一次求值时另一侧的值（仅耦合边界）
    fn patch_neighbour_field(&self) -> Option<&[T]> {
        None
    }

    /// 复制到堆上
    fn clone_box(&self) -> Box<dyn PatchField<T>>;
}

impl<T: FieldValue> Clone for Box<dyn PatchField<T>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// 面相邻单元的值
pub fn patch_internal_field<T: FieldValue>(patch: &Patch, internal: &[T]) -> Vec<T> {
    patch.face_cells.iter().map(|&c| internal[c]).collect()
}

/// 每个面相同的值
#[inline]
pub(crate) fn uniform_coeffs<T: FieldValue>(patch: &Patch, v: f64) -> Vec<T> {
    vec![T::uniform(v); patch.size()]
}
