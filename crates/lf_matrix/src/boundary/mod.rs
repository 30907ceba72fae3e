// crates/lf_matrix/src/boundary/mod.rs

//! 边界条件与边界系数
//!
//! - [`PatchField`]: 边界条件的能力接口，给出值/梯度的线性化系数
//! - 内置边界条件：[`FixedValuePatchField`]、[`FixedGradientPatchField`]、
//!   [`ZeroGradientPatchField`]、[`MixedPatchField`]、[`CoupledPatchField`]
//! - [`PatchFieldRegistry`]: 类型名到构造函数的注册表，可在运行时扩展
//! - [`BoundaryCoeffs`]: 方程矩阵的每边界片 `internalCoeffs`/`boundaryCoeffs`

pub mod coeffs;
pub mod coupled;
pub mod fixed_gradient;
pub mod fixed_value;
pub mod mixed;
pub mod patch_field;
pub mod registry;
pub mod spec;
pub mod zero_gradient;

pub use coeffs::BoundaryCoeffs;
pub use coupled::CoupledPatchField;
pub use fixed_gradient::FixedGradientPatchField;
pub use fixed_value::FixedValuePatchField;
pub use mixed::MixedPatchField;
pub use patch_field::{patch_internal_field, PatchField};
pub use registry::{PatchFieldConstructor, PatchFieldRegistry};
pub use spec::{PatchFieldSpec, SpecValue};
pub use zero_gradient::ZeroGradientPatchField;
