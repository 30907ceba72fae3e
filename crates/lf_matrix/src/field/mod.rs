// crates/lf_matrix/src/field/mod.rs

//! 场
//!
//! - [`GeometricField`]: 单元中心场，带边界条件与时间/迭代历史
//! - [`SurfaceField`]: 面心场

pub mod geometric_field;
pub mod surface_field;

pub use geometric_field::{
    AreaScalarField, AreaTensorField, AreaVectorField, GeometricField, VolScalarField, VolTensorField,
    VolVectorField,
};
pub use surface_field::{SurfaceField, SurfaceScalarField};
