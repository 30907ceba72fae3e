// crates/lf_matrix/src/fvm/ddt.rs

//! 时间导数项（Euler 隐式）
//!
//! `diag = V/Δt`，`source = V/Δt·ψ⁰`，其中 `ψ⁰` 为旧时间层的值。

use lf_foundation::{DimensionSet, FieldValue, LfError};

use crate::error::MatrixResult;
use crate::field::GeometricField;
use crate::fv::EquationMatrix;

/// Euler 隐式时间导数
///
/// 场没有保存旧时间层时以当前值代替（相当于首个时间步）。
pub fn ddt<T: FieldValue>(psi: &GeometricField<T>, delta_t: f64) -> MatrixResult<EquationMatrix<T>> {
    if !(delta_t > 0.0 && delta_t.is_finite()) {
        return Err(LfError::invalid_input(format!("时间步长必须为正，实际 {}", delta_t)).into());
    }
    let mesh = psi.mesh();
    let dims = psi.dimensions() / DimensionSet::TIME * mesh.measure_dims();
    let old = match psi.old_time() {
        Some(old) => old,
        None => {
            log::debug!("{}: 未保存旧时间层，使用当前值", psi.name());
            psi.internal()
        }
    };
    let r_delta_t = 1.0 / delta_t;

    let mut m = EquationMatrix::new(psi, dims);
    for (d, &v) in m.ldu_mut()?.diag_mut().iter_mut().zip(mesh.measures()) {
        *d = r_delta_t * v;
    }
    for ((s, &o), &v) in m.source_mut()?.iter_mut().zip(old).zip(mesh.measures()) {
        *s = o * (r_delta_t * v);
    }
    Ok(m)
}
