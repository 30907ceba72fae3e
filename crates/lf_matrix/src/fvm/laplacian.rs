// crates/lf_matrix/src/fvm/laplacian.rs

//! 扩散项 `∇·(γ∇ψ)`
//!
//! 内部面 `upper = γ_f·|S_f|·δ_f`（对称），对角元取负行和。边界面
//! `internalCoeffs = γ_b·|S_b|·gradientInternalCoeffs`，
//! `boundaryCoeffs = −γ_b·|S_b|·gradientBoundaryCoeffs`。
//! 所得矩阵对角元为负，与正系数项组合时通常写作 `−laplacian`。

use std::sync::Arc;

use lf_foundation::{DimensionSet, DimensionedScalar, FieldValue};

use super::check_same_mesh;
use crate::error::MatrixResult;
use crate::field::{GeometricField, SurfaceScalarField};
use crate::fv::EquationMatrix;

fn matrix_dims<T: FieldValue>(gamma_dims: DimensionSet, psi: &GeometricField<T>) -> DimensionSet {
    gamma_dims * psi.dimensions() / DimensionSet::AREA * psi.mesh().measure_dims()
}

/// 均匀扩散系数的扩散项
pub fn laplacian<T: FieldValue>(gamma: &DimensionedScalar, psi: &GeometricField<T>) -> MatrixResult<EquationMatrix<T>> {
    let mesh = psi.mesh();
    let internal = vec![gamma.value; mesh.n_internal_faces()];
    let boundary: Vec<Vec<f64>> = mesh.boundary().iter().map(|p| vec![gamma.value; p.size()]).collect();
    assemble(&internal, &boundary, matrix_dims(gamma.dimensions, psi), psi)
}

/// 面扩散系数场的扩散项
pub fn laplacian_field<T: FieldValue>(
    gamma: &SurfaceScalarField,
    psi: &GeometricField<T>,
) -> MatrixResult<EquationMatrix<T>> {
    check_same_mesh(gamma, psi)?;
    assemble(gamma.internal(), gamma.boundary(), matrix_dims(gamma.dimensions(), psi), psi)
}

fn assemble<T: FieldValue>(
    gamma_internal: &[f64],
    gamma_boundary: &[Vec<f64>],
    dims: DimensionSet,
    psi: &GeometricField<T>,
) -> MatrixResult<EquationMatrix<T>> {
    let mesh = Arc::clone(psi.mesh());
    let mut m = EquationMatrix::new(psi, dims);

    {
        let ldu = m.ldu_mut()?;
        for (((u, &g), &s), &d) in ldu
            .upper_mut()
            .iter_mut()
            .zip(gamma_internal)
            .zip(mesh.face_mags())
            .zip(mesh.delta_coeffs())
        {
            *u = g * s * d;
        }
        ldu.neg_sum_diag();
    }

    let coeffs = m.coeffs_mut()?;
    let patches = mesh.boundary().iter().zip(psi.boundary_field()).zip(gamma_boundary);
    for (p, ((patch, pf), gamma_b)) in patches.enumerate() {
        let gic = pf.gradient_internal_coeffs(patch);
        let gbc = pf.gradient_boundary_coeffs(patch);
        let (ic, bc): (Vec<T>, Vec<T>) = gic
            .iter()
            .zip(&gbc)
            .zip(gamma_b.iter().zip(&patch.mag_sf))
            .map(|((&i, &b), (&g, &s))| (i * (g * s), -(b * (g * s))))
            .unzip();
        coeffs.set_patch(p, ic, bc)?;
    }
    Ok(m)
}
