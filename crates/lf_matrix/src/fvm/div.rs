// crates/lf_matrix/src/fvm/div.rs

//! 对流项 `∇·(φψ)`
//!
//! 面值由 owner 侧权重 `w` 插值：`ψ_f = w·ψ_O + (1 − w)·ψ_N`。
//! 内部面 `lower = −w·φ`，`upper = lower + φ`，对角元取负行和。
//! 边界面 `internalCoeffs = φ_b·valueInternalCoeffs`，
//! `boundaryCoeffs = −φ_b·valueBoundaryCoeffs`。

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lf_foundation::{FieldValue, LfError};

use super::check_same_mesh;
use crate::error::{MatrixError, MatrixResult};
use crate::field::{GeometricField, SurfaceScalarField};
use crate::fv::EquationMatrix;

/// 对流插值格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvectionScheme {
    /// 一阶迎风
    #[default]
    Upwind,
    /// 线性（中心差分）
    Linear,
}

impl ConvectionScheme {
    /// 全部格式名
    pub const NAMES: [&'static str; 2] = ["upwind", "linear"];

    /// 格式名
    pub fn name(self) -> &'static str {
        match self {
            Self::Upwind => "upwind",
            Self::Linear => "linear",
        }
    }

    fn weight(self, flux: f64, geometric: f64) -> f64 {
        match self {
            Self::Upwind if flux >= 0.0 => 1.0,
            Self::Upwind => 0.0,
            Self::Linear => geometric,
        }
    }
}

impl fmt::Display for ConvectionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConvectionScheme {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upwind" => Ok(Self::Upwind),
            "linear" => Ok(Self::Linear),
            other => Err(LfError::invalid_input(format!(
                "未知的对流格式 '{}'，可用: {}",
                other,
                MatrixError::list(&Self::NAMES)
            ))
            .into()),
        }
    }
}

/// 对流项
///
/// `flux` 为面体积通量（owner → neighbour 为正），矩阵量纲为
/// `[φ]·[ψ]`。
pub fn div<T: FieldValue>(
    flux: &SurfaceScalarField,
    psi: &GeometricField<T>,
    scheme: ConvectionScheme,
) -> MatrixResult<EquationMatrix<T>> {
    check_same_mesh(flux, psi)?;
    let mesh = Arc::clone(psi.mesh());
    let mut m = EquationMatrix::new(psi, flux.dimensions() * psi.dimensions());

    {
        let ldu = m.ldu_mut()?;
        let (upper, lower) = ldu.upper_lower_mut();
        for (((u, l), &phi), &w) in upper
            .iter_mut()
            .zip(lower.iter_mut())
            .zip(flux.internal())
            .zip(mesh.weights())
        {
            *l = -scheme.weight(phi, w) * phi;
            *u = *l + phi;
        }
        ldu.neg_sum_diag();
    }

    let coeffs = m.coeffs_mut()?;
    let patches = mesh.boundary().iter().zip(psi.boundary_field()).zip(flux.boundary());
    for (p, ((patch, pf), phi_b)) in patches.enumerate() {
        let weights: Vec<f64> = phi_b
            .iter()
            .zip(&patch.weights)
            .map(|(&phi, &w)| scheme.weight(phi, w))
            .collect();
        let vic = pf.value_internal_coeffs(patch, &weights);
        let vbc = pf.value_boundary_coeffs(patch, &weights);
        let (ic, bc): (Vec<T>, Vec<T>) = vic
            .iter()
            .zip(&vbc)
            .zip(phi_b)
            .map(|((&i, &b), &phi)| (i * phi, -(b * phi)))
            .unzip();
        coeffs.set_patch(p, ic, bc)?;
    }
    log::trace!("div({}, {}) 使用 {} 格式", flux.name(), psi.name(), scheme);
    Ok(m)
}
