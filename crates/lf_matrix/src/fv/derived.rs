// crates/lf_matrix/src/fv/derived.rs

//! 导出量：`A`、`D`、`H`、`H1`、通量与残差
//!
//! 压力-速度耦合算法用这些量重构方程。对任意 ψ 有
//!
//! ```text
//! (A ⊙ ψ − H) ⊙ V = −residual(ψ)
//! ```
//!
//! 这里的 `H` 含右端项，即 `H ⊙ V = source − offdiag·ψ`。若把非对角部分
//! 记为 `H_off = offdiag·ψ`，收敛时即为 `A ⊙ ψ ⊙ V + H_off = source`。

use lf_foundation::FieldValue;

use super::matrix::EquationMatrix;
use crate::error::MatrixResult;
use crate::field::{GeometricField, SurfaceField};
use crate::ldu::LduSystem;

impl<T: FieldValue> EquationMatrix<T> {
    /// 单位度量的对角系数 `(diag + cmptAv(internalCoeffs))/V`
    pub fn a(&self) -> Vec<f64> {
        self.folded_diag()
            .into_iter()
            .zip(self.mesh.measures())
            .map(|(d, &v)| d / v)
            .collect()
    }

    /// 对角系数的倒数 `1/(diag + cmptAv(internalCoeffs))`
    pub fn d(&self) -> Vec<f64> {
        self.folded_diag().into_iter().map(|d| 1.0 / d).collect()
    }

    /// 非对角部分与全部显式项作用于 ψ 的结果（单位度量）
    ///
    /// `H = (source − offdiag·ψ + boundaryCoeffs·ψ_nbr + (cmptAv(ic) − ic)·ψ)/V`
    pub fn h(&self, psi: &GeometricField<T>) -> MatrixResult<Vec<T>> {
        self.check_psi(psi)?;
        let boundary = self.mesh.boundary();
        let values = psi.internal();
        let mut h = vec![T::zero(); values.len()];

        let mut av = vec![0.0; values.len()];
        self.coeffs.add_cmpt_av_boundary_diag(&mut av, boundary);
        for cmpt in 0..T::N_COMPONENTS {
            let mut bd = vec![0.0; values.len()];
            self.coeffs.add_boundary_diag(&mut bd, cmpt, boundary);
            for ((hc, &p), (&a, &b)) in h.iter_mut().zip(values).zip(av.iter().zip(&bd)) {
                hc.set_component(cmpt, (a - b) * p.component(cmpt));
            }
        }

        let off = self.ldu.h_operation(values)?;
        let mut source = self.folded_source()?;
        self.coeffs
            .add_coupled_source(&mut source, boundary, &psi.patch_neighbour_fields())?;
        for ((hc, o), s) in h.iter_mut().zip(off).zip(source) {
            *hc += o + s;
        }
        for (hc, &v) in h.iter_mut().zip(self.mesh.measures()) {
            *hc = *hc * (1.0 / v);
        }
        Ok(h)
    }

    /// 非对角系数的负行和（单位度量），耦合边界计入
    pub fn h1(&self) -> Vec<f64> {
        let mut h1 = self.ldu.h1();
        for (patch, bc) in self.mesh.boundary().iter().zip(self.coeffs.boundary_coeffs()) {
            if patch.coupled() {
                for (&c, v) in patch.face_cells.iter().zip(bc) {
                    h1[c] += v.cmpt_av();
                }
            }
        }
        h1.iter_mut()
            .zip(self.mesh.measures())
            .for_each(|(h, &v)| *h /= v);
        h1
    }

    /// 与矩阵离散一致的面通量
    ///
    /// 内部面 `upper·ψ_N − lower·ψ_O`；边界面
    /// `internalCoeffs ⊙ ψ_P − boundaryCoeffs`（耦合边界片上后者乘以另一侧的值）；
    /// 最后加上面通量修正。
    pub fn flux(&self, psi: &GeometricField<T>) -> MatrixResult<SurfaceField<T>> {
        self.check_psi(psi)?;
        let values = psi.internal();
        let internal = self.ldu.face_h(values)?;
        let neighbours = psi.patch_neighbour_fields();
        let mut patches = Vec::with_capacity(self.coeffs.n_patches());
        for (i, patch) in self.mesh.boundary().iter().enumerate() {
            let ic = self.coeffs.internal(i);
            let bc = self.coeffs.boundary(i);
            let nbr = neighbours.get(i).and_then(Option::as_ref).filter(|_| patch.coupled());
            let flux: Vec<T> = patch
                .face_cells
                .iter()
                .enumerate()
                .map(|(j, &c)| {
                    let external = match nbr {
                        Some(nbr) => bc[j].cmpt_multiply(nbr[j]),
                        None => bc[j],
                    };
                    ic[j].cmpt_multiply(values[c]) - external
                })
                .collect();
            patches.push(flux);
        }
        let mut flux = SurfaceField::new(
            format!("flux({})", self.psi_name),
            self.dimensions,
            std::sync::Arc::clone(&self.mesh),
            internal,
            patches,
        )?;
        if let Some(ffc) = &self.face_flux_correction {
            flux.add_assign(ffc)?;
        }
        Ok(flux)
    }

    /// 残差 `b − A·ψ`，含边界与耦合界面贡献
    ///
    /// 所有 rank 必须同时调用。
    pub fn residual(&self, psi: &GeometricField<T>) -> MatrixResult<Vec<T>> {
        self.check_psi(psi)?;
        let boundary = self.mesh.boundary();
        let folded_diag = self.folded_diag();
        let source = self.folded_source()?;
        let mut residual = vec![T::zero(); source.len()];
        let mut ldu = self.ldu.clone();
        for cmpt in 0..T::N_COMPONENTS {
            let diag = self.component_diag(&folded_diag, cmpt);
            ldu.diag_mut().copy_from_slice(&diag);
            let bou = self.coeffs.interface_bou_coeffs(cmpt, boundary);
            let int = self.coeffs.interface_int_coeffs(cmpt, boundary);
            let system = LduSystem::new(&ldu, &bou, &int, self.mesh.interfaces(), self.mesh.comm().as_ref());
            let b: Vec<f64> = source.iter().map(|v| v.component(cmpt)).collect();
            let mut r = vec![0.0; b.len()];
            system.residual(&psi.component(cmpt), &b, &mut r)?;
            for (rv, x) in residual.iter_mut().zip(r) {
                rv.set_component(cmpt, x);
            }
        }
        Ok(residual)
    }
}
