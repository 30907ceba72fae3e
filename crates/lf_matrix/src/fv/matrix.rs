// crates/lf_matrix/src/fv/matrix.rs

//! 方程矩阵的存储、组合与边界折叠

use std::sync::Arc;

use lf_foundation::{DimensionSet, FieldValue};
use lf_mesh::GeoMesh;

use super::MatrixState;
use crate::boundary::BoundaryCoeffs;
use crate::error::{MatrixError, MatrixResult};
use crate::field::{GeometricField, SurfaceField};
use crate::ldu::LduMatrix;

/// 方程矩阵
///
/// `dimensions` 为项的量纲乘以单元度量的量纲，例如体网格上
/// `∂T/∂t` 项的矩阵量纲为 `[T]/[s]·[m³]`。
#[derive(Debug, Clone)]
pub struct EquationMatrix<T: FieldValue> {
    pub(crate) psi_name: String,
    pub(crate) mesh: Arc<GeoMesh>,
    pub(crate) dimensions: DimensionSet,
    pub(crate) ldu: LduMatrix,
    pub(crate) source: Vec<T>,
    pub(crate) coeffs: BoundaryCoeffs<T>,
    pub(crate) face_flux_correction: Option<SurfaceField<T>>,
    pub(crate) state: MatrixState,
}

/// 有限体积方程矩阵
pub type FvMatrix<T> = EquationMatrix<T>;

/// 有限面积方程矩阵
pub type FaMatrix<T> = EquationMatrix<T>;

impl<T: FieldValue> EquationMatrix<T> {
    /// 为场创建空矩阵
    pub fn new(psi: &GeometricField<T>, dimensions: DimensionSet) -> Self {
        let mesh = Arc::clone(psi.mesh());
        let ldu = LduMatrix::new(Arc::clone(mesh.addressing_arc()));
        let coeffs = BoundaryCoeffs::new(mesh.boundary());
        Self {
            psi_name: psi.name().to_string(),
            source: vec![T::zero(); mesh.n_cells()],
            mesh,
            dimensions,
            ldu,
            coeffs,
            face_flux_correction: None,
            state: MatrixState::Assembling,
        }
    }

    /// 所属场名
    #[inline]
    pub fn psi_name(&self) -> &str {
        &self.psi_name
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &Arc<GeoMesh> {
        &self.mesh
    }

    /// 量纲
    #[inline]
    pub fn dimensions(&self) -> DimensionSet {
        self.dimensions
    }

    /// 当前状态
    #[inline]
    pub fn state(&self) -> MatrixState {
        self.state
    }

    /// LDU 矩阵
    #[inline]
    pub fn ldu(&self) -> &LduMatrix {
        &self.ldu
    }

    /// 可写 LDU 矩阵（仅组装中）
    pub fn ldu_mut(&mut self) -> MatrixResult<&mut LduMatrix> {
        self.require_assembling("ldu_mut")?;
        Ok(&mut self.ldu)
    }

    /// 右端项
    #[inline]
    pub fn source(&self) -> &[T] {
        &self.source
    }

    /// 可写右端项（仅组装中）
    pub fn source_mut(&mut self) -> MatrixResult<&mut [T]> {
        self.require_assembling("source_mut")?;
        Ok(&mut self.source)
    }

    /// 边界系数
    #[inline]
    pub fn coeffs(&self) -> &BoundaryCoeffs<T> {
        &self.coeffs
    }

    /// 可写边界系数（仅组装中）
    pub fn coeffs_mut(&mut self) -> MatrixResult<&mut BoundaryCoeffs<T>> {
        self.require_assembling("coeffs_mut")?;
        Ok(&mut self.coeffs)
    }

    /// 面通量修正
    #[inline]
    pub fn face_flux_correction(&self) -> Option<&SurfaceField<T>> {
        self.face_flux_correction.as_ref()
    }

    /// 设置面通量修正（仅组装中）
    pub fn set_face_flux_correction(&mut self, correction: SurfaceField<T>) -> MatrixResult<()> {
        self.require_assembling("set_face_flux_correction")?;
        if !Arc::ptr_eq(correction.mesh(), &self.mesh) {
            return Err(MatrixError::FieldMismatch {
                expected: self.psi_name.clone(),
                actual: correction.name().to_string(),
            });
        }
        self.face_flux_correction = Some(correction);
        Ok(())
    }

    pub(crate) fn require_state(&self, operation: &'static str, allowed: &[MatrixState]) -> MatrixResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(MatrixError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    pub(crate) fn require_assembling(&self, operation: &'static str) -> MatrixResult<()> {
        self.require_state(operation, &[MatrixState::Assembling])
    }

    pub(crate) fn require_unsolved(&self, operation: &'static str) -> MatrixResult<()> {
        self.require_state(operation, &[MatrixState::Assembling, MatrixState::BoundaryFolded])
    }

    /// 检查场与矩阵是否对应
    pub(crate) fn check_psi(&self, psi: &GeometricField<T>) -> MatrixResult<()> {
        if psi.name() != self.psi_name || !Arc::ptr_eq(psi.mesh(), &self.mesh) {
            return Err(MatrixError::FieldMismatch {
                expected: self.psi_name.clone(),
                actual: psi.name().to_string(),
            });
        }
        Ok(())
    }

    fn check_compatible(&self, other: &Self, operation: &str) -> MatrixResult<()> {
        if other.psi_name != self.psi_name || !Arc::ptr_eq(&other.mesh, &self.mesh) {
            return Err(MatrixError::FieldMismatch {
                expected: self.psi_name.clone(),
                actual: other.psi_name.clone(),
            });
        }
        self.dimensions.check_same(operation, &other.dimensions)?;
        other.require_assembling("组合运算的右操作数")
    }

    fn combine(&mut self, other: &Self, sign: f64, operation: &'static str) -> MatrixResult<()> {
        self.require_assembling(operation)?;
        self.check_compatible(other, operation)?;
        let mut rhs = other.clone();
        if sign < 0.0 {
            rhs.negate_parts();
        }
        self.ldu.add_assign(&rhs.ldu)?;
        for (a, &b) in self.source.iter_mut().zip(&rhs.source) {
            *a += b;
        }
        self.coeffs.add_assign(&rhs.coeffs)?;
        if let Some(b) = rhs.face_flux_correction {
            match &mut self.face_flux_correction {
                Some(a) => a.add_assign(&b)?,
                slot => *slot = Some(b),
            }
        }
        Ok(())
    }

    fn negate_parts(&mut self) {
        self.ldu.negate();
        self.source.iter_mut().for_each(|v| *v = -*v);
        self.coeffs.negate();
        if let Some(ffc) = self.face_flux_correction.as_mut() {
            ffc.scale(-1.0);
        }
    }

    /// `self += other`
    pub fn try_add(&mut self, other: &Self) -> MatrixResult<()> {
        self.combine(other, 1.0, "+=")
    }

    /// `self -= other`
    pub fn try_sub(&mut self, other: &Self) -> MatrixResult<()> {
        self.combine(other, -1.0, "-=")
    }

    /// `self == other`：把右侧各项移到左侧，等价于 `self -= other`
    pub fn try_equate(&mut self, other: &Self) -> MatrixResult<()> {
        self.combine(other, -1.0, "==")
    }

    /// 取负
    pub fn try_negate(&mut self) -> MatrixResult<()> {
        self.require_assembling("negate")?;
        self.negate_parts();
        Ok(())
    }

    /// 所有系数与右端项乘以无量纲常数
    pub fn try_scale(&mut self, s: f64) -> MatrixResult<()> {
        self.require_assembling("scale")?;
        self.ldu.scale(s);
        self.source.iter_mut().for_each(|v| *v = *v * s);
        self.coeffs.scale(s);
        if let Some(ffc) = self.face_flux_correction.as_mut() {
            ffc.scale(s);
        }
        Ok(())
    }

    fn check_source(&self, su: &[T], su_dims: DimensionSet, operation: &str) -> MatrixResult<()> {
        MatrixError::check_len("显式源项", self.mesh.n_cells(), su.len())?;
        let dims = su_dims * self.mesh.measure_dims();
        self.dimensions.check_same(operation, &dims)?;
        Ok(())
    }

    /// 左侧加显式源项 `su`：`source -= V·su`
    pub fn add_source(&mut self, su: &[T], su_dims: DimensionSet) -> MatrixResult<()> {
        self.require_assembling("add_source")?;
        self.check_source(su, su_dims, "+")?;
        for ((s, &v), &m) in self.source.iter_mut().zip(su).zip(self.mesh.measures()) {
            *s -= v * m;
        }
        Ok(())
    }

    /// 左侧减显式源项 `su`：`source += V·su`
    pub fn sub_source(&mut self, su: &[T], su_dims: DimensionSet) -> MatrixResult<()> {
        self.require_assembling("sub_source")?;
        self.check_source(su, su_dims, "-")?;
        self.add_measured_source(su);
        Ok(())
    }

    /// `self == su`：`source += V·su`
    pub fn equate_source(&mut self, su: &[T], su_dims: DimensionSet) -> MatrixResult<()> {
        self.require_assembling("equate_source")?;
        self.check_source(su, su_dims, "==")?;
        self.add_measured_source(su);
        Ok(())
    }

    fn add_measured_source(&mut self, su: &[T]) {
        for ((s, &v), &m) in self.source.iter_mut().zip(su).zip(self.mesh.measures()) {
            *s += v * m;
        }
    }

    /// 把边界系数折叠进对角元与右端项
    ///
    /// `diag += cmptAv(internalCoeffs)`（全部边界片），
    /// `source += boundaryCoeffs`（非耦合边界片）。已折叠时不做任何事。
    pub fn fold_boundary(&mut self) -> MatrixResult<()> {
        if self.state.folded() {
            return Ok(());
        }
        let boundary = self.mesh.boundary();
        self.coeffs.add_cmpt_av_boundary_diag(self.ldu.diag_mut(), boundary);
        self.coeffs.add_boundary_source(&mut self.source, boundary, &[], false)?;
        self.state = MatrixState::BoundaryFolded;
        log::debug!("{}: 边界系数已折叠", self.psi_name);
        Ok(())
    }

    /// 含边界 `cmptAv(internalCoeffs)` 的对角元
    pub(crate) fn folded_diag(&self) -> Vec<f64> {
        let mut diag = self.ldu.diag().to_vec();
        if !self.state.folded() {
            self.coeffs.add_cmpt_av_boundary_diag(&mut diag, self.mesh.boundary());
        }
        diag
    }

    /// 含非耦合边界 `boundaryCoeffs` 的右端项
    pub(crate) fn folded_source(&self) -> MatrixResult<Vec<T>> {
        let mut source = self.source.clone();
        if !self.state.folded() {
            self.coeffs.add_boundary_source(&mut source, self.mesh.boundary(), &[], false)?;
        }
        Ok(source)
    }

    /// 分量 `cmpt` 的对角元：`folded diag + internalCoeffs[cmpt] − cmptAv(internalCoeffs)`
    pub(crate) fn component_diag(&self, folded_diag: &[f64], cmpt: usize) -> Vec<f64> {
        let mut diag = folded_diag.to_vec();
        if T::N_COMPONENTS > 1 {
            let boundary = self.mesh.boundary();
            let mut av = vec![0.0; diag.len()];
            self.coeffs.add_boundary_diag(&mut diag, cmpt, boundary);
            self.coeffs.add_cmpt_av_boundary_diag(&mut av, boundary);
            for (d, a) in diag.iter_mut().zip(av) {
                *d -= a;
            }
        }
        diag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::PatchFieldSpec;
    use lf_mesh::generation::LineMeshGenerator;
    use std::collections::BTreeMap;

    fn field() -> GeometricField<f64> {
        let mesh = Arc::new(LineMeshGenerator::new(3, 3.0).build().unwrap());
        let mut specs = BTreeMap::new();
        specs.insert("left".to_string(), PatchFieldSpec::fixed_value(1.0));
        specs.insert("right".to_string(), PatchFieldSpec::zero_gradient());
        GeometricField::from_specs("T", DimensionSet::TEMPERATURE, mesh, vec![0.0; 3], &specs).unwrap()
    }

    fn matrix(psi: &GeometricField<f64>, d: f64) -> EquationMatrix<f64> {
        let mut m = EquationMatrix::new(psi, DimensionSet::TEMPERATURE * DimensionSet::VOLUME);
        m.ldu.diag_mut().fill(d);
        m.ldu.upper_mut().fill(-1.0);
        m.coeffs.set_patch(0, vec![2.0], vec![2.0]).unwrap();
        m
    }

    #[test]
    fn test_fold_once() {
        let psi = field();
        let mut m = matrix(&psi, 2.0);
        m.fold_boundary().unwrap();
        assert_eq!(m.ldu.diag(), &[4.0, 2.0, 2.0]);
        assert_eq!(m.source(), &[2.0, 0.0, 0.0]);
        m.fold_boundary().unwrap();
        assert_eq!(m.ldu.diag(), &[4.0, 2.0, 2.0]);
        assert_eq!(m.state(), MatrixState::BoundaryFolded);
        assert!(m.try_scale(2.0).is_err());
    }

    #[test]
    fn test_composition_dimension_check() {
        let psi = field();
        let mut a = matrix(&psi, 2.0);
        let b = matrix(&psi, 3.0);
        a.try_add(&b).unwrap();
        assert_eq!(a.ldu.diag(), &[5.0, 5.0, 5.0]);
        assert_eq!(a.coeffs.internal(0), &[4.0]);
        a.try_equate(&b).unwrap();
        assert_eq!(a.ldu.diag(), &[2.0, 2.0, 2.0]);
        let mut c = EquationMatrix::new(&psi, DimensionSet::VOLUME);
        let err = c.try_add(&b).unwrap_err();
        assert!(matches!(err, MatrixError::Foundation(_)));
    }

    #[test]
    fn test_sources() {
        let psi = field();
        let mut m = matrix(&psi, 2.0);
        m.equate_source(&[1.0, 2.0, 3.0], DimensionSet::TEMPERATURE).unwrap();
        assert_eq!(m.source(), &[1.0, 2.0, 3.0]);
        m.add_source(&[1.0, 1.0, 1.0], DimensionSet::TEMPERATURE).unwrap();
        assert_eq!(m.source(), &[0.0, 1.0, 2.0]);
        assert!(m.add_source(&[1.0; 3], DimensionSet::DIMLESS).is_err());
        assert!(m.add_source(&[1.0; 2], DimensionSet::TEMPERATURE).is_err());
    }

    #[test]
    fn test_field_mismatch() {
        let psi = field();
        let other = GeometricField::from_specs(
            "T",
            DimensionSet::TEMPERATURE,
            Arc::new(LineMeshGenerator::new(3, 3.0).build().unwrap()),
            vec![0.0; 3],
            &BTreeMap::from([
                ("left".to_string(), PatchFieldSpec::zero_gradient()),
                ("right".to_string(), PatchFieldSpec::zero_gradient()),
            ]),
        )
        .unwrap();
        let mut a = matrix(&psi, 1.0);
        let b = matrix(&other, 1.0);
        assert!(matches!(a.try_add(&b), Err(MatrixError::FieldMismatch { .. })));
    }
}
