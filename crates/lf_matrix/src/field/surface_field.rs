// crates/lf_matrix/src/field/surface_field.rs

//! 面心场
//!
//! 内部面一个值，边界面按边界片各一组值。用于面通量、面扩散系数以及
//! 方程矩阵导出的通量。

use std::sync::Arc;

use lf_foundation::{DimensionSet, FieldValue, Scalar};
use lf_mesh::GeoMesh;

use super::geometric_field::GeometricField;
use crate::error::{MatrixError, MatrixResult};

/// 面心场
#[derive(Debug, Clone)]
pub struct SurfaceField<T> {
    name: String,
    dimensions: DimensionSet,
    mesh: Arc<GeoMesh>,
    internal: Vec<T>,
    boundary: Vec<Vec<T>>,
}

/// 面心标量场（通量、面扩散系数）
pub type SurfaceScalarField = SurfaceField<Scalar>;

impl<T: FieldValue> SurfaceField<T> {
    /// 创建面心场
    pub fn new(
        name: impl Into<String>,
        dimensions: DimensionSet,
        mesh: Arc<GeoMesh>,
        internal: Vec<T>,
        boundary: Vec<Vec<T>>,
    ) -> MatrixResult<Self> {
        MatrixError::check_len("面场内部值", mesh.n_internal_faces(), internal.len())?;
        MatrixError::check_len("面场边界片数", mesh.boundary().len(), boundary.len())?;
        for (patch, values) in mesh.boundary().iter().zip(&boundary) {
            MatrixError::check_len(&format!("面场边界片 '{}'", patch.name), patch.size(), values.len())?;
        }
        Ok(Self {
            name: name.into(),
            dimensions,
            mesh,
            internal,
            boundary,
        })
    }

    /// 均匀值
    pub fn uniform(name: impl Into<String>, dimensions: DimensionSet, mesh: Arc<GeoMesh>, value: T) -> Self {
        let internal = vec![value; mesh.n_internal_faces()];
        let boundary = mesh.boundary().iter().map(|p| vec![value; p.size()]).collect();
        Self {
            name: name.into(),
            dimensions,
            mesh,
            internal,
            boundary,
        }
    }

    /// 全零
    pub fn zeros(name: impl Into<String>, dimensions: DimensionSet, mesh: Arc<GeoMesh>) -> Self {
        Self::uniform(name, dimensions, mesh, T::zero())
    }

    /// 单元场的线性插值：内部面按权重插值，边界面取边界值
    pub fn interpolate(field: &GeometricField<T>) -> Self {
        let mesh = Arc::clone(field.mesh());
        let addr = mesh.addressing();
        let psi = field.internal();
        let internal = addr
            .lower_addr()
            .iter()
            .zip(addr.upper_addr())
            .zip(mesh.weights())
            .map(|((&o, &n), &w)| psi[o] * w + psi[n] * (1.0 - w))
            .collect();
        let boundary = field.boundary_field().iter().map(|pf| pf.values().to_vec()).collect();
        Self {
            name: format!("interpolate({})", field.name()),
            dimensions: field.dimensions(),
            mesh,
            internal,
            boundary,
        }
    }

    /// 名称
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 量纲
    #[inline]
    pub fn dimensions(&self) -> DimensionSet {
        self.dimensions
    }

    /// 网格
    #[inline]
    pub fn mesh(&self) -> &Arc<GeoMesh> {
        &self.mesh
    }

    /// 内部面值
    #[inline]
    pub fn internal(&self) -> &[T] {
        &self.internal
    }

    /// 可写内部面值
    #[inline]
    pub fn internal_mut(&mut self) -> &mut [T] {
        &mut self.internal
    }

    /// 全部边界片的值
    #[inline]
    pub fn boundary(&self) -> &[Vec<T>] {
        &self.boundary
    }

    /// 边界片的值
    #[inline]
    pub fn patch(&self, patch: usize) -> &[T] {
        &self.boundary[patch]
    }

    /// 可写边界片的值
    #[inline]
    pub fn patch_mut(&mut self, patch: usize) -> &mut [T] {
        &mut self.boundary[patch]
    }

    /// `self += other`
    pub fn add_assign(&mut self, other: &SurfaceField<T>) -> MatrixResult<()> {
        MatrixError::check_len("面场内部值", self.internal.len(), other.internal.len())?;
        MatrixError::check_len("面场边界片数", self.boundary.len(), other.boundary.len())?;
        for (a, &b) in self.internal.iter_mut().zip(&other.internal) {
            *a += b;
        }
        for (pa, pb) in self.boundary.iter_mut().zip(&other.boundary) {
            MatrixError::check_len("面场边界片", pa.len(), pb.len())?;
            for (a, &b) in pa.iter_mut().zip(pb) {
                *a += b;
            }
        }
        Ok(())
    }

    /// 所有值乘以常数
    pub fn scale(&mut self, s: f64) {
        for v in self.internal.iter_mut().chain(self.boundary.iter_mut().flatten()) {
            *v = *v * s;
        }
    }
}
