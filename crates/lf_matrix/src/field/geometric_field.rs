// crates/lf_matrix/src/field/geometric_field.rs

//! 单元中心场
//!
//! 内部值 + 每边界片一个边界条件，另保存上一时间步与上一迭代步的
//! 内部值（时间离散与显式松弛需要）。体网格上是体场，面网格上是面积场。

use std::collections::BTreeMap;
use std::sync::Arc;

use lf_config::FvSolution;
use lf_foundation::{DimensionSet, FieldValue, LfError, Scalar, Tensor, Vector};
use lf_mesh::interface::exchange;
use lf_mesh::GeoMesh;

use crate::boundary::{PatchField, PatchFieldRegistry, PatchFieldSpec};
use crate::error::{MatrixError, MatrixResult};

/// 单元中心场
#[derive(Debug, Clone)]
pub struct GeometricField<T: FieldValue> {
    name: String,
    dimensions: DimensionSet,
    mesh: Arc<GeoMesh>,
    internal: Vec<T>,
    boundary: Vec<Box<dyn PatchField<T>>>,
    old_time: Option<Vec<T>>,
    prev_iter: Option<Vec<T>>,
}

/// 标量场
pub type VolScalarField = GeometricField<Scalar>;
/// 向量场
pub type VolVectorField = GeometricField<Vector>;
/// 张量场
pub type VolTensorField = GeometricField<Tensor>;
/// 面网格标量场
pub type AreaScalarField = GeometricField<Scalar>;
/// 面网格向量场
pub type AreaVectorField = GeometricField<Vector>;
/// 面网格张量场
pub type AreaTensorField = GeometricField<Tensor>;

impl<T: FieldValue> GeometricField<T> {
    /// 创建场并更新边界值
    pub fn new(
        name: impl Into<String>,
        dimensions: DimensionSet,
        mesh: Arc<GeoMesh>,
        internal: Vec<T>,
        boundary: Vec<Box<dyn PatchField<T>>>,
    ) -> MatrixResult<Self> {
        MatrixError::check_len("场内部值", mesh.n_cells(), internal.len())?;
        MatrixError::check_len("边界条件数", mesh.boundary().len(), boundary.len())?;
        for (i, (patch, pf)) in mesh.boundary().iter().zip(&boundary).enumerate() {
            if pf.patch_index() != i {
                return Err(MatrixError::patch_field(
                    &patch.name,
                    format!("边界条件属于边界片 {}", pf.patch_index()),
                ));
            }
            if pf.coupled() != patch.coupled() {
                return Err(MatrixError::patch_field(
                    &patch.name,
                    format!("{} 边界片不能使用 {} 边界条件", patch.kind.type_name(), pf.type_name()),
                ));
            }
        }
        let mut field = Self {
            name: name.into(),
            dimensions,
            mesh,
            internal,
            boundary,
            old_time: None,
            prev_iter: None,
        };
        field.correct_boundary_conditions()?;
        Ok(field)
    }

    /// 由边界条件配置创建，使用内置注册表
    pub fn from_specs(
        name: impl Into<String>,
        dimensions: DimensionSet,
        mesh: Arc<GeoMesh>,
        internal: Vec<T>,
        specs: &BTreeMap<String, PatchFieldSpec>,
    ) -> MatrixResult<Self> {
        Self::from_specs_with_registry(name, dimensions, mesh, internal, specs, &PatchFieldRegistry::new())
    }

    /// 由边界条件配置创建，使用给定注册表
    pub fn from_specs_with_registry(
        name: impl Into<String>,
        dimensions: DimensionSet,
        mesh: Arc<GeoMesh>,
        internal: Vec<T>,
        specs: &BTreeMap<String, PatchFieldSpec>,
        registry: &PatchFieldRegistry<T>,
    ) -> MatrixResult<Self> {
        let boundary = registry.construct_all(mesh.boundary(), specs)?;
        Self::new(name, dimensions, mesh, internal, boundary)
    }

    /// 均匀内部值
    pub fn uniform(
        name: impl Into<String>,
        dimensions: DimensionSet,
        mesh: Arc<GeoMesh>,
        value: T,
        specs: &BTreeMap<String, PatchFieldSpec>,
    ) -> MatrixResult<Self> {
        let internal = vec![value; mesh.n_cells()];
        Self::from_specs(name, dimensions, mesh, internal, specs)
    }

    /// 场名
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

    /// 内部值
    #[inline]
    pub fn internal(&self) -> &[T] {
        &self.internal
    }

    /// 可写内部值，修改后应调用 [`Self::correct_boundary_conditions`]
    #[inline]
    pub fn internal_mut(&mut self) -> &mut [T] {
        &mut self.internal
    }

    /// 全部边界条件
    #[inline]
    pub fn boundary_field(&self) -> &[Box<dyn PatchField<T>>] {
        &self.boundary
    }

    /// 可写边界条件
    pub fn patch_field_mut(&mut self, patch: usize) -> Option<&mut Box<dyn PatchField<T>>> {
        self.boundary.get_mut(patch)
    }

    /// 是否需要参考值：所有 rank 上都没有固定场水平的边界
    pub fn need_reference(&self) -> MatrixResult<bool> {
        let local = !self.boundary.iter().any(|pf| pf.fixes_value());
        Ok(self.mesh.comm().all_reduce_and(local)?)
    }

    /// 通过耦合界面逐分量交换，取得每个耦合边界片另一侧的值
    ///
    /// 所有 rank 必须同时调用。
    pub fn exchange_neighbour_fields(&self) -> MatrixResult<Vec<Option<Vec<T>>>> {
        let interfaces = self.mesh.interfaces();
        let mut out: Vec<Option<Vec<T>>> = interfaces.iter().map(|_| None).collect();
        if interfaces.iter().all(Option::is_none) {
            return Ok(out);
        }
        for d in 0..T::N_COMPONENTS {
            let cmpt = self.component(d);
            for (slot, nbr) in out.iter_mut().zip(exchange(interfaces, &cmpt)?) {
                let Some(nbr) = nbr else { continue };
                let values = slot.get_or_insert_with(|| vec![T::zero(); nbr.len()]);
                for (v, x) in values.iter_mut().zip(nbr) {
                    v.set_component(d, x);
                }
            }
        }
        Ok(out)
    }

    /// 最近一次求值时缓存的耦合边界另一侧的值
    pub fn patch_neighbour_fields(&self) -> Vec<Option<Vec<T>>> {
        self.boundary
            .iter()
            .map(|pf| pf.patch_neighbour_field().map(<[T]>::to_vec))
            .collect()
    }

    /// 更新全部边界条件的系数与边界值
    pub fn correct_boundary_conditions(&mut self) -> MatrixResult<()> {
        let neighbours = self.exchange_neighbour_fields()?;
        for ((pf, patch), nbr) in self.boundary.iter_mut().zip(self.mesh.boundary().iter()).zip(&neighbours) {
            pf.update_coeffs(patch);
            pf.evaluate(patch, &self.internal, nbr.as_deref())?;
        }
        Ok(())
    }

    /// 保存当前值为上一时间步值
    pub fn store_old_time(&mut self) {
        self.old_time = Some(self.internal.clone());
    }

    /// 上一时间步值
    #[inline]
    pub fn old_time(&self) -> Option<&[T]> {
        self.old_time.as_deref()
    }

    /// 保存当前值为上一迭代步值
    pub fn store_prev_iter(&mut self) {
        self.prev_iter = Some(self.internal.clone());
    }

    /// 上一迭代步值
    #[inline]
    pub fn prev_iter(&self) -> Option<&[T]> {
        self.prev_iter.as_deref()
    }

    /// 显式松弛：`ψ = ψ_prev + α·(ψ − ψ_prev)`
    pub fn relax(&mut self, alpha: f64) -> MatrixResult<()> {
        let prev = self.prev_iter.as_ref().ok_or_else(|| {
            LfError::invalid_input(format!("场 '{}' 未保存上一迭代步值，无法松弛", self.name))
        })?;
        for (v, &p) in self.internal.iter_mut().zip(prev) {
            *v = p + (*v - p) * alpha;
        }
        log::debug!("场 '{}' 显式松弛 α = {}", self.name, alpha);
        self.correct_boundary_conditions()
    }

    /// 使用求解字典中的场松弛因子松弛，未配置时不做任何事
    pub fn relax_from(&mut self, solution: &FvSolution) -> MatrixResult<()> {
        match solution.relaxation_factors.field_factor(&self.name) {
            Some(alpha) => self.relax(alpha),
            None => Ok(()),
        }
    }

    /// 取出一个分量
    pub fn component(&self, d: usize) -> Vec<f64> {
        self.internal.iter().map(|v| v.component(d)).collect()
    }

    /// 替换一个分量
    pub fn replace_component(&mut self, d: usize, values: &[f64]) -> MatrixResult<()> {
        MatrixError::check_len("分量", self.internal.len(), values.len())?;
        for (v, &x) in self.internal.iter_mut().zip(values) {
            v.set_component(d, x);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use lf_mesh::generation::LineMeshGenerator;

    fn specs(left: PatchFieldSpec, right: PatchFieldSpec) -> BTreeMap<String, PatchFieldSpec> {
        let mut s = BTreeMap::new();
        s.insert("left".to_string(), left);
        s.insert("right".to_string(), right);
        s
    }

    #[test]
    fn test_boundary_values_corrected_on_creation() {
        let mesh = Arc::new(LineMeshGenerator::new(3, 3.0).build().unwrap());
        let f = VolScalarField::from_specs(
            "T",
            DimensionSet::TEMPERATURE,
            mesh,
            vec![1.0, 2.0, 3.0],
            &specs(PatchFieldSpec::fixed_value(0.0), PatchFieldSpec::zero_gradient()),
        )
        .unwrap();
        assert_eq!(f.boundary_field()[0].values(), &[0.0]);
        assert_eq!(f.boundary_field()[1].values(), &[3.0]);
        assert!(!f.need_reference().unwrap());
    }

    #[test]
    fn test_need_reference() {
        let mesh = Arc::new(LineMeshGenerator::new(3, 3.0).build().unwrap());
        let f = VolScalarField::uniform(
            "p",
            DimensionSet::DIMLESS,
            mesh,
            0.0,
            &specs(PatchFieldSpec::zero_gradient(), PatchFieldSpec::fixed_gradient(1.0)),
        )
        .unwrap();
        assert!(f.need_reference().unwrap());
        // ψ_P + g/δ = 0 + 1/2
        assert_eq!(f.boundary_field()[1].values(), &[0.5]);
    }

    #[test]
    fn test_size_checks() {
        let mesh = Arc::new(LineMeshGenerator::new(3, 3.0).build().unwrap());
        let s = specs(PatchFieldSpec::zero_gradient(), PatchFieldSpec::zero_gradient());
        let err = VolScalarField::from_specs("T", DimensionSet::DIMLESS, mesh, vec![0.0; 2], &s).unwrap_err();
        assert!(matches!(err, MatrixError::AddressingMismatch { .. }));
    }

    #[test]
    fn test_cyclic_neighbour_exchange() {
        let mesh = Arc::new(LineMeshGenerator::new(4, 4.0).cyclic(true).build().unwrap());
        let internal: Vec<DVec3> = (0..4).map(|i| DVec3::splat(i as f64)).collect();
        let f = VolVectorField::from_specs("U", DimensionSet::VELOCITY, mesh, internal, &BTreeMap::new()).unwrap();
        let nbr = f.patch_neighbour_fields();
        assert_eq!(nbr[0], Some(vec![DVec3::splat(3.0)]));
        assert_eq!(nbr[1], Some(vec![DVec3::splat(0.0)]));
        // 左侧边界值为两侧平均
        assert_eq!(f.boundary_field()[0].values(), &[DVec3::splat(1.5)]);
    }

    #[test]
    fn test_relax_and_components() {
        let mesh = Arc::new(LineMeshGenerator::new(2, 2.0).build().unwrap());
        let s = specs(PatchFieldSpec::zero_gradient(), PatchFieldSpec::zero_gradient());
        let mut f = VolScalarField::from_specs("k", DimensionSet::DIMLESS, mesh, vec![0.0, 0.0], &s).unwrap();
        assert!(f.relax(0.5).is_err());
        f.store_prev_iter();
        f.replace_component(0, &[2.0, 4.0]).unwrap();
        f.relax(0.5).unwrap();
        assert_eq!(f.internal(), &[1.0, 2.0]);
        assert_eq!(f.boundary_field()[1].values(), &[2.0]);
        assert!(f.replace_component(0, &[1.0]).is_err());
    }
}
