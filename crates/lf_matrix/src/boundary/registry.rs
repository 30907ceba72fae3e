// crates/lf_matrix/src/boundary/registry.rs

//! 边界条件注册表
//!
//! 类型名到构造函数的映射。内置 `fixedValue`、`fixedGradient`、
//! `zeroGradient`、`mixed` 与 `coupled`；耦合边界片总是使用 `coupled`，
//! 不需要也不读取配置条目。

use std::collections::BTreeMap;
use std::fmt;

use lf_foundation::FieldValue;
use lf_mesh::{BoundaryMesh, Patch};

use super::coupled::CoupledPatchField;
use super::fixed_gradient::FixedGradientPatchField;
use super::fixed_value::FixedValuePatchField;
use super::mixed::MixedPatchField;
use super::patch_field::PatchField;
use super::spec::PatchFieldSpec;
use super::zero_gradient::ZeroGradientPatchField;
use crate::error::{MatrixError, MatrixResult};

/// 边界条件构造函数：(边界片索引, 边界片, 配置) → 边界场
pub type PatchFieldConstructor<T> = fn(usize, &Patch, &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>>;

/// 边界条件注册表
pub struct PatchFieldRegistry<T: FieldValue> {
    constructors: BTreeMap<String, PatchFieldConstructor<T>>,
}

impl<T: FieldValue> PatchFieldRegistry<T> {
    /// 含全部内置类型的注册表
    pub fn new() -> Self {
        let mut r = Self {
            constructors: BTreeMap::new(),
        };
        r.register("fixedValue", FixedValuePatchField::<T>::from_spec);
        r.register("fixedGradient", FixedGradientPatchField::<T>::from_spec);
        r.register("zeroGradient", ZeroGradientPatchField::<T>::from_spec);
        r.register("mixed", MixedPatchField::<T>::from_spec);
        r.register("coupled", CoupledPatchField::<T>::from_spec);
        r
    }

    /// 注册（或替换）一个类型
    pub fn register(&mut self, type_name: impl Into<String>, ctor: PatchFieldConstructor<T>) {
        self.constructors.insert(type_name.into(), ctor);
    }

    /// 已注册的类型名
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// 为单个边界片构造边界场
    pub fn construct(&self, patch_index: usize, patch: &Patch, spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<T>>> {
        let ctor = self
            .constructors
            .get(spec.type_name.as_str())
            .ok_or_else(|| MatrixError::UnknownPatchFieldType {
                name: spec.type_name.clone(),
                valid: MatrixError::list(&self.names()),
            })?;
        ctor(patch_index, patch, spec)
    }

    /// 按边界片名为全部边界片构造边界场
    pub fn construct_all(
        &self,
        boundary: &BoundaryMesh,
        specs: &BTreeMap<String, PatchFieldSpec>,
    ) -> MatrixResult<Vec<Box<dyn PatchField<T>>>> {
        let mut fields = Vec::with_capacity(boundary.len());
        for (i, patch) in boundary.iter().enumerate() {
            if patch.coupled() {
                fields.push(Box::new(CoupledPatchField::new(i, patch)) as Box<dyn PatchField<T>>);
                continue;
            }
            let spec = specs
                .get(&patch.name)
                .ok_or_else(|| MatrixError::patch_field(&patch.name, "未给出边界条件"))?;
            fields.push(self.construct(i, patch, spec)?);
        }
        if let Some(name) = specs.keys().find(|n| boundary.find_patch_id(n).is_none()) {
            log::warn!("边界条件 '{}' 没有对应的边界片，已忽略", name);
        }
        Ok(fields)
    }
}

impl<T: FieldValue> Default for PatchFieldRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FieldValue> fmt::Debug for PatchFieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchFieldRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_mesh::generation::LineMeshGenerator;

    fn fixed_one(patch_index: usize, patch: &Patch, _spec: &PatchFieldSpec) -> MatrixResult<Box<dyn PatchField<f64>>> {
        Ok(Box::new(FixedValuePatchField::uniform(patch_index, patch, 1.0)))
    }

    #[test]
    fn test_builtin_names() {
        let r = PatchFieldRegistry::<f64>::new();
        assert_eq!(
            r.names(),
            vec!["coupled", "fixedGradient", "fixedValue", "mixed", "zeroGradient"]
        );
    }

    #[test]
    fn test_construct_all() {
        let mesh = LineMeshGenerator::new(3, 3.0).build().unwrap();
        let r = PatchFieldRegistry::<f64>::new();
        let mut specs = BTreeMap::new();
        specs.insert("left".to_string(), PatchFieldSpec::fixed_value(1.0));
        specs.insert("right".to_string(), PatchFieldSpec::zero_gradient());
        let fields = r.construct_all(mesh.boundary(), &specs).unwrap();
        assert_eq!(fields[0].type_name(), "fixedValue");
        assert_eq!(fields[1].type_name(), "zeroGradient");

        specs.remove("right");
        let err = r.construct_all(mesh.boundary(), &specs).unwrap_err();
        assert!(matches!(err, MatrixError::InvalidPatchField { .. }));
    }

    #[test]
    fn test_unknown_type_lists_names() {
        let mesh = LineMeshGenerator::new(3, 3.0).build().unwrap();
        let r = PatchFieldRegistry::<f64>::new();
        let err = r
            .construct(0, &mesh.boundary()[0], &PatchFieldSpec::new("totalPressure"))
            .unwrap_err();
        assert!(err.to_string().contains("fixedValue"));
    }

    #[test]
    fn test_cyclic_patches_are_coupled() {
        let mesh = LineMeshGenerator::new(3, 3.0).cyclic(true).build().unwrap();
        let r = PatchFieldRegistry::<f64>::new();
        let fields = r.construct_all(mesh.boundary(), &BTreeMap::new()).unwrap();
        assert!(fields.iter().all(|f| f.coupled()));
    }

    #[test]
    fn test_register_custom() {
        let mesh = LineMeshGenerator::new(3, 3.0).build().unwrap();
        let mut r = PatchFieldRegistry::<f64>::new();
        r.register("one", fixed_one);
        let pf = r.construct(1, &mesh.boundary()[1], &PatchFieldSpec::new("one")).unwrap();
        assert_eq!(pf.values(), &[1.0]);
        assert!(pf.fixes_value());
    }
}
