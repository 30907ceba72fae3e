// crates/lf_matrix/src/boundary/spec.rs

//! 边界条件配置
//!
//! ```json
//! { "type": "fixedValue", "value": 0.0 }
//! { "type": "mixed", "refValue": [1, 0, 0], "refGradient": 0, "valueFraction": 0.5 }
//! ```
//!
//! 数值可以是单个数（各分量相同）或分量数组。

use lf_foundation::FieldValue;
use serde::{Deserialize, Serialize};

use crate::error::{MatrixError, MatrixResult};

/// 均匀边界值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    /// 所有分量相同
    Uniform(f64),
    /// 逐分量给出
    Components(Vec<f64>),
}

impl SpecValue {
    /// 转换为场值类型
    pub fn to_value<T: FieldValue>(&self) -> Option<T> {
        match self {
            Self::Uniform(v) => Some(T::uniform(*v)),
            Self::Components(c) => T::from_components(c),
        }
    }
}

impl From<f64> for SpecValue {
    fn from(v: f64) -> Self {
        Self::Uniform(v)
    }
}

/// 单个边界片的边界条件描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchFieldSpec {
    /// 类型名
    #[serde(rename = "type")]
    pub type_name: String,

    /// 边界值（fixedValue）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SpecValue>,

    /// 法向梯度（fixedGradient）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<SpecValue>,

    /// 参考值（mixed）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_value: Option<SpecValue>,

    /// 参考梯度（mixed）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_gradient: Option<SpecValue>,

    /// 值分数（mixed），1 为定值，0 为定梯度
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_fraction: Option<f64>,
}

impl PatchFieldSpec {
    /// 只有类型名的描述
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            value: None,
            gradient: None,
            ref_value: None,
            ref_gradient: None,
            value_fraction: None,
        }
    }

    /// `fixedValue`
    pub fn fixed_value(value: impl Into<SpecValue>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new("fixedValue")
        }
    }

    /// `fixedGradient`
    pub fn fixed_gradient(gradient: impl Into<SpecValue>) -> Self {
        Self {
            gradient: Some(gradient.into()),
            ..Self::new("fixedGradient")
        }
    }

    /// `zeroGradient`
    pub fn zero_gradient() -> Self {
        Self::new("zeroGradient")
    }

    /// `mixed`
    pub fn mixed(ref_value: impl Into<SpecValue>, ref_gradient: impl Into<SpecValue>, value_fraction: f64) -> Self {
        Self {
            ref_value: Some(ref_value.into()),
            ref_gradient: Some(ref_gradient.into()),
            value_fraction: Some(value_fraction),
            ..Self::new("mixed")
        }
    }

    /// 读取必需的值条目
    pub fn require<T: FieldValue>(
        patch: &str,
        key: &str,
        entry: &Option<SpecValue>,
    ) -> MatrixResult<T> {
        let entry = entry
            .as_ref()
            .ok_or_else(|| MatrixError::patch_field(patch, format!("缺少条目 '{}'", key)))?;
        entry.to_value::<T>().ok_or_else(|| {
            MatrixError::patch_field(
                patch,
                format!("条目 '{}' 的分量数与 {} 不符", key, T::TYPE_NAME),
            )
        })
    }
}
