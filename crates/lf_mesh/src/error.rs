// crates/lf_mesh/src/error.rs

//! 网格层错误类型
//!
//! 所有错误可转换为 `lf_foundation::LfError` 向上传播

use lf_foundation::LfError;
use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// 连接关系无效
    #[error("连接关系无效: 面 {face}: {reason}")]
    InvalidAddressing {
        /// 出错的面
        face: usize,
        /// 原因
        reason: String,
    },

    /// 边界片无效
    #[error("边界片 '{patch}' 无效: {reason}")]
    InvalidPatch {
        /// 边界片名称
        patch: String,
        /// 原因
        reason: String,
    },

    /// 几何数组与拓扑不一致
    #[error("几何数据不一致: {what} 期望 {expected}, 实际 {actual}")]
    GeometryMismatch {
        /// 数组描述
        what: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 基础层错误
    #[error(transparent)]
    Foundation(#[from] LfError),
}

impl MeshError {
    /// 构造连接关系错误
    pub fn addressing(face: usize, reason: impl Into<String>) -> Self {
        Self::InvalidAddressing {
            face,
            reason: reason.into(),
        }
    }

    /// 构造边界片错误
    pub fn patch(patch: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPatch {
            patch: patch.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn check_geometry(what: &'static str, expected: usize, actual: usize) -> MeshResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::GeometryMismatch {
                what,
                expected,
                actual,
            })
        }
    }
}

/// 转换到基础层错误
impl From<MeshError> for LfError {
    fn from(err: MeshError) -> Self {
        match err {
            MeshError::Foundation(inner) => inner,
            MeshError::GeometryMismatch {
                what,
                expected,
                actual,
            } => LfError::size_mismatch(what, expected, actual),
            other => LfError::invalid_input(other.to_string()),
        }
    }
}
