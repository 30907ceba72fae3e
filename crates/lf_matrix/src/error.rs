// crates/lf_matrix/src/error.rs

//! 方程矩阵层错误类型
//!
//! 除求解不收敛外，所有错误都是致命的：在任何数值计算开始之前返回。
//! 求解不收敛通过 `SolverPerformance::converged()` 以数据形式报告。

use lf_config::ConfigError;
use lf_foundation::LfError;
use lf_mesh::MeshError;
use thiserror::Error;

use crate::fv::MatrixState;

/// 矩阵层结果类型
pub type MatrixResult<T> = Result<T, MatrixError>;

/// 矩阵层错误
#[derive(Error, Debug)]
pub enum MatrixError {
    /// 向量长度与连接关系不一致
    #[error("寻址不匹配: {what} 期望 {expected}, 实际 {actual}")]
    AddressingMismatch {
        /// 数组描述
        what: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 当前状态下不允许该操作
    #[error("状态错误: {operation} 不能在 {state:?} 状态下执行")]
    InvalidState {
        /// 操作名
        operation: &'static str,
        /// 当前状态
        state: MatrixState,
    },

    /// 求解器与矩阵对称性不匹配或名称未知
    #[error("未知的{symmetry}矩阵求解器 '{name}'，可用: {valid}")]
    UnsupportedSolver {
        /// 请求的名称
        name: String,
        /// 对称性类别
        symmetry: &'static str,
        /// 可用名称列表
        valid: String,
    },

    /// 预条件器未知或不适用
    #[error("未知的{symmetry}矩阵预条件器 '{name}'，可用: {valid}")]
    UnknownPreconditioner {
        /// 请求的名称
        name: String,
        /// 对称性类别
        symmetry: &'static str,
        /// 可用名称列表
        valid: String,
    },

    /// 光滑器未知或不适用
    #[error("未知的{symmetry}矩阵光滑器 '{name}'，可用: {valid}")]
    UnknownSmoother {
        /// 请求的名称
        name: String,
        /// 对称性类别
        symmetry: &'static str,
        /// 可用名称列表
        valid: String,
    },

    /// 边界条件类型未注册
    #[error("未知的边界条件类型 '{name}'，可用: {valid}")]
    UnknownPatchFieldType {
        /// 请求的类型名
        name: String,
        /// 已注册类型
        valid: String,
    },

    /// 边界条件参数缺失或不一致
    #[error("边界片 '{patch}' 的边界条件无效: {reason}")]
    InvalidPatchField {
        /// 边界片名称
        patch: String,
        /// 原因
        reason: String,
    },

    /// 松弛时对角元非正
    #[error("单元 {cell} 的对角元 {value:e} 非正，无法松弛")]
    NonPositiveDiagonal {
        /// 单元
        cell: usize,
        /// 对角值
        value: f64,
    },

    /// 参与运算的方程属于不同的场或网格
    #[error("场不匹配: 期望 '{expected}', 实际 '{actual}'")]
    FieldMismatch {
        /// 期望场名
        expected: String,
        /// 实际场名
        actual: String,
    },

    /// 基础层错误（量纲、通信等）
    #[error(transparent)]
    Foundation(#[from] LfError),

    /// 网格层错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 配置层错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MatrixError {
    /// 检查长度，不一致时返回 `AddressingMismatch`
    #[inline]
    pub fn check_len(what: &str, expected: usize, actual: usize) -> MatrixResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::AddressingMismatch {
                what: what.to_string(),
                expected,
                actual,
            })
        }
    }

    /// 构造边界条件错误
    pub fn patch_field(patch: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPatchField {
            patch: patch.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn list(names: &[&str]) -> String {
        names.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_len() {
        assert!(MatrixError::check_len("psi", 3, 3).is_ok());
        let err = MatrixError::check_len("psi", 3, 2).unwrap_err();
        assert!(matches!(err, MatrixError::AddressingMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_unsupported_solver_lists_names() {
        let err = MatrixError::UnsupportedSolver {
            name: "PCG".into(),
            symmetry: "非对称",
            valid: MatrixError::list(&["PBiCG", "PBiCGStab"]),
        };
        let msg = err.to_string();
        assert!(msg.contains("PCG"));
        assert!(msg.contains("PBiCG, PBiCGStab"));
    }
}
