// crates/lf_foundation/src/error.rs

//! 错误处理模块，定义基础层统一错误类型
//!
//! 提供 `LfError` 枚举和 `LfResult` 类型别名。上层 crate 定义各自的
//! 错误类型，并通过 `#[from]` 包装本类型。
//!
//! # 示例
//!
//! ```
//! use lf_foundation::error::{LfError, LfResult};
//!
//! fn check(n: usize) -> LfResult<()> {
//!     if n == 0 {
//!         return Err(LfError::invalid_input("单元数不能为零"));
//!     }
//!     Ok(())
//! }
//! assert!(check(0).is_err());
//! ```

use thiserror::Error;

use crate::dimension::DimensionSet;

/// 统一结果类型
pub type LfResult<T> = Result<T, LfError>;

/// 基础层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LfError {
    /// 量纲不一致
    #[error("量纲不一致: {operation} 左侧 {lhs} 与右侧 {rhs}")]
    DimensionMismatch {
        /// 出错的运算
        operation: String,
        /// 左操作数量纲
        lhs: DimensionSet,
        /// 右操作数量纲
        rhs: DimensionSet,
    },

    /// 数组大小不匹配
    #[error("大小不匹配: {what} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数组描述
        what: String,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 索引越界
    #[error("{index_type}({index}) 越界，长度为 {len}")]
    IndexOutOfBounds {
        /// 索引类型名称
        index_type: &'static str,
        /// 索引值
        index: usize,
        /// 容量
        len: usize,
    },

    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 通信错误
    #[error("通信错误: rank {rank}: {message}")]
    Communication {
        /// 出错的进程号
        rank: usize,
        /// 错误信息
        message: String,
    },
}

impl LfError {
    /// 构造无效输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 构造大小不匹配错误
    pub fn size_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    /// 构造通信错误
    pub fn communication(rank: usize, message: impl Into<String>) -> Self {
        Self::Communication {
            rank,
            message: message.into(),
        }
    }

    /// 检查大小，不一致时返回 `SizeMismatch`
    #[inline]
    pub fn check_size(what: &str, expected: usize, actual: usize) -> LfResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::size_mismatch(what, expected, actual))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display() {
        let err = LfError::size_mismatch("psi", 5, 4);
        let msg = err.to_string();
        assert!(msg.contains("psi"));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_check_size() {
        assert!(LfError::check_size("x", 3, 3).is_ok());
        assert_eq!(
            LfError::check_size("x", 3, 2),
            Err(LfError::size_mismatch("x", 3, 2))
        );
    }
}
