// crates/lf_decompose/src/error.rs

//! 分解层错误类型

use lf_foundation::LfError;
use lf_matrix::MatrixError;
use lf_mesh::MeshError;
use thiserror::Error;

/// 分解层结果类型
pub type DecomposeResult<T> = Result<T, DecomposeError>;

/// 分解与重构错误
#[derive(Error, Debug)]
pub enum DecomposeError {
    /// 单元分配表无效
    #[error("单元 {cell} 分配到 rank {rank}，但进程数为 {n_procs}")]
    InvalidCellMap {
        /// 单元
        cell: usize,
        /// 分配的 rank
        rank: usize,
        /// 进程数
        n_procs: usize,
    },

    /// 数组长度与网格不一致
    #[error("大小不匹配: {what} 期望 {expected}, 实际 {actual}")]
    SizeMismatch {
        /// 数组描述
        what: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 重构时全局编号未恰好覆盖一次
    #[error("重构覆盖错误: {what} {index} 被写入 {count} 次")]
    Coverage {
        /// 对象描述（单元、面）
        what: &'static str,
        /// 全局编号
        index: usize,
        /// 写入次数
        count: usize,
    },

    /// 通信器与子域不符
    #[error("子域属于 rank {domain}，通信器为 rank {comm}")]
    RankMismatch {
        /// 子域 rank
        domain: usize,
        /// 通信器 rank
        comm: usize,
    },

    /// 网格层错误
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// 矩阵层错误
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    /// 基础层错误
    #[error(transparent)]
    Foundation(#[from] LfError),
}

impl DecomposeError {
    /// 检查长度
    pub fn check_size(what: &str, expected: usize, actual: usize) -> DecomposeResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(Self::SizeMismatch {
                what: what.to_string(),
                expected,
                actual,
            })
        }
    }
}
