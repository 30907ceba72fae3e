// crates/lf_matrix/src/fv/mod.rs

//! 方程矩阵
//!
//! [`EquationMatrix`] 把标量 LDU 矩阵、值类型右端项与边界系数绑定到一个场上。
//! 有限体积方程与有限面积方程共用同一实现，区别只在网格的度量量纲，
//! 分别以 [`FvMatrix`] 与 [`FaMatrix`] 命名。
//!
//! # 生命周期
//!
//! ```text
//! Assembling ──fold_boundary──▶ BoundaryFolded ──solve──▶ Solved
//!     │                                                     ▲
//!     └──────────────────────solve──────────────────────────┘
//! ```
//!
//! 组合运算只能在 `Assembling` 状态进行；`relax`、`set_reference`、
//! `set_values` 在求解前任一状态可用；`Solved` 之后只能再次求解或读取
//! 导出量，外迭代需要重新组装新的矩阵。

mod constraints;
mod derived;
pub mod matrix;
mod ops;
mod solve;

pub use matrix::{EquationMatrix, FaMatrix, FvMatrix};

/// 方程矩阵状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixState {
    /// 组装中，边界系数尚未折叠
    Assembling,
    /// 边界系数已折叠进对角元与右端项
    BoundaryFolded,
    /// 已求解
    Solved,
}

impl MatrixState {
    /// 边界系数是否已折叠
    #[inline]
    pub fn folded(self) -> bool {
        !matches!(self, Self::Assembling)
    }
}
