// crates/lf_matrix/src/ldu/mod.rs

//! LDU 存储与线性系统视图
//!
//! - [`LduMatrix`]: 按连接关系存储的标量稀疏矩阵
//! - [`LduSystem`]: 矩阵 + 耦合界面系数 + 通信器，求解器只面向它

pub mod matrix;
pub mod system;

pub use matrix::LduMatrix;
pub use system::{InterfaceCoeffs, LduSystem};
