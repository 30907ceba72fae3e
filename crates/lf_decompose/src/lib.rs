// crates/lf_decompose/src/lib.rs

//! LduFlow 区域分解层 (Layer 4)
//!
//! 把全局网格按单元分配表拆成多个处理器子域，子域之间经处理器边界片
//! 耦合，并在全局场与子域场之间来回转换。
//!
//! # 核心类型
//!
//! - [`ProcessorDomain`]: 单个 rank 的本地网格数据与映射关系
//! - [`FieldDecomposer`]: 全局值 -> 各子域本地值
//! - [`FieldReconstructor`]: 各子域本地值 -> 全局值
//!
//! # 用法
//!
//! 分解在一个线程中完成；每个 rank 拿到自己的 [`ProcessorDomain`] 与
//! 通信器端点后，在自己的线程里调用 [`ProcessorDomain::build_mesh`]
//! 并构造场、组装方程、求解。结束后把各 rank 的单元值交给
//! [`FieldReconstructor`] 合并。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decomposition;
pub mod error;
pub mod field_decomposer;
pub mod reconstructor;

/// 层级标识
pub const LAYER: u8 = 4;

pub use decomposition::{decompose, simple_partition, DecompositionMaps, ProcessorDomain};
pub use error::{DecomposeError, DecomposeResult};
pub use field_decomposer::{DecomposedSurface, FieldDecomposer};
pub use reconstructor::FieldReconstructor;
