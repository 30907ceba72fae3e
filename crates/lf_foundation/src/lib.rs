// crates/lf_foundation/src/lib.rs

//! LduFlow Foundation Layer (Layer 1)
//!
//! 基础层，提供整个项目共享的基础抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `LfError`
//! - [`dimension`]: 物理量纲集合 `DimensionSet` 与带量纲标量
//! - [`value`]: 场值类型 trait `FieldValue`（标量/向量/张量）
//! - [`constants`]: 数值常量
//! - [`comm`]: 进程间消息传递抽象 `Communicator`
//!
//! # 层级架构
//!
//! ```text
//! Layer 5: lf_cli
//! Layer 3: lf_matrix / lf_decompose / lf_config
//! Layer 2: lf_mesh
//! Layer 1: lf_foundation (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod comm;
pub mod constants;
pub mod dimension;
pub mod error;
pub mod value;

/// 层级标识
pub const LAYER: u8 = 1;

// 重导出常用类型
pub use comm::{Communicator, SerialComm, ThreadComm};
pub use dimension::{DimensionSet, DimensionedScalar};
pub use error::{LfError, LfResult};
pub use value::{FieldValue, Scalar, Tensor, Vector};
