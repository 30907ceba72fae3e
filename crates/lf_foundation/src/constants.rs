// crates/lf_foundation/src/constants.rs

//! 数值常量

/// 小量，用于相对比较
pub const SMALL: f64 = 1.0e-15;

/// 极小量，用于除零保护
pub const VSMALL: f64 = 1.0e-300;

/// 残差归一化因子的下限
pub const RESIDUAL_SMALL: f64 = 1.0e-20;

/// 大数
pub const GREAT: f64 = 1.0e15;

/// 极大数
pub const VGREAT: f64 = 1.0e300;
