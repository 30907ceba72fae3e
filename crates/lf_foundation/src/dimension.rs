// crates/lf_foundation/src/dimension.rs

//! 物理量纲系统
//!
//! `DimensionSet` 记录七个基本量纲的指数（质量、长度、时间、温度、
//! 物质的量、电流、发光强度），用于在方程组合前做一致性检查。
//!
//! # 用法
//!
//! ```
//! use lf_foundation::dimension::DimensionSet;
//!
//! let velocity = DimensionSet::LENGTH / DimensionSet::TIME;
//! let flux = velocity * DimensionSet::AREA;
//! assert_eq!(flux, DimensionSet::VOLUME / DimensionSet::TIME);
//! assert!(flux.check_same("+=", &velocity).is_err());
//! ```

use std::fmt;
use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

use crate::error::{LfError, LfResult};

/// 基本量纲数
pub const N_DIMENSIONS: usize = 7;

/// 量纲集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionSet {
    exponents: [i8; N_DIMENSIONS],
}

impl DimensionSet {
    /// 无量纲
    pub const DIMLESS: Self = Self::new(0, 0, 0, 0, 0, 0, 0);
    /// 质量
    pub const MASS: Self = Self::new(1, 0, 0, 0, 0, 0, 0);
    /// 长度
    pub const LENGTH: Self = Self::new(0, 1, 0, 0, 0, 0, 0);
    /// 时间
    pub const TIME: Self = Self::new(0, 0, 1, 0, 0, 0, 0);
    /// 温度
    pub const TEMPERATURE: Self = Self::new(0, 0, 0, 1, 0, 0, 0);
    /// 面积
    pub const AREA: Self = Self::new(0, 2, 0, 0, 0, 0, 0);
    /// 体积
    pub const VOLUME: Self = Self::new(0, 3, 0, 0, 0, 0, 0);
    /// 速度
    pub const VELOCITY: Self = Self::new(0, 1, -1, 0, 0, 0, 0);
    /// 运动黏度 / 扩散系数
    pub const DIFFUSIVITY: Self = Self::new(0, 2, -1, 0, 0, 0, 0);

    /// 由七个指数构造
    pub const fn new(
        mass: i8,
        length: i8,
        time: i8,
        temperature: i8,
        moles: i8,
        current: i8,
        luminous: i8,
    ) -> Self {
        Self {
            exponents: [mass, length, time, temperature, moles, current, luminous],
        }
    }

    /// 指数数组
    pub fn exponents(&self) -> [i8; N_DIMENSIONS] {
        self.exponents
    }

    /// 是否无量纲
    pub fn dimensionless(&self) -> bool {
        *self == Self::DIMLESS
    }

    /// 整数次幂
    pub fn pow(self, n: i8) -> Self {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e *= n;
        }
        Self { exponents }
    }

    /// 检查两量纲一致
    ///
    /// `operation` 用于诊断信息，例如 `"+="`、`"=="`。
    pub fn check_same(&self, operation: &str, other: &Self) -> LfResult<()> {
        if self == other {
            Ok(())
        } else {
            Err(LfError::DimensionMismatch {
                operation: operation.to_string(),
                lhs: *self,
                rhs: *other,
            })
        }
    }
}

impl Mul for DimensionSet {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents.iter()) {
            *e += r;
        }
        Self { exponents }
    }
}

impl Div for DimensionSet {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents.iter()) {
            *e -= r;
        }
        Self { exponents }
    }
}

impl fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.exponents.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", e)?;
        }
        write!(f, "]")
    }
}

/// 带量纲的标量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionedScalar {
    /// 名称
    pub name: String,
    /// 量纲
    pub dimensions: DimensionSet,
    /// 数值
    pub value: f64,
}

impl DimensionedScalar {
    /// 创建带量纲标量
    pub fn new(name: impl Into<String>, dimensions: DimensionSet, value: f64) -> Self {
        Self {
            name: name.into(),
            dimensions,
            value,
        }
    }

    /// 创建无量纲标量
    pub fn dimless(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, DimensionSet::DIMLESS, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div() {
        let v = DimensionSet::LENGTH / DimensionSet::TIME;
        assert_eq!(v, DimensionSet::VELOCITY);
        assert_eq!(DimensionSet::LENGTH.pow(3), DimensionSet::VOLUME);
        assert!((v / v).dimensionless());
    }

    #[test]
    fn test_check_same() {
        assert!(DimensionSet::AREA.check_same("+", &DimensionSet::AREA).is_ok());
        let err = DimensionSet::AREA
            .check_same("==", &DimensionSet::VOLUME)
            .unwrap_err();
        assert!(err.to_string().contains("=="));
    }

    #[test]
    fn test_display() {
        assert_eq!(DimensionSet::VELOCITY.to_string(), "[0 1 -1 0 0 0 0]");
    }
}
