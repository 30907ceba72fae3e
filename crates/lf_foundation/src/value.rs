// crates/lf_foundation/src/value.rs

//! 场值类型抽象
//!
//! 方程矩阵的系数（对角、上、下三角）始终为标量；源项与边界系数则
//! 携带场的值类型。`FieldValue` 统一了标量、向量与张量的逐分量访问，
//! 使分量分离求解（segregated solve）可以按分量逐个进行。
//!
//! # 实现类型
//!
//! - `f64`: 标量，1 个分量
//! - `glam::DVec3`: 向量，3 个分量
//! - `glam::DMat3`: 张量，9 个分量（列主序）

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use glam::{DMat3, DVec3};

/// 标量类型
pub type Scalar = f64;
/// 向量类型
pub type Vector = DVec3;
/// 张量类型
pub type Tensor = DMat3;

/// 场值类型 trait
pub trait FieldValue:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<f64, Output = Self>
    + AddAssign
    + SubAssign
{
    /// 分量数
    const N_COMPONENTS: usize;

    /// 类型名称（用于日志）
    const TYPE_NAME: &'static str;

    /// 各分量名称后缀（求解日志中 `Ux`、`Uy` 等）
    fn component_name(d: usize) -> &'static str;

    /// 零值
    fn zero() -> Self;

    /// 所有分量相同的值
    fn uniform(v: f64) -> Self;

    /// 所有分量为 1
    #[inline]
    fn one() -> Self {
        Self::uniform(1.0)
    }

    /// 读取分量
    fn component(&self, d: usize) -> f64;

    /// 写入分量
    fn set_component(&mut self, d: usize, v: f64);

    /// 从分量切片构造；长度为 1 时视为均匀值
    fn from_components(c: &[f64]) -> Option<Self> {
        if c.len() == 1 {
            return Some(Self::uniform(c[0]));
        }
        if c.len() != Self::N_COMPONENTS {
            return None;
        }
        let mut v = Self::zero();
        for (d, &x) in c.iter().enumerate() {
            v.set_component(d, x);
        }
        Some(v)
    }

    /// 逐分量乘
    fn cmpt_multiply(self, other: Self) -> Self {
        let mut v = self;
        for d in 0..Self::N_COMPONENTS {
            v.set_component(d, self.component(d) * other.component(d));
        }
        v
    }

    /// 逐分量绝对值
    fn cmpt_mag(self) -> Self {
        let mut v = self;
        for d in 0..Self::N_COMPONENTS {
            v.set_component(d, self.component(d).abs());
        }
        v
    }

    /// 分量平均
    fn cmpt_av(self) -> f64 {
        (0..Self::N_COMPONENTS).map(|d| self.component(d)).sum::<f64>() / Self::N_COMPONENTS as f64
    }

    /// 分量最大值
    fn cmpt_max(self) -> f64 {
        (0..Self::N_COMPONENTS)
            .map(|d| self.component(d))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// 分量最小值
    fn cmpt_min(self) -> f64 {
        (0..Self::N_COMPONENTS)
            .map(|d| self.component(d))
            .fold(f64::INFINITY, f64::min)
    }

    /// 模（Frobenius 范数）
    fn mag(self) -> f64 {
        (0..Self::N_COMPONENTS)
            .map(|d| self.component(d).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl FieldValue for f64 {
    const N_COMPONENTS: usize = 1;
    const TYPE_NAME: &'static str = "scalar";

    fn component_name(_d: usize) -> &'static str {
        ""
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn uniform(v: f64) -> Self {
        v
    }

    #[inline]
    fn component(&self, _d: usize) -> f64 {
        *self
    }

    #[inline]
    fn set_component(&mut self, _d: usize, v: f64) {
        *self = v;
    }

    #[inline]
    fn cmpt_multiply(self, other: Self) -> Self {
        self * other
    }

    #[inline]
    fn cmpt_mag(self) -> Self {
        self.abs()
    }

    #[inline]
    fn cmpt_av(self) -> f64 {
        self
    }

    #[inline]
    fn mag(self) -> f64 {
        self.abs()
    }
}

impl FieldValue for DVec3 {
    const N_COMPONENTS: usize = 3;
    const TYPE_NAME: &'static str = "vector";

    fn component_name(d: usize) -> &'static str {
        ["x", "y", "z"][d]
    }

    #[inline]
    fn zero() -> Self {
        DVec3::ZERO
    }

    #[inline]
    fn uniform(v: f64) -> Self {
        DVec3::splat(v)
    }

    #[inline]
    fn component(&self, d: usize) -> f64 {
        self[d]
    }

    #[inline]
    fn set_component(&mut self, d: usize, v: f64) {
        self[d] = v;
    }

    #[inline]
    fn cmpt_multiply(self, other: Self) -> Self {
        self * other
    }

    #[inline]
    fn mag(self) -> f64 {
        self.length()
    }
}

impl FieldValue for DMat3 {
    const N_COMPONENTS: usize = 9;
    const TYPE_NAME: &'static str = "tensor";

    fn component_name(d: usize) -> &'static str {
        // 列主序：第 d 个分量为 (行 d % 3, 列 d / 3)
        ["xx", "yx", "zx", "xy", "yy", "zy", "xz", "yz", "zz"][d]
    }

    #[inline]
    fn zero() -> Self {
        DMat3::ZERO
    }

    #[inline]
    fn uniform(v: f64) -> Self {
        DMat3::from_cols_array(&[v; 9])
    }

    #[inline]
    fn component(&self, d: usize) -> f64 {
        self.col(d / 3)[d % 3]
    }

    #[inline]
    fn set_component(&mut self, d: usize, v: f64) {
        self.col_mut(d / 3)[d % 3] = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_components() {
        let mut s = 2.0_f64;
        assert_eq!(f64::N_COMPONENTS, 1);
        s.set_component(0, 3.0);
        assert_eq!(s.component(0), 3.0);
        assert_eq!((-2.0_f64).cmpt_mag(), 2.0);
    }

    #[test]
    fn test_vector_components() {
        let mut v = DVec3::new(1.0, -2.0, 3.0);
        assert_eq!(v.component(1), -2.0);
        v.set_component(2, 6.0);
        assert_eq!(v.z, 6.0);
        assert_eq!(v.cmpt_max(), 6.0);
        assert_eq!(v.cmpt_min(), -2.0);
        assert!((v.cmpt_av() - 5.0 / 3.0).abs() < 1e-15);
        assert_eq!(v.cmpt_mag(), DVec3::new(1.0, 2.0, 6.0));
    }

    #[test]
    fn test_tensor_components() {
        let mut t = DMat3::IDENTITY;
        assert_eq!(t.component(0), 1.0);
        assert_eq!(t.component(4), 1.0);
        assert_eq!(t.component(1), 0.0);
        t.set_component(3, 5.0);
        assert_eq!(t.col(1).x, 5.0);
        assert_eq!(DMat3::component_name(3), "xy");
    }

    #[test]
    fn test_from_components() {
        assert_eq!(DVec3::from_components(&[2.0]), Some(DVec3::splat(2.0)));
        assert_eq!(
            DVec3::from_components(&[1.0, 2.0, 3.0]),
            Some(DVec3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(DVec3::from_components(&[1.0, 2.0]), None);
    }
}
