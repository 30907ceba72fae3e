// crates/lf_matrix/src/vector_ops.rs

//! 向量运算（BLAS Level 1 风格）
//!
//! 迭代求解器的基础运算，均为本进程内的局部操作；全局归约通过
//! [`LduSystem`](crate::ldu::LduSystem) 完成。
//!
//! # 函数列表
//!
//! - [`dot`]: 点积 x·y
//! - [`axpy`]: y = α*x + y
//! - [`xpay`]: y = x + α*y
//! - [`sub`]: z = x - y

/// 点积 x·y
#[inline]
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    x.iter().zip(y.iter()).map(|(&xi, &yi)| xi * yi).sum()
}

/// AXPY: y = α*x + y
///
/// # 参数
///
/// - `alpha`: 标量 α
/// - `x`: 向量 x
/// - `y`: 向量 y（将被修改）
#[inline]
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi += alpha * xi;
    }
}

/// XPAY: y = x + α*y
#[inline]
pub fn xpay(x: &[f64], alpha: f64, y: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for (yi, &xi) in y.iter_mut().zip(x.iter()) {
        *yi = xi + alpha * *yi;
    }
}

/// 差: z = x - y
#[inline]
pub fn sub(x: &[f64], y: &[f64], z: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for ((zi, &xi), &yi) in z.iter_mut().zip(x).zip(y) {
        *zi = xi - yi;
    }
}

/// 逐元素乘: z = x ⊙ y
#[inline]
pub fn hadamard(x: &[f64], y: &[f64], z: &mut [f64]) {
    debug_assert_eq!(x.len(), y.len());
    for ((zi, &xi), &yi) in z.iter_mut().zip(x).zip(y) {
        *zi = xi * yi;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_axpy_xpay() {
        let x = [1.0, 2.0];
        let mut y = [1.0, 1.0];
        axpy(2.0, &x, &mut y);
        assert_eq!(y, [3.0, 5.0]);
        xpay(&x, 0.5, &mut y);
        assert_eq!(y, [2.5, 4.5]);
    }

    #[test]
    fn test_sub_hadamard() {
        let mut z = [0.0; 2];
        sub(&[3.0, 4.0], &[1.0, 1.0], &mut z);
        assert_eq!(z, [2.0, 3.0]);
        hadamard(&[3.0, 4.0], &[2.0, 0.5], &mut z);
        assert_eq!(z, [6.0, 2.0]);
    }
}
