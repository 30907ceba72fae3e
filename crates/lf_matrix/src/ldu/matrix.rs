// crates/lf_matrix/src/ldu/matrix.rs

//! LDU 稀疏矩阵
//!
//! 按网格连接关系存储的稀疏算子：
//!
//! - `diag[c]`: 单元 `c` 的对角系数
//! - `upper[f]`: 面 `f` 的 owner 行、neighbour 列系数
//! - `lower[f]`: 面 `f` 的 neighbour 行、owner 列系数
//!
//! # 存储规则
//!
//! - 从未写入非对角系数：对角矩阵
//! - 只写入 `upper`：对称矩阵，`lower()` 返回 `upper`
//! - 写入过 `lower`：独立存储下三角（首次写 `lower` 时复制 `upper`）
//!
//! 对称性按系数判断：`lower` 未分配或与 `upper` 逐项相等即为对称。
//!
//! # 使用示例
//!
//! ```rust
//! use std::sync::Arc;
//! use lf_mesh::LduAddressing;
//! use lf_matrix::ldu::LduMatrix;
//!
//! let addr = Arc::new(LduAddressing::new(2, vec![0], vec![1]).unwrap());
//! let mut m = LduMatrix::new(addr);
//! m.diag_mut().copy_from_slice(&[2.0, 2.0]);
//! m.upper_mut()[0] = -1.0;
//! assert!(m.symmetric());
//!
//! let mut y = vec![0.0; 2];
//! m.amul(&[1.0, 1.0], &mut y).unwrap();
//! assert_eq!(y, vec![1.0, 1.0]);
//! ```

use std::sync::Arc;

use lf_foundation::FieldValue;
use lf_mesh::LduAddressing;

use crate::error::{MatrixError, MatrixResult};

/// LDU 稀疏矩阵
#[derive(Debug, Clone, PartialEq)]
pub struct LduMatrix {
    addressing: Arc<LduAddressing>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    lower: Option<Vec<f64>>,
    has_off_diag: bool,
}

impl LduMatrix {
    /// 创建全零对角矩阵
    pub fn new(addressing: Arc<LduAddressing>) -> Self {
        let n_cells = addressing.n_cells();
        let n_faces = addressing.n_faces();
        Self {
            addressing,
            diag: vec![0.0; n_cells],
            upper: vec![0.0; n_faces],
            lower: None,
            has_off_diag: false,
        }
    }

    /// 连接关系
    #[inline]
    pub fn addressing(&self) -> &LduAddressing {
        &self.addressing
    }

    /// 共享的连接关系
    #[inline]
    pub fn addressing_arc(&self) -> &Arc<LduAddressing> {
        &self.addressing
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.diag.len()
    }

    /// 内部面数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.upper.len()
    }

    /// 对角系数
    #[inline]
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    /// 可写对角系数
    #[inline]
    pub fn diag_mut(&mut self) -> &mut [f64] {
        &mut self.diag
    }

    /// 上三角系数
    #[inline]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// 可写上三角系数
    #[inline]
    pub fn upper_mut(&mut self) -> &mut [f64] {
        self.has_off_diag = true;
        &mut self.upper
    }

    /// 下三角系数，对称矩阵返回上三角系数
    #[inline]
    pub fn lower(&self) -> &[f64] {
        self.lower.as_deref().unwrap_or(&self.upper)
    }

    /// 可写下三角系数，对称矩阵首次调用时复制上三角
    pub fn lower_mut(&mut self) -> &mut [f64] {
        self.has_off_diag = true;
        let upper = &self.upper;
        self.lower.get_or_insert_with(|| upper.clone())
    }

    /// 同时取得上、下三角可写引用（矩阵随之变为非对称）
    pub fn upper_lower_mut(&mut self) -> (&mut [f64], &mut [f64]) {
        self.has_off_diag = true;
        let upper = &mut self.upper;
        let lower = self.lower.get_or_insert_with(|| upper.clone());
        (upper.as_mut_slice(), lower.as_mut_slice())
    }

    /// 是否为对角矩阵
    #[inline]
    pub fn diagonal(&self) -> bool {
        !self.has_off_diag
    }

    /// 是否为对称矩阵（`lower` 未分配或与 `upper` 相等）
    pub fn symmetric(&self) -> bool {
        self.has_off_diag && !self.asymmetric()
    }

    /// 是否为非对称矩阵
    pub fn asymmetric(&self) -> bool {
        self.lower.as_ref().is_some_and(|lower| *lower != self.upper)
    }

    /// 是否分配了独立的下三角存储
    #[inline]
    pub fn has_lower(&self) -> bool {
        self.lower.is_some()
    }

    fn check_cells(&self, what: &str, len: usize) -> MatrixResult<()> {
        MatrixError::check_len(what, self.n_cells(), len)
    }

    /// 内部乘积 `result = A·x`，不含耦合界面
    pub fn amul(&self, x: &[f64], result: &mut [f64]) -> MatrixResult<()> {
        self.check_cells("Amul psi", x.len())?;
        self.check_cells("Amul result", result.len())?;
        for ((r, &d), &xi) in result.iter_mut().zip(&self.diag).zip(x) {
            *r = d * xi;
        }
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower();
        for f in 0..self.n_faces() {
            result[l[f]] += self.upper[f] * x[u[f]];
            result[u[f]] += lower[f] * x[l[f]];
        }
        Ok(())
    }

    /// 转置乘积 `result = Aᵀ·x`，不含耦合界面
    pub fn tmul(&self, x: &[f64], result: &mut [f64]) -> MatrixResult<()> {
        self.check_cells("Tmul psi", x.len())?;
        self.check_cells("Tmul result", result.len())?;
        for ((r, &d), &xi) in result.iter_mut().zip(&self.diag).zip(x) {
            *r = d * xi;
        }
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower();
        for f in 0..self.n_faces() {
            result[l[f]] += lower[f] * x[u[f]];
            result[u[f]] += self.upper[f] * x[l[f]];
        }
        Ok(())
    }

    /// 行和（不含耦合界面）
    pub fn sum_a(&self) -> Vec<f64> {
        let mut sum = self.diag.clone();
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower();
        for f in 0..self.n_faces() {
            sum[u[f]] += lower[f];
            sum[l[f]] += self.upper[f];
        }
        sum
    }

    /// `diag -= Σ` 相邻面系数（按列累加，对流与扩散离散的对角构造方式）
    pub fn neg_sum_diag(&mut self) {
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower.as_deref().unwrap_or(&self.upper);
        for f in 0..self.upper.len() {
            self.diag[l[f]] -= lower[f];
            self.diag[u[f]] -= self.upper[f];
        }
    }

    /// `diag += Σ` 相邻面系数
    pub fn sum_diag(&mut self) {
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower.as_deref().unwrap_or(&self.upper);
        for f in 0..self.upper.len() {
            self.diag[l[f]] += lower[f];
            self.diag[u[f]] += self.upper[f];
        }
    }

    /// 每行非对角系数绝对值之和累加到 `sum_off`
    pub fn sum_mag_off_diag(&self, sum_off: &mut [f64]) -> MatrixResult<()> {
        self.check_cells("sumOff", sum_off.len())?;
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower();
        for f in 0..self.n_faces() {
            sum_off[u[f]] += lower[f].abs();
            sum_off[l[f]] += self.upper[f].abs();
        }
        Ok(())
    }

    /// 非对角部分作用于场：`H(ψ) = −(L + U)·ψ`
    pub fn h_operation<T: FieldValue>(&self, psi: &[T]) -> MatrixResult<Vec<T>> {
        self.check_cells("H psi", psi.len())?;
        let mut h = vec![T::zero(); psi.len()];
        if self.has_off_diag {
            let l = self.addressing.lower_addr();
            let u = self.addressing.upper_addr();
            let lower = self.lower();
            for f in 0..self.n_faces() {
                h[u[f]] -= psi[l[f]] * lower[f];
                h[l[f]] -= psi[u[f]] * self.upper[f];
            }
        }
        Ok(h)
    }

    /// 单位场上的非对角作用：`H1 = −Σ` 行非对角系数
    pub fn h1(&self) -> Vec<f64> {
        let mut h1 = vec![0.0; self.n_cells()];
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower();
        for f in 0..self.n_faces() {
            h1[u[f]] -= lower[f];
            h1[l[f]] -= self.upper[f];
        }
        h1
    }

    /// 面上的非对角通量：`upper·ψ_N − lower·ψ_O`
    pub fn face_h<T: FieldValue>(&self, psi: &[T]) -> MatrixResult<Vec<T>> {
        self.check_cells("faceH psi", psi.len())?;
        let l = self.addressing.lower_addr();
        let u = self.addressing.upper_addr();
        let lower = self.lower();
        Ok((0..self.n_faces())
            .map(|f| psi[u[f]] * self.upper[f] - psi[l[f]] * lower[f])
            .collect())
    }

    /// `self += other`
    pub fn add_assign(&mut self, other: &LduMatrix) -> MatrixResult<()> {
        self.check_same_addressing(other)?;
        for (a, b) in self.diag.iter_mut().zip(&other.diag) {
            *a += b;
        }
        if other.diagonal() {
            return Ok(());
        }
        if other.has_lower() || self.has_lower() {
            let (upper, lower) = self.upper_lower_mut();
            for (a, b) in upper.iter_mut().zip(other.upper()) {
                *a += b;
            }
            for (a, b) in lower.iter_mut().zip(other.lower()) {
                *a += b;
            }
        } else {
            for (a, b) in self.upper_mut().iter_mut().zip(&other.upper) {
                *a += b;
            }
        }
        Ok(())
    }

    /// `self -= other`
    pub fn sub_assign(&mut self, other: &LduMatrix) -> MatrixResult<()> {
        let mut neg = other.clone();
        neg.negate();
        self.add_assign(&neg)
    }

    /// 所有系数乘以常数
    pub fn scale(&mut self, s: f64) {
        self.diag.iter_mut().for_each(|v| *v *= s);
        self.upper.iter_mut().for_each(|v| *v *= s);
        if let Some(lower) = self.lower.as_mut() {
            lower.iter_mut().for_each(|v| *v *= s);
        }
    }

    /// 取负
    pub fn negate(&mut self) {
        self.scale(-1.0);
    }

    fn check_same_addressing(&self, other: &LduMatrix) -> MatrixResult<()> {
        if Arc::ptr_eq(&self.addressing, &other.addressing) || self.addressing == other.addressing {
            Ok(())
        } else {
            Err(MatrixError::AddressingMismatch {
                what: "矩阵连接关系".to_string(),
                expected: self.n_faces(),
                actual: other.n_faces(),
            })
        }
    }
}
