// crates/lf_matrix/src/ldu/system.rs

//! 线性系统视图
//!
//! [`LduSystem`] 把一个标量 [`LduMatrix`] 与耦合界面系数、界面和通信器
//! 组合起来，提供求解器需要的全部运算。耦合界面贡献在每次乘积中以
//! 两个阶段加入：
//!
//! ```text
//! result[fc] -= bouCoeffs[face] * ψ_neighbour[face]
//! ```
//!
//! 所有全局归约都经过通信器，因此各 rank 必须以相同顺序调用。

use std::sync::Arc;

use lf_foundation::constants::RESIDUAL_SMALL;
use lf_foundation::Communicator;
use lf_mesh::interface::exchange;
use lf_mesh::LduInterface;

use crate::error::{MatrixError, MatrixResult};
use crate::ldu::matrix::LduMatrix;

/// 每个边界片一组界面系数，非耦合边界片为 `None`
pub type InterfaceCoeffs = Vec<Option<Vec<f64>>>;

/// 线性系统视图
#[derive(Clone, Copy)]
pub struct LduSystem<'a> {
    matrix: &'a LduMatrix,
    bou_coeffs: &'a [Option<Vec<f64>>],
    int_coeffs: &'a [Option<Vec<f64>>],
    interfaces: &'a [Option<Arc<dyn LduInterface>>],
    comm: &'a dyn Communicator,
}

impl<'a> LduSystem<'a> {
    /// 创建系统视图
    ///
    /// `bou_coeffs` 用于 `A·x`，`int_coeffs` 用于 `Aᵀ·x`。系数数组可以比
    /// 界面数组短，缺失项视为无耦合。
    pub fn new(
        matrix: &'a LduMatrix,
        bou_coeffs: &'a [Option<Vec<f64>>],
        int_coeffs: &'a [Option<Vec<f64>>],
        interfaces: &'a [Option<Arc<dyn LduInterface>>],
        comm: &'a dyn Communicator,
    ) -> Self {
        Self {
            matrix,
            bou_coeffs,
            int_coeffs,
            interfaces,
            comm,
        }
    }

    /// 无耦合界面的系统视图
    pub fn uncoupled(matrix: &'a LduMatrix, comm: &'a dyn Communicator) -> Self {
        Self::new(matrix, &[], &[], &[], comm)
    }

    /// 矩阵
    #[inline]
    pub fn matrix(&self) -> &'a LduMatrix {
        self.matrix
    }

    /// 通信器
    #[inline]
    pub fn comm(&self) -> &'a dyn Communicator {
        self.comm
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.matrix.n_cells()
    }

    /// 耦合界面的 `bouCoeffs`
    #[inline]
    pub fn bou_coeffs(&self) -> &'a [Option<Vec<f64>>] {
        self.bou_coeffs
    }

    /// 是否存在有效的耦合界面
    pub fn coupled(&self) -> bool {
        self.active_interfaces(self.bou_coeffs).next().is_some()
    }

    fn active_interfaces<'s>(
        &'s self,
        coeffs: &'s [Option<Vec<f64>>],
    ) -> impl Iterator<Item = (&'s Arc<dyn LduInterface>, &'s [f64])> + 's {
        self.interfaces
            .iter()
            .zip(coeffs)
            .filter_map(|(iface, c)| match (iface, c) {
                (Some(iface), Some(c)) => Some((iface, c.as_slice())),
                _ => None,
            })
    }

    /// 两阶段交换后对每个耦合面执行 `result[fc] += sign·coeff·ψ_nbr`
    fn update_interfaces(
        &self,
        coeffs: &[Option<Vec<f64>>],
        psi: &[f64],
        result: &mut [f64],
        sign: f64,
    ) -> MatrixResult<()> {
        if self.interfaces.is_empty() || coeffs.iter().all(Option::is_none) {
            return Ok(());
        }
        let n = self.interfaces.len().min(coeffs.len());
        let neighbours = exchange(&self.interfaces[..n], psi)?;
        for ((iface, c), nbr) in self.interfaces[..n].iter().zip(coeffs).zip(neighbours) {
            let (Some(iface), Some(c), Some(nbr)) = (iface, c, nbr) else {
                continue;
            };
            MatrixError::check_len("界面系数", iface.face_cells().len(), c.len())?;
            for ((&fc, &coeff), &v) in iface.face_cells().iter().zip(c).zip(&nbr) {
                result[fc] += sign * coeff * v;
            }
        }
        Ok(())
    }

    /// `result = A·x`，含耦合界面
    pub fn amul(&self, x: &[f64], result: &mut [f64]) -> MatrixResult<()> {
        self.matrix.amul(x, result)?;
        self.update_interfaces(self.bou_coeffs, x, result, -1.0)
    }

    /// `result = Aᵀ·x`，含耦合界面
    pub fn tmul(&self, x: &[f64], result: &mut [f64]) -> MatrixResult<()> {
        self.matrix.tmul(x, result)?;
        self.update_interfaces(self.int_coeffs, x, result, -1.0)
    }

    /// `r = b − A·x`
    pub fn residual(&self, x: &[f64], source: &[f64], r: &mut [f64]) -> MatrixResult<()> {
        MatrixError::check_len("residual source", self.n_cells(), source.len())?;
        self.amul(x, r)?;
        for (ri, &bi) in r.iter_mut().zip(source) {
            *ri = bi - *ri;
        }
        Ok(())
    }

    /// 加上耦合界面显式贡献后的右端项 `b + bouCoeffs·ψ_nbr`
    pub fn coupled_source(&self, x: &[f64], source: &[f64]) -> MatrixResult<Vec<f64>> {
        let mut b = source.to_vec();
        self.update_interfaces(self.bou_coeffs, x, &mut b, 1.0)?;
        Ok(b)
    }

    /// 行和，含耦合界面
    pub fn sum_a(&self) -> Vec<f64> {
        let mut sum = self.matrix.sum_a();
        for (iface, c) in self.active_interfaces(self.bou_coeffs) {
            for (&fc, &coeff) in iface.face_cells().iter().zip(c) {
                sum[fc] -= coeff;
            }
        }
        sum
    }

    /// 残差归一化因子
    ///
    /// `Σ(|A·ψ − Σ_A·ψ̄| + |b − Σ_A·ψ̄|) + 1e-20`，其中 ψ̄ 为全局平均，
    /// `a_psi` 为已计算的 `A·ψ`。
    pub fn norm_factor(&self, psi: &[f64], source: &[f64], a_psi: &[f64]) -> MatrixResult<f64> {
        let sum_a = self.sum_a();
        let x_ref = self.g_average(psi)?;
        let local: f64 = sum_a
            .iter()
            .zip(a_psi)
            .zip(source)
            .map(|((&sa, &ap), &b)| {
                let t = sa * x_ref;
                (ap - t).abs() + (b - t).abs()
            })
            .sum();
        Ok(self.comm.all_reduce_sum(local)? + RESIDUAL_SMALL)
    }

    /// 全局求和
    pub fn g_sum(&self, x: &[f64]) -> MatrixResult<f64> {
        Ok(self.comm.all_reduce_sum(x.iter().sum())?)
    }

    /// 全局绝对值和
    pub fn g_sum_mag(&self, x: &[f64]) -> MatrixResult<f64> {
        Ok(self.comm.all_reduce_sum(x.iter().map(|v| v.abs()).sum())?)
    }

    /// 全局内积
    pub fn g_sum_prod(&self, x: &[f64], y: &[f64]) -> MatrixResult<f64> {
        Ok(self.comm.all_reduce_sum(crate::vector_ops::dot(x, y))?)
    }

    /// 全局平均
    pub fn g_average(&self, x: &[f64]) -> MatrixResult<f64> {
        let n = self.comm.all_reduce_sum(x.len() as f64)?;
        let s = self.g_sum(x)?;
        Ok(if n > 0.0 { s / n } else { 0.0 })
    }
}
