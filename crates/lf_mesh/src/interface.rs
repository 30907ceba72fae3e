// crates/lf_mesh/src/interface.rs

//! 耦合界面
//!
//! 耦合边界片上，矩阵行通过界面系数与"另一侧"的单元值耦合。
//! 另一侧的值在每次矩阵-向量乘之前交换，分两个阶段：
//!
//! 1. [`LduInterface::init_transfer`]: 所有界面发送本侧面相邻单元值
//! 2. [`LduInterface::transfer`]: 所有界面接收另一侧的值
//!
//! 调用方必须先对全部界面执行阶段 1，再对全部界面执行阶段 2，
//! 否则多个处理器界面之间可能死锁。

use std::fmt::Debug;
use std::sync::Arc;

use lf_foundation::{Communicator, LfResult};

/// 耦合界面 trait
pub trait LduInterface: Debug + Send + Sync {
    /// 对应的边界片索引
    fn patch_index(&self) -> usize;

    /// 面相邻单元
    fn face_cells(&self) -> &[usize];

    /// 阶段 1: 发送本侧面相邻单元的值
    fn init_transfer(&self, psi_internal: &[f64]) -> LfResult<()>;

    /// 阶段 2: 返回另一侧逐面对应的单元值
    fn transfer(&self, psi_internal: &[f64]) -> LfResult<Vec<f64>>;

    /// 另一侧的进程号，进程内界面返回 `None`
    fn neighb_rank(&self) -> Option<usize> {
        None
    }
}

/// 提取面相邻单元的值
#[inline]
pub fn patch_internal_field(face_cells: &[usize], psi_internal: &[f64]) -> Vec<f64> {
    face_cells.iter().map(|&c| psi_internal[c]).collect()
}

/// 周期界面：配对边界片位于同一进程
#[derive(Debug, Clone)]
pub struct CyclicInterface {
    patch_index: usize,
    face_cells: Vec<usize>,
    neighbour_face_cells: Vec<usize>,
}

impl CyclicInterface {
    /// 创建周期界面
    pub fn new(patch_index: usize, face_cells: Vec<usize>, neighbour_face_cells: Vec<usize>) -> Self {
        Self {
            patch_index,
            face_cells,
            neighbour_face_cells,
        }
    }
}

impl LduInterface for CyclicInterface {
    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn face_cells(&self) -> &[usize] {
        &self.face_cells
    }

    fn init_transfer(&self, _psi_internal: &[f64]) -> LfResult<()> {
        Ok(())
    }

    fn transfer(&self, psi_internal: &[f64]) -> LfResult<Vec<f64>> {
        Ok(patch_internal_field(&self.neighbour_face_cells, psi_internal))
    }
}

/// 处理器界面：配对边界片位于相邻 rank
///
/// 两侧边界片的面按相同的全局面顺序排列，因此交换的数组逐面对应。
#[derive(Debug, Clone)]
pub struct ProcessorInterface {
    patch_index: usize,
    face_cells: Vec<usize>,
    neighb_rank: usize,
    comm: Arc<dyn Communicator>,
}

impl ProcessorInterface {
    /// 创建处理器界面
    pub fn new(
        patch_index: usize,
        face_cells: Vec<usize>,
        neighb_rank: usize,
        comm: Arc<dyn Communicator>,
    ) -> Self {
        Self {
            patch_index,
            face_cells,
            neighb_rank,
            comm,
        }
    }
}

impl LduInterface for ProcessorInterface {
    fn patch_index(&self) -> usize {
        self.patch_index
    }

    fn face_cells(&self) -> &[usize] {
        &self.face_cells
    }

    fn init_transfer(&self, psi_internal: &[f64]) -> LfResult<()> {
        self.comm
            .send(self.neighb_rank, patch_internal_field(&self.face_cells, psi_internal))
    }

    fn transfer(&self, _psi_internal: &[f64]) -> LfResult<Vec<f64>> {
        let values = self.comm.recv(self.neighb_rank)?;
        lf_foundation::LfError::check_size("处理器界面数据", self.face_cells.len(), values.len())?;
        Ok(values)
    }

    fn neighb_rank(&self) -> Option<usize> {
        Some(self.neighb_rank)
    }
}

/// 对一组界面执行两阶段交换，返回每个边界片的另一侧值（非耦合为 `None`）
pub fn exchange(
    interfaces: &[Option<Arc<dyn LduInterface>>],
    psi_internal: &[f64],
) -> LfResult<Vec<Option<Vec<f64>>>> {
    for iface in interfaces.iter().flatten() {
        iface.init_transfer(psi_internal)?;
    }
    interfaces
        .iter()
        .map(|iface| match iface {
            Some(iface) => iface.transfer(psi_internal).map(Some),
            None => Ok(None),
        })
        .collect()
}
