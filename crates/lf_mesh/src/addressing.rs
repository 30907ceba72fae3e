// crates/lf_mesh/src/addressing.rs

//! LDU 连接关系
//!
//! 每个内部面 `f` 连接一对单元 `(lower[f], upper[f])`，即 owner 与
//! neighbour。矩阵系数数组与内部面一一对应：
//!
//! - `upper[f]` 位于 owner 行、neighbour 列
//! - `lower[f]` 位于 neighbour 行、owner 列
//!
//! 不要求 owner < neighbour。按行遍历与三角分解所需的面排序在构造时
//! 一次性计算。
//!
//! # 使用示例
//!
//! ```rust
//! use lf_mesh::addressing::LduAddressing;
//!
//! // 0 - 1 - 2
//! let addr = LduAddressing::new(3, vec![0, 1], vec![1, 2]).unwrap();
//! assert_eq!(addr.n_faces(), 2);
//! assert!(addr.is_upper_triangular());
//! assert_eq!(addr.cell_faces(1).count(), 2);
//! ```

use std::collections::HashSet;

use crate::error::{MeshError, MeshResult};

/// LDU 连接关系
#[derive(Debug, Clone, PartialEq)]
pub struct LduAddressing {
    /// 单元数
    n_cells: usize,
    /// owner 单元（下三角地址）
    lower: Vec<usize>,
    /// neighbour 单元（上三角地址）
    upper: Vec<usize>,
    /// 按 owner 分组的面序
    owner_sort: Vec<usize>,
    /// owner_sort 中各单元的起始偏移，长度 n_cells + 1
    owner_start: Vec<usize>,
    /// 按 neighbour 分组的面序
    losort: Vec<usize>,
    /// losort 中各单元的起始偏移，长度 n_cells + 1
    losort_start: Vec<usize>,
    /// 按 (max, min) 单元排序的面序，用于前代
    forward_order: Vec<usize>,
    /// 按 (min, max) 单元排序的面序，逆序用于回代
    backward_order: Vec<usize>,
}

impl LduAddressing {
    /// 创建连接关系
    ///
    /// # 错误
    ///
    /// - `lower`/`upper` 长度不同
    /// - 单元索引越界
    /// - 面连接单元自身
    /// - 同一对单元出现多次
    pub fn new(n_cells: usize, lower: Vec<usize>, upper: Vec<usize>) -> MeshResult<Self> {
        MeshError::check_geometry("upper 地址", lower.len(), upper.len())?;

        let mut seen = HashSet::with_capacity(lower.len());
        for (f, (&o, &n)) in lower.iter().zip(&upper).enumerate() {
            if o >= n_cells || n >= n_cells {
                return Err(MeshError::addressing(
                    f,
                    format!("单元 ({}, {}) 超出单元数 {}", o, n, n_cells),
                ));
            }
            if o == n {
                return Err(MeshError::addressing(f, format!("面连接单元 {} 自身", o)));
            }
            if !seen.insert((o.min(n), o.max(n))) {
                return Err(MeshError::addressing(
                    f,
                    format!("单元对 ({}, {}) 重复", o, n),
                ));
            }
        }

        let (owner_sort, owner_start) = group_by(n_cells, &lower);
        let (losort, losort_start) = group_by(n_cells, &upper);

        let mut forward_order: Vec<usize> = (0..lower.len()).collect();
        forward_order.sort_by_key(|&f| (lower[f].max(upper[f]), lower[f].min(upper[f])));
        let mut backward_order: Vec<usize> = (0..lower.len()).collect();
        backward_order.sort_by_key(|&f| (lower[f].min(upper[f]), lower[f].max(upper[f])));

        Ok(Self {
            n_cells,
            lower,
            upper,
            owner_sort,
            owner_start,
            losort,
            losort_start,
            forward_order,
            backward_order,
        })
    }

    /// 无内部面的连接关系
    pub fn disconnected(n_cells: usize) -> Self {
        Self {
            n_cells,
            lower: Vec::new(),
            upper: Vec::new(),
            owner_sort: Vec::new(),
            owner_start: vec![0; n_cells + 1],
            losort: Vec::new(),
            losort_start: vec![0; n_cells + 1],
            forward_order: Vec::new(),
            backward_order: Vec::new(),
        }
    }

    /// 单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 内部面数
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.lower.len()
    }

    /// owner 数组
    #[inline]
    pub fn lower_addr(&self) -> &[usize] {
        &self.lower
    }

    /// neighbour 数组
    #[inline]
    pub fn upper_addr(&self) -> &[usize] {
        &self.upper
    }

    /// 按 owner 分组的面序
    #[inline]
    pub fn owner_sort(&self) -> &[usize] {
        &self.owner_sort
    }

    /// owner 分组偏移
    #[inline]
    pub fn owner_start(&self) -> &[usize] {
        &self.owner_start
    }

    /// 按 neighbour 分组的面序
    #[inline]
    pub fn losort(&self) -> &[usize] {
        &self.losort
    }

    /// neighbour 分组偏移
    #[inline]
    pub fn losort_start(&self) -> &[usize] {
        &self.losort_start
    }

    /// 单元作为 owner 的面
    #[inline]
    pub fn owned_faces(&self, cell: usize) -> &[usize] {
        &self.owner_sort[self.owner_start[cell]..self.owner_start[cell + 1]]
    }

    /// 单元作为 neighbour 的面
    #[inline]
    pub fn neighbour_faces(&self, cell: usize) -> &[usize] {
        &self.losort[self.losort_start[cell]..self.losort_start[cell + 1]]
    }

    /// 与单元相邻的全部内部面
    pub fn cell_faces(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.owned_faces(cell)
            .iter()
            .chain(self.neighbour_faces(cell))
            .copied()
    }

    /// 前代面序：按较大单元号升序
    ///
    /// 处理面 `f` 时，较小单元上的所有前代贡献已经完成。
    #[inline]
    pub fn forward_order(&self) -> &[usize] {
        &self.forward_order
    }

    /// 回代面序：按较小单元号升序，逆序遍历
    #[inline]
    pub fn backward_order(&self) -> &[usize] {
        &self.backward_order
    }

    /// 是否所有面满足 owner < neighbour
    pub fn is_upper_triangular(&self) -> bool {
        self.lower.iter().zip(&self.upper).all(|(o, n)| o < n)
    }

    /// 检查向量长度与单元数一致
    pub fn check_cells(&self, what: &'static str, len: usize) -> MeshResult<()> {
        MeshError::check_geometry(what, self.n_cells, len)
    }

    /// 检查向量长度与内部面数一致
    pub fn check_faces(&self, what: &'static str, len: usize) -> MeshResult<()> {
        MeshError::check_geometry(what, self.n_faces(), len)
    }
}

/// 计数排序分组，保持面原始相对顺序
fn group_by(n_cells: usize, cells: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let mut start = vec![0usize; n_cells + 1];
    for &c in cells {
        start[c + 1] += 1;
    }
    for i in 0..n_cells {
        start[i + 1] += start[i];
    }
    let mut cursor = start.clone();
    let mut order = vec![0usize; cells.len()];
    for (f, &c) in cells.iter().enumerate() {
        order[cursor[c]] = f;
        cursor[c] += 1;
    }
    (order, start)
}
