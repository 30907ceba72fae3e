// crates/lf_mesh/src/patch.rs

//! 边界片
//!
//! 边界面按边界片分组。每个边界片是一段连续的边界面编号，
//! 起始偏移单调递增，第一个边界片紧接在内部面之后。
//!
//! 耦合边界片（周期、处理器）的 `delta_coeffs` 与 `weights` 描述的是
//! 单元中心到耦合邻居中心的距离和本侧插值权重；普通边界片描述的是
//! 单元中心到面中心的距离，权重恒为 1。

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, MeshResult};

/// 边界片类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PatchKind {
    /// 普通边界
    Patch,
    /// 固壁
    Wall,
    /// 周期边界，与同一网格中的另一边界片逐面配对
    Cyclic {
        /// 配对边界片索引
        neighbour_patch: usize,
    },
    /// 处理器边界，与相邻 rank 上的对应边界片逐面配对
    Processor {
        /// 本进程号
        my_rank: usize,
        /// 相邻进程号
        neighb_rank: usize,
    },
}

impl PatchKind {
    /// 是否为耦合边界
    #[inline]
    pub fn coupled(&self) -> bool {
        matches!(self, Self::Cyclic { .. } | Self::Processor { .. })
    }

    /// 类型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Wall => "wall",
            Self::Cyclic { .. } => "cyclic",
            Self::Processor { .. } => "processor",
        }
    }
}

/// 边界片
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// 名称
    pub name: String,
    /// 类型
    pub kind: PatchKind,
    /// 首个边界面的全局面编号
    pub start: usize,
    /// 边界面相邻单元
    pub face_cells: Vec<usize>,
    /// 面积（面网格为边长）
    pub mag_sf: Vec<f64>,
    /// 距离系数 1/|d|
    pub delta_coeffs: Vec<f64>,
    /// 本侧插值权重
    pub weights: Vec<f64>,
}

impl Patch {
    /// 创建非耦合边界片，权重为 1
    pub fn new(
        name: impl Into<String>,
        kind: PatchKind,
        face_cells: Vec<usize>,
        mag_sf: Vec<f64>,
        delta_coeffs: Vec<f64>,
    ) -> Self {
        let weights = vec![1.0; face_cells.len()];
        Self {
            name: name.into(),
            kind,
            start: 0,
            face_cells,
            mag_sf,
            delta_coeffs,
            weights,
        }
    }

    /// 设置插值权重
    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }

    /// 面数
    #[inline]
    pub fn size(&self) -> usize {
        self.face_cells.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.face_cells.is_empty()
    }

    /// 是否耦合
    #[inline]
    pub fn coupled(&self) -> bool {
        self.kind.coupled()
    }

    fn validate(&self, n_cells: usize) -> MeshResult<()> {
        let n = self.size();
        for (what, len) in [
            ("magSf", self.mag_sf.len()),
            ("deltaCoeffs", self.delta_coeffs.len()),
            ("weights", self.weights.len()),
        ] {
            if len != n {
                return Err(MeshError::patch(
                    &self.name,
                    format!("{} 长度 {} 与面数 {} 不一致", what, len, n),
                ));
            }
        }
        if let Some(&c) = self.face_cells.iter().find(|&&c| c >= n_cells) {
            return Err(MeshError::patch(
                &self.name,
                format!("面相邻单元 {} 超出单元数 {}", c, n_cells),
            ));
        }
        Ok(())
    }
}

/// 有序边界片集合
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryMesh {
    patches: Vec<Patch>,
}

impl BoundaryMesh {
    /// 创建边界网格，依次为边界片分配起始面编号
    ///
    /// 第一个边界片从 `n_internal_faces` 开始，其后每个边界片紧接前一个。
    pub fn new(patches: Vec<Patch>, n_cells: usize, n_internal_faces: usize) -> MeshResult<Self> {
        let mut patches = patches;
        let mut start = n_internal_faces;
        for patch in &mut patches {
            patch.validate(n_cells)?;
            patch.start = start;
            start += patch.size();
        }
        let boundary = Self { patches };
        boundary.validate_pairs()?;
        Ok(boundary)
    }

    fn validate_pairs(&self) -> MeshResult<()> {
        for (i, patch) in self.patches.iter().enumerate() {
            if let PatchKind::Cyclic { neighbour_patch } = patch.kind {
                let nbr = self.patches.get(neighbour_patch).ok_or_else(|| {
                    MeshError::patch(&patch.name, format!("配对边界片 {} 不存在", neighbour_patch))
                })?;
                if nbr.kind != (PatchKind::Cyclic { neighbour_patch: i }) {
                    return Err(MeshError::patch(
                        &patch.name,
                        format!("配对边界片 '{}' 未反向配对", nbr.name),
                    ));
                }
                if nbr.size() != patch.size() {
                    return Err(MeshError::patch(
                        &patch.name,
                        format!("与 '{}' 面数不一致", nbr.name),
                    ));
                }
            }
        }
        Ok(())
    }

    /// 边界片数
    #[inline]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// 是否无边界片
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// 全部边界片
    #[inline]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// 按索引取边界片
    #[inline]
    pub fn patch(&self, index: usize) -> Option<&Patch> {
        self.patches.get(index)
    }

    /// 迭代边界片
    pub fn iter(&self) -> std::slice::Iter<'_, Patch> {
        self.patches.iter()
    }

    /// 按名称查找边界片索引
    pub fn find_patch_id(&self, name: &str) -> Option<usize> {
        self.patches.iter().position(|p| p.name == name)
    }

    /// 边界面总数
    pub fn n_faces(&self) -> usize {
        self.patches.iter().map(Patch::size).sum()
    }
}

impl std::ops::Index<usize> for BoundaryMesh {
    type Output = Patch;

    fn index(&self, index: usize) -> &Patch {
        &self.patches[index]
    }
}
