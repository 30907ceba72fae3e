// apps/lf_cli/src/case.rs

//! 算例文件
//!
//! ```json
//! {
//!   "mesh": { "type": "line", "n": 20, "length": 1.0 },
//!   "field": "T",
//!   "diffusivity": 0.5,
//!   "source": 1.0,
//!   "boundary": {
//!     "left": { "type": "fixedValue", "value": 0.0 },
//!     "right": { "type": "zeroGradient" }
//!   },
//!   "solution": {
//!     "solvers": { "T": { "solver": "PCG", "preconditioner": "DIC", "tolerance": 1e-10 } }
//!   },
//!   "nProcs": 2
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use lf_config::FvSolution;
use lf_matrix::PatchFieldSpec;
use lf_mesh::generation::{LineMeshGenerator, RectMeshGenerator};
use lf_mesh::GeoMesh;
use serde::{Deserialize, Serialize};

/// 结构网格描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MeshSpec {
    /// 一维线网格，边界片 `left`/`right`
    Line {
        /// 单元数
        n: usize,
        /// 长度
        length: f64,
        /// 两端是否周期连接
        #[serde(default)]
        cyclic: bool,
    },
    /// 二维矩形网格，边界片 `left`/`right`/`bottom`/`top`
    Rect {
        /// x 方向单元数
        nx: usize,
        /// y 方向单元数
        ny: usize,
        /// x 方向长度
        lx: f64,
        /// y 方向长度
        ly: f64,
    },
}

impl MeshSpec {
    /// 生成网格
    pub fn build(&self) -> Result<GeoMesh> {
        let mesh = match *self {
            Self::Line { n, length, cyclic } => LineMeshGenerator::new(n, length).cyclic(cyclic).build(),
            Self::Rect { nx, ny, lx, ly } => RectMeshGenerator::new(nx, ny, lx, ly).build(),
        };
        mesh.context("生成网格失败")
    }
}

/// 稳态扩散算例：`−∇·(Γ∇ψ) + kψ = S`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseConfig {
    /// 网格
    pub mesh: MeshSpec,

    /// 场名，用于查找求解器与松弛因子
    #[serde(default = "default_field")]
    pub field: String,

    /// 扩散系数 Γ
    #[serde(default = "default_diffusivity")]
    pub diffusivity: f64,

    /// 均匀源项 S
    #[serde(default)]
    pub source: f64,

    /// 线性衰减系数 k
    #[serde(default)]
    pub decay: f64,

    /// 初始值
    #[serde(default)]
    pub initial: f64,

    /// 各边界片的边界条件，周期边界片无需给出
    #[serde(default)]
    pub boundary: BTreeMap<String, PatchFieldSpec>,

    /// 求解字典
    pub solution: FvSolution,

    /// 提供外迭代次数与参考值的算法控制块名
    #[serde(default = "default_algorithm")]
    pub algorithm: String,

    /// 分解的子域数
    #[serde(default = "default_n_procs")]
    pub n_procs: usize,
}

fn default_field() -> String { "T".to_string() }
fn default_diffusivity() -> f64 { 1.0 }
fn default_algorithm() -> String { "SIMPLE".to_string() }
fn default_n_procs() -> usize { 1 }

impl CaseConfig {
    /// 从 JSON 字符串解析并检查
    pub fn from_json_str(json: &str) -> Result<Self> {
        let case: CaseConfig = serde_json::from_str(json).context("算例 JSON 解析失败")?;
        case.check()?;
        Ok(case)
    }

    /// 从文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).with_context(|| format!("无法读取算例文件 {}", path.display()))?;
        Self::from_json_str(&content)
    }

    fn check(&self) -> Result<()> {
        if self.diffusivity.is_nan() || self.diffusivity <= 0.0 {
            bail!("扩散系数必须为正: {}", self.diffusivity);
        }
        if self.decay < 0.0 {
            bail!("衰减系数不能为负: {}", self.decay);
        }
        if self.n_procs == 0 {
            bail!("子域数必须为正");
        }
        self.solution.validate().context("求解字典无效")?;
        self.solution.solver_controls(&self.field).context("求解字典缺少求解器条目")?;
        Ok(())
    }

    /// 外迭代次数，缺少算法控制块时为 1
    pub fn n_outer_correctors(&self) -> usize {
        self.solution
            .algorithm(&self.algorithm)
            .map_or(1, |a| a.n_outer_correctors.max(1))
    }

    /// 初始残差收敛阈值
    pub fn residual_control(&self) -> Option<f64> {
        self.solution
            .algorithm(&self.algorithm)
            .and_then(|a| a.residual_control.get(&self.field).copied())
    }

    /// 全局参考单元与参考值
    pub fn reference(&self) -> Result<Option<(usize, f64)>> {
        match self.solution.algorithm(&self.algorithm) {
            Some(a) => Ok(a.reference(&self.field)?),
            None => Ok(None),
        }
    }
}
