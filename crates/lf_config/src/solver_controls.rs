// crates/lf_config/src/solver_controls.rs

//! 线性求解器控制参数
//!
//! 键名与经典求解字典一致（camelCase）：
//!
//! ```json
//! { "solver": "GAMG", "smoother": "GaussSeidel", "tolerance": 1e-7,
//!   "relTol": 0.01, "nPreSweeps": 0, "nPostSweeps": 2 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// 单个场的线性求解器控制参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverControls {
    /// 求解器名称，如 `PCG`、`PBiCGStab`、`smoothSolver`、`GAMG`
    pub solver: String,

    /// 预条件器名称，如 `DIC`、`DILU`、`diagonal`、`none`
    #[serde(default)]
    pub preconditioner: Option<String>,

    /// 光滑器名称，如 `GaussSeidel`、`symGaussSeidel`、`DIC`、`DILU`
    #[serde(default)]
    pub smoother: Option<String>,

    /// 绝对容差
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// 相对容差
    #[serde(default)]
    pub rel_tol: f64,

    /// 最大迭代次数
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// 最小迭代次数
    #[serde(default)]
    pub min_iter: usize,

    /// smoothSolver 每次迭代的光滑次数
    #[serde(default = "default_n_sweeps")]
    pub n_sweeps: usize,

    /// GAMG 限制前光滑次数
    #[serde(default)]
    pub n_pre_sweeps: usize,

    /// GAMG 延拓后光滑次数
    #[serde(default = "default_n_post_sweeps")]
    pub n_post_sweeps: usize,

    /// GAMG 最粗层目标单元数
    #[serde(default = "default_n_cells_in_coarsest_level")]
    pub n_cells_in_coarsest_level: usize,

    /// 逐次迭代输出残差
    #[serde(default)]
    pub verbose: bool,
}

fn default_tolerance() -> f64 { 1e-6 }
fn default_max_iter() -> usize { 1000 }
fn default_n_sweeps() -> usize { 1 }
fn default_n_post_sweeps() -> usize { 2 }
fn default_n_cells_in_coarsest_level() -> usize { 10 }

impl SolverControls {
    /// 以默认参数创建指定求解器的控制参数
    pub fn new(solver: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            preconditioner: None,
            smoother: None,
            tolerance: default_tolerance(),
            rel_tol: 0.0,
            max_iter: default_max_iter(),
            min_iter: 0,
            n_sweeps: default_n_sweeps(),
            n_pre_sweeps: 0,
            n_post_sweeps: default_n_post_sweeps(),
            n_cells_in_coarsest_level: default_n_cells_in_coarsest_level(),
            verbose: false,
        }
    }

    /// 设置预条件器
    pub fn with_preconditioner(mut self, name: impl Into<String>) -> Self {
        self.preconditioner = Some(name.into());
        self
    }

    /// 设置光滑器
    pub fn with_smoother(mut self, name: impl Into<String>) -> Self {
        self.smoother = Some(name.into());
        self
    }

    /// 设置容差
    pub fn with_tolerance(mut self, tolerance: f64, rel_tol: f64) -> Self {
        self.tolerance = tolerance;
        self.rel_tol = rel_tol;
        self
    }

    /// 设置最大迭代次数
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// 设置最小迭代次数
    pub fn with_min_iter(mut self, min_iter: usize) -> Self {
        self.min_iter = min_iter;
        self
    }

    /// 预条件器名称，未指定时为 `none`
    pub fn preconditioner_name(&self) -> &str {
        self.preconditioner.as_deref().unwrap_or("none")
    }

    /// 光滑器名称，未指定时为 `GaussSeidel`
    pub fn smoother_name(&self) -> &str {
        self.smoother.as_deref().unwrap_or("GaussSeidel")
    }

    /// 验证参数，`key` 用于错误信息中的路径前缀
    pub fn validate(&self, key: &str) -> ConfigResult<()> {
        if self.solver.trim().is_empty() {
            return Err(ConfigError::invalid(format!("{}.solver", key), "\"\"", "求解器名称不能为空"));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(ConfigError::invalid(
                format!("{}.tolerance", key),
                self.tolerance,
                "容差不能为负",
            ));
        }
        if !(0.0..1.0).contains(&self.rel_tol) {
            return Err(ConfigError::invalid(
                format!("{}.relTol", key),
                self.rel_tol,
                "相对容差必须在 [0, 1) 范围内",
            ));
        }
        if self.max_iter == 0 {
            return Err(ConfigError::invalid(format!("{}.maxIter", key), 0, "最大迭代次数必须为正"));
        }
        if self.n_cells_in_coarsest_level == 0 {
            return Err(ConfigError::invalid(
                format!("{}.nCellsInCoarsestLevel", key),
                0,
                "最粗层单元数必须为正",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let c: SolverControls = serde_json::from_str(r#"{ "solver": "PCG" }"#).unwrap();
        assert_eq!(c.tolerance, 1e-6);
        assert_eq!(c.rel_tol, 0.0);
        assert_eq!(c.max_iter, 1000);
        assert_eq!(c.min_iter, 0);
        assert_eq!(c.n_sweeps, 1);
        assert_eq!(c.n_pre_sweeps, 0);
        assert_eq!(c.n_post_sweeps, 2);
        assert_eq!(c.n_cells_in_coarsest_level, 10);
        assert_eq!(c.preconditioner_name(), "none");
        assert_eq!(c, SolverControls::new("PCG"));
    }

    #[test]
    fn test_camel_case_keys() {
        let c: SolverControls = serde_json::from_str(
            r#"{ "solver": "GAMG", "smoother": "DIC", "relTol": 0.05, "maxIter": 20, "nCellsInCoarsestLevel": 4 }"#,
        )
        .unwrap();
        assert_eq!(c.rel_tol, 0.05);
        assert_eq!(c.max_iter, 20);
        assert_eq!(c.smoother_name(), "DIC");
        assert_eq!(c.n_cells_in_coarsest_level, 4);
    }

    #[test]
    fn test_validate() {
        assert!(SolverControls::new("PCG").validate("p").is_ok());
        assert!(SolverControls::new("PCG").with_tolerance(-1.0, 0.0).validate("p").is_err());
        assert!(SolverControls::new("PCG").with_tolerance(1e-6, 1.0).validate("p").is_err());
        assert!(SolverControls::new("PCG").with_max_iter(0).validate("p").is_err());
    }
}
