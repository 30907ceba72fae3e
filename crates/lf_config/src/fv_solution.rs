// crates/lf_config/src/fv_solution.rs

//! 求解字典
//!
//! 包含三部分：
//!
//! - `solvers`: 场名到 [`SolverControls`] 的映射。键可以是精确场名，
//!   也可以是选择模式，如 `"(U|k|epsilon)"`、`"p|pFinal"`、`"(U|k)Final"`
//! - `relaxationFactors`: 场松弛因子（`fields`）与方程松弛因子（`equations`）
//! - 算法控制块：任意名称（`SIMPLE`、`PISO`、`PIMPLE` ...），
//!   携带非正交修正次数与参考值（`pRefCell`/`pRefValue`）
//!
//! 查找顺序：先精确键，再按键序匹配选择模式。

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::solver_controls::SolverControls;

/// 松弛因子
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelaxationFactors {
    /// 场松弛因子（显式松弛场值）
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,

    /// 方程松弛因子（隐式松弛矩阵）
    #[serde(default)]
    pub equations: BTreeMap<String, f64>,
}

impl RelaxationFactors {
    /// 场松弛因子
    pub fn field_factor(&self, name: &str) -> Option<f64> {
        lookup(&self.fields, name).copied()
    }

    /// 方程松弛因子
    pub fn equation_factor(&self, name: &str) -> Option<f64> {
        lookup(&self.equations, name).copied()
    }
}

/// 算法控制块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmControls {
    /// 非正交修正次数
    #[serde(default)]
    pub n_non_orthogonal_correctors: usize,

    /// 外迭代次数
    #[serde(default = "default_n_outer_correctors")]
    pub n_outer_correctors: usize,

    /// 各场初始残差收敛阈值
    #[serde(default)]
    pub residual_control: BTreeMap<String, f64>,

    /// 其余条目，包括 `<field>RefCell` / `<field>RefValue`
    #[serde(flatten)]
    pub entries: BTreeMap<String, serde_json::Value>,
}

fn default_n_outer_correctors() -> usize { 1 }

impl AlgorithmControls {
    /// 场的参考单元与参考值
    ///
    /// 读取 `<field>RefCell` 与 `<field>RefValue`（缺省 0）。
    /// 未给出参考单元时返回 `Ok(None)`。
    pub fn reference(&self, field: &str) -> ConfigResult<Option<(usize, f64)>> {
        let cell_key = format!("{}RefCell", field);
        let value_key = format!("{}RefValue", field);
        let Some(cell) = self.entries.get(&cell_key) else {
            return Ok(None);
        };
        let cell = cell
            .as_u64()
            .ok_or_else(|| ConfigError::invalid(&cell_key, cell, "参考单元必须为非负整数"))?;
        let value = match self.entries.get(&value_key) {
            Some(v) => v
                .as_f64()
                .ok_or_else(|| ConfigError::invalid(&value_key, v, "参考值必须为数值"))?,
            None => 0.0,
        };
        Ok(Some((cell as usize, value)))
    }
}

/// 求解字典
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FvSolution {
    /// 求解器表
    #[serde(default)]
    pub solvers: BTreeMap<String, SolverControls>,

    /// 松弛因子
    #[serde(default)]
    pub relaxation_factors: RelaxationFactors,

    /// 算法控制块
    #[serde(flatten)]
    pub algorithms: BTreeMap<String, AlgorithmControls>,
}

impl FvSolution {
    /// 从 JSON 字符串解析并验证
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let solution: FvSolution = serde_json::from_str(json)?;
        solution.validate()?;
        Ok(solution)
    }

    /// 从文件加载并验证
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        log::debug!("读取求解字典 {}", path.as_ref().display());
        Self::from_json_str(&content)
    }

    /// 添加或替换求解器条目
    pub fn with_solver(mut self, key: impl Into<String>, controls: SolverControls) -> Self {
        self.solvers.insert(key.into(), controls);
        self
    }

    /// 查找场的求解器控制参数
    pub fn solver_controls(&self, name: &str) -> ConfigResult<&SolverControls> {
        lookup(&self.solvers, name)
            .ok_or_else(|| ConfigError::Missing(format!("solvers.{}", name)))
    }

    /// 查找最终修正步的控制参数：先 `<name>Final`，再 `<name>`
    pub fn solver_controls_final(&self, name: &str) -> ConfigResult<&SolverControls> {
        let final_name = format!("{}Final", name);
        match lookup(&self.solvers, &final_name) {
            Some(c) => Ok(c),
            None => self.solver_controls(name),
        }
    }

    /// 算法控制块
    pub fn algorithm(&self, name: &str) -> Option<&AlgorithmControls> {
        self.algorithms.get(name)
    }

    /// 验证全部条目
    pub fn validate(&self) -> ConfigResult<()> {
        for (key, controls) in &self.solvers {
            controls.validate(&format!("solvers.{}", key))?;
        }
        let factors = [
            ("fields", &self.relaxation_factors.fields),
            ("equations", &self.relaxation_factors.equations),
        ];
        for (group, map) in factors {
            for (key, &factor) in map {
                if !(0.0..=1.0).contains(&factor) {
                    return Err(ConfigError::invalid(
                        format!("relaxationFactors.{}.{}", group, key),
                        factor,
                        "松弛因子必须在 [0, 1] 范围内",
                    ));
                }
            }
        }
        for (name, algo) in &self.algorithms {
            for key in algo.entries.keys().filter(|k| k.ends_with("RefCell")) {
                let field = key.trim_end_matches("RefCell");
                algo.reference(field)
                    .map_err(|e| ConfigError::invalid(format!("{}.{}", name, key), "", e.to_string()))?;
            }
        }
        Ok(())
    }
}

/// 先精确匹配，再按键序匹配选择模式
fn lookup<'a, V>(map: &'a BTreeMap<String, V>, name: &str) -> Option<&'a V> {
    if let Some(v) = map.get(name) {
        return Some(v);
    }
    map.iter()
        .filter(|(k, _)| k.contains('|') || k.contains('('))
        .find(|(k, _)| expand_pattern(k).iter().any(|alt| alt == name))
        .map(|(_, v)| v)
}

/// 展开选择模式为全部候选名
///
/// `"(U|k)Final"` 展开为 `["UFinal", "kFinal"]`，`"p|pFinal"` 展开为
/// `["p", "pFinal"]`。支持嵌套括号。
pub fn expand_pattern(pattern: &str) -> Vec<String> {
    let pattern = pattern.trim_matches('"');
    let bytes = pattern.as_bytes();

    // 顶层 '|'
    let mut depth = 0i32;
    let mut splits = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b'|' if depth == 0 => splits.push(i),
            _ => {}
        }
    }
    if !splits.is_empty() {
        let mut out = Vec::new();
        let mut begin = 0;
        for s in splits.into_iter().chain(std::iter::once(pattern.len())) {
            out.extend(expand_pattern(&pattern[begin..s]));
            begin = s + 1;
        }
        return out;
    }

    // 第一组括号
    let Some(open) = pattern.find('(') else {
        return vec![pattern.to_string()];
    };
    let mut depth = 0i32;
    let mut close = None;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    expand_pattern(&pattern[open + 1..close])
        .into_iter()
        .flat_map(|alt| expand_pattern(&format!("{}{}{}", prefix, alt, suffix)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_pattern() {
        assert_eq!(expand_pattern("p"), vec!["p"]);
        assert_eq!(expand_pattern("p|pFinal"), vec!["p", "pFinal"]);
        assert_eq!(expand_pattern("(U|k)Final"), vec!["UFinal", "kFinal"]);
        assert_eq!(expand_pattern("\"(U|k|epsilon)\""), vec!["U", "k", "epsilon"]);
        assert_eq!(expand_pattern("(U|(k|e)x)"), vec!["U", "kx", "ex"]);
    }

    #[test]
    fn test_lookup_order() {
        let sol = FvSolution::default()
            .with_solver("(p|U)", SolverControls::new("smoothSolver"))
            .with_solver("p", SolverControls::new("PCG"));
        assert_eq!(sol.solver_controls("p").unwrap().solver, "PCG");
        assert_eq!(sol.solver_controls("U").unwrap().solver, "smoothSolver");
        assert!(matches!(sol.solver_controls("T"), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_final_lookup() {
        let sol = FvSolution::default()
            .with_solver("p", SolverControls::new("GAMG"))
            .with_solver("pFinal", SolverControls::new("PCG"));
        assert_eq!(sol.solver_controls_final("p").unwrap().solver, "PCG");
        assert!(sol.solver_controls_final("U").is_err());
        let sol = FvSolution::default().with_solver("U", SolverControls::new("PBiCG"));
        assert_eq!(sol.solver_controls_final("U").unwrap().solver, "PBiCG");
    }

    #[test]
    fn test_algorithm_reference() {
        let json = r#"{
            "solvers": { "p": { "solver": "PCG" } },
            "PISO": { "nNonOrthogonalCorrectors": 2, "pRefCell": 3, "pRefValue": 1.5 },
            "SIMPLE": { "TRefCell": 0 }
        }"#;
        let sol = FvSolution::from_json_str(json).unwrap();
        let piso = sol.algorithm("PISO").unwrap();
        assert_eq!(piso.n_non_orthogonal_correctors, 2);
        assert_eq!(piso.n_outer_correctors, 1);
        assert_eq!(piso.reference("p").unwrap(), Some((3, 1.5)));
        assert_eq!(piso.reference("U").unwrap(), None);
        assert_eq!(sol.algorithm("SIMPLE").unwrap().reference("T").unwrap(), Some((0, 0.0)));
    }

    #[test]
    fn test_validate_relaxation_range() {
        let json = r#"{ "relaxationFactors": { "fields": { "p": 1.2 } } }"#;
        assert!(matches!(
            FvSolution::from_json_str(json),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_bad_reference() {
        let json = r#"{ "SIMPLE": { "pRefCell": -1 } }"#;
        assert!(FvSolution::from_json_str(json).is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(FvSolution::from_json_str("{"), Err(ConfigError::Parse(_))));
    }
}
