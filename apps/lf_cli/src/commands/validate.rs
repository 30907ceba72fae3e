// apps/lf_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 验证求解字典与算例文件。结构与数值范围错误来自 `lf_config` 的验证；
//! 此外检查求解器、预条件器、光滑器名称是否为已知名称。

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use lf_config::{FvSolution, SolverControls};
use lf_matrix::{preconditioners, smoothers, SolverRegistry};
use tracing::{error, info, warn};

use crate::case::CaseConfig;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 求解字典路径
    #[arg(short, long)]
    pub solution: Option<PathBuf>,

    /// 算例文件路径
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== LduFlow 配置验证 ===");

    if args.solution.is_none() && args.case.is_none() {
        println!("用法: lf_cli validate --solution <求解字典>");
        println!("      lf_cli validate --case <算例文件>");
        return Ok(());
    }

    let mut result = ValidationResult::default();
    if let Some(path) = &args.solution {
        validate_solution_file(path, &mut result);
    }
    if let Some(path) = &args.case {
        validate_case_file(path, &mut result);
    }

    print_validation_result(&result, args.strict)
}

fn validate_solution_file(path: &Path, result: &mut ValidationResult) {
    println!("\n检查求解字典: {}", path.display());
    if !path.exists() {
        result.add_error(format!("文件不存在: {}", path.display()));
        return;
    }
    match FvSolution::from_file(path) {
        Ok(solution) => {
            println!("  ✓ 格式与数值范围有效");
            check_names(&solution, result);
        }
        Err(e) => result.add_error(e.to_string()),
    }
}

fn validate_case_file(path: &Path, result: &mut ValidationResult) {
    println!("\n检查算例文件: {}", path.display());
    if !path.exists() {
        result.add_error(format!("文件不存在: {}", path.display()));
        return;
    }
    let case = match CaseConfig::from_file(path) {
        Ok(case) => case,
        Err(e) => {
            result.add_error(format!("{:#}", e));
            return;
        }
    };
    println!("  ✓ 格式有效");
    check_names(&case.solution, result);

    match case.mesh.build() {
        Ok(mesh) => {
            println!("  ✓ 网格: {} 单元", mesh.n_cells());
            for patch in mesh.boundary().iter().filter(|p| !p.coupled()) {
                if !case.boundary.contains_key(&patch.name) {
                    result.add_error(format!("边界片 '{}' 未给出边界条件", patch.name));
                }
            }
            for name in case.boundary.keys() {
                if mesh.boundary().find_patch_id(name).is_none() {
                    result.add_warning(format!("边界条件 '{}' 没有对应的边界片", name));
                }
            }
            if let Ok(Some((cell, _))) = case.reference() {
                if cell >= mesh.n_cells() {
                    result.add_error(format!("参考单元 {} 超出单元数 {}", cell, mesh.n_cells()));
                }
            }
            if case.n_procs > mesh.n_cells() {
                result.add_warning(format!("子域数 {} 多于单元数 {}", case.n_procs, mesh.n_cells()));
            }
        }
        Err(e) => result.add_error(format!("{:#}", e)),
    }
}

/// 名称只能在选择时按矩阵对称性最终确定，这里只检查是否属于任一类别
fn check_names(solution: &FvSolution, result: &mut ValidationResult) {
    let registry = SolverRegistry::new();
    let known_solvers: Vec<&str> = registry.names(true).into_iter().chain(registry.names(false)).collect();

    for (key, controls) in &solution.solvers {
        if !known_solvers.contains(&controls.solver.as_str()) {
            result.add_error(format!(
                "solvers.{}: 未知求解器 '{}'，可选: {}",
                key,
                controls.solver,
                known_solvers.join(", ")
            ));
        }
        check_preconditioner(key, controls, result);
        check_smoother(key, controls, result);
        if controls.tolerance == 0.0 && controls.rel_tol == 0.0 {
            result.add_warning(format!("solvers.{}: 容差均为 0，将迭代到 maxIter", key));
        }
        if controls.min_iter > controls.max_iter {
            result.add_warning(format!(
                "solvers.{}: minIter {} 大于 maxIter {}",
                key, controls.min_iter, controls.max_iter
            ));
        }
    }

    for (key, &factor) in solution
        .relaxation_factors
        .fields
        .iter()
        .chain(&solution.relaxation_factors.equations)
    {
        if factor == 0.0 {
            result.add_warning(format!("relaxationFactors.{}: 松弛因子为 0，场不会更新", key));
        }
    }
}

fn check_preconditioner(key: &str, controls: &SolverControls, result: &mut ValidationResult) {
    let Some(name) = &controls.preconditioner else {
        return;
    };
    if !preconditioners::SYMMETRIC.contains(&name.as_str()) && !preconditioners::ASYMMETRIC.contains(&name.as_str()) {
        result.add_error(format!("solvers.{}: 未知预条件器 '{}'", key, name));
    } else if !preconditioners::ASYMMETRIC.contains(&name.as_str()) {
        result.add_warning(format!("solvers.{}: 预条件器 '{}' 只适用于对称矩阵", key, name));
    }
}

fn check_smoother(key: &str, controls: &SolverControls, result: &mut ValidationResult) {
    let Some(name) = &controls.smoother else {
        return;
    };
    if !smoothers::SYMMETRIC.contains(&name.as_str()) && !smoothers::ASYMMETRIC.contains(&name.as_str()) {
        result.add_error(format!("solvers.{}: 未知光滑器 '{}'", key, name));
    } else if !smoothers::ASYMMETRIC.contains(&name.as_str()) {
        result.add_warning(format!("solvers.{}: 光滑器 '{}' 只适用于对称矩阵", key, name));
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict { result.is_ok_strict() } else { result.is_ok() };
    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_names() {
        let solution = FvSolution::default()
            .with_solver("p", SolverControls::new("PCG").with_preconditioner("DIC"))
            .with_solver("U", SolverControls::new("smoothSolver").with_smoother("Jacobi"))
            .with_solver("T", SolverControls::new("CG"));
        let mut result = ValidationResult::default();
        check_names(&solution, &mut result);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().any(|e| e.contains("'Jacobi'")));
        assert!(result.errors.iter().any(|e| e.contains("'CG'")));
        // DIC 只适用于对称矩阵
        assert_eq!(result.warnings.len(), 1);
        assert!(!result.is_ok() && !result.is_ok_strict());
    }

    #[test]
    fn test_clean_solution() {
        let solution = FvSolution::default()
            .with_solver("p", SolverControls::new("GAMG").with_smoother("GaussSeidel"))
            .with_solver("U", SolverControls::new("PBiCGStab").with_preconditioner("DILU"));
        let mut result = ValidationResult::default();
        check_names(&solution, &mut result);
        assert!(result.is_ok_strict());
    }
}
