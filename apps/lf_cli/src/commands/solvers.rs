// apps/lf_cli/src/commands/solvers.rs

//! 求解器列表命令

use anyhow::Result;
use clap::Args;
use lf_matrix::{preconditioners, smoothers, SolverRegistry};
use serde::Serialize;

/// 求解器列表参数
#[derive(Args)]
pub struct SolversArgs {
    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 一个对称性类别下的可选名称
#[derive(Debug, Serialize)]
struct SymmetryClass<'a> {
    solvers: Vec<&'a str>,
    preconditioners: &'static [&'static str],
    smoothers: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    symmetric: SymmetryClass<'a>,
    asymmetric: SymmetryClass<'a>,
}

/// 执行求解器列表命令
pub fn execute(args: SolversArgs) -> Result<()> {
    let registry = SolverRegistry::new();
    let listing = Listing {
        symmetric: SymmetryClass {
            solvers: registry.names(true),
            preconditioners: preconditioners::SYMMETRIC,
            smoothers: smoothers::SYMMETRIC,
        },
        asymmetric: SymmetryClass {
            solvers: registry.names(false),
            preconditioners: preconditioners::ASYMMETRIC,
            smoothers: smoothers::ASYMMETRIC,
        },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for (title, class) in [("对称矩阵", &listing.symmetric), ("非对称矩阵", &listing.asymmetric)] {
        println!("=== {} ===", title);
        println!("求解器:   {}", class.solvers.join(", "));
        println!("预条件器: {}", class.preconditioners.join(", "));
        println!("光滑器:   {}", class.smoothers.join(", "));
        println!();
    }
    println!("对角矩阵总是直接求解，不受求解器名称影响。");
    Ok(())
}
