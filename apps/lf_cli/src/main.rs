// apps/lf_cli/src/main.rs

//! LduFlow 命令行界面
//!
//! 提供扩散算例求解、求解器列表与求解字典验证。
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 5: Application**，只组合下层 crate 的公开接口。

mod case;
mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

/// LduFlow 线性方程组装与求解命令行工具
#[derive(Parser)]
#[command(name = "lf_cli")]
#[command(author = "LduFlow Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LduFlow finite volume matrix assembly and solution", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 求解算例
    Solve(commands::solve::SolveArgs),
    /// 列出求解器、预条件器与光滑器
    Solvers(commands::solvers::SolversArgs),
    /// 验证求解字典
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // try_init 同时接管 log 门面，库 crate 的日志经此输出
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish()
        .try_init()?;

    match cli.command {
        Commands::Solve(args) => commands::solve::execute(args),
        Commands::Solvers(args) => commands::solvers::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}
