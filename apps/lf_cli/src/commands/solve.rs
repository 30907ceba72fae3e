// apps/lf_cli/src/commands/solve.rs

//! 求解命令
//!
//! 读取算例，组装 `−∇·(Γ∇ψ) + kψ = S` 并做外迭代：每次迭代先保存上一
//! 迭代值，施加方程松弛与参考值后求解，再做场松弛。最后一次外迭代使用
//! `<field>Final` 求解器条目（若存在）。`nProcs > 1` 时按单元中心几何
//! 分区，每个子域在自己的线程中求解，结束后重构全局解。

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use lf_decompose::{decompose, simple_partition, FieldReconstructor};
use lf_foundation::{DimensionSet, DimensionedScalar, ThreadComm};
use lf_matrix::field::VolScalarField;
use lf_matrix::{fvm, SolverPerformance};
use lf_mesh::GeoMesh;
use serde::Serialize;
use tracing::info;

use crate::case::CaseConfig;

/// 求解参数
#[derive(Args)]
pub struct SolveArgs {
    /// 算例文件路径
    #[arg(short, long)]
    pub case: PathBuf,

    /// 结果输出文件，缺省时打印到标准输出
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 覆盖算例中的子域数
    #[arg(long)]
    pub procs: Option<usize>,
}

/// 求解结果
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    /// 场名
    pub field: String,
    /// 子域数
    pub n_procs: usize,
    /// 每次外迭代的求解记录
    pub performance: Vec<SolverPerformance<f64>>,
    /// 单元值
    pub values: Vec<f64>,
}

/// 执行求解命令
pub fn execute(args: SolveArgs) -> Result<()> {
    info!("=== LduFlow 求解 ===");
    let mut case = CaseConfig::from_file(&args.case)?;
    if let Some(procs) = args.procs {
        case.n_procs = procs.max(1);
    }

    let start = Instant::now();
    let report = run_case(&case)?;
    info!(
        "完成: {} 次外迭代, 用时 {:.3} s",
        report.performance.len(),
        start.elapsed().as_secs_f64()
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("无法写入 {}", path.display()))?;
            info!("结果已写入 {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// 求解算例
pub fn run_case(case: &CaseConfig) -> Result<SolveReport> {
    let mesh = case.mesh.build()?;
    info!(
        "网格: {} 单元, {} 内部面, {} 边界片",
        mesh.n_cells(),
        mesh.n_internal_faces(),
        mesh.boundary().len()
    );
    let reference = case.reference()?;
    if let Some((cell, _)) = reference {
        if cell >= mesh.n_cells() {
            return Err(anyhow!("参考单元 {} 超出单元数 {}", cell, mesh.n_cells()));
        }
    }

    if case.n_procs == 1 {
        let (cell, value) = reference.map_or((None, 0.0), |(c, v)| (Some(c), v));
        let (values, performance) = solve_local(Arc::new(mesh), case, cell, value)?;
        return Ok(SolveReport {
            field: case.field.clone(),
            n_procs: 1,
            performance,
            values,
        });
    }

    let n_procs = case.n_procs;
    let domains = decompose(&mesh, &simple_partition(&mesh, n_procs), n_procs)?;
    let comms = ThreadComm::create(n_procs);
    let results: Vec<Result<(Vec<f64>, Vec<SolverPerformance<f64>>)>> = thread::scope(|s| {
        let handles: Vec<_> = domains
            .iter()
            .zip(comms)
            .map(|(domain, comm)| {
                // 参考单元只在持有它的 rank 上给出
                let (cell, value) = reference.map_or((None, 0.0), |(c, v)| {
                    (domain.cell_addressing().binary_search(&c).ok(), v)
                });
                s.spawn(move || -> Result<_> {
                    let local = Arc::new(domain.build_mesh(Arc::new(comm))?);
                    solve_local(local, case, cell, value)
                })
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, h)| h.join().unwrap_or_else(|_| Err(anyhow!("rank {} 线程异常退出", rank))))
            .collect()
    });

    let mut parts = Vec::with_capacity(n_procs);
    let mut performance = Vec::new();
    for (rank, result) in results.into_iter().enumerate() {
        let (values, perf) = result.with_context(|| format!("rank {} 求解失败", rank))?;
        if rank == 0 {
            performance = perf;
        }
        parts.push(values);
    }
    let values = FieldReconstructor::new(&mesh, &domains).reconstruct_cells(&parts)?;
    Ok(SolveReport {
        field: case.field.clone(),
        n_procs,
        performance,
        values,
    })
}

/// 在本地网格上做外迭代；并行时每个 rank 以相同顺序调用
fn solve_local(
    mesh: Arc<GeoMesh>,
    case: &CaseConfig,
    ref_cell: Option<usize>,
    ref_value: f64,
) -> Result<(Vec<f64>, Vec<SolverPerformance<f64>>)> {
    let n_cells = mesh.n_cells();
    let mut psi = VolScalarField::uniform(&case.field, DimensionSet::DIMLESS, mesh, case.initial, &case.boundary)?;
    let gamma = DimensionedScalar::new("gamma", DimensionSet::DIFFUSIVITY, case.diffusivity);
    let decay = DimensionedScalar::new("k", DimensionSet::TIME.pow(-1), case.decay);
    let source = vec![case.source; n_cells];
    let source_dims = DimensionSet::DIMLESS / DimensionSet::TIME;

    let n_outer = case.n_outer_correctors();
    let threshold = case.residual_control();
    let solution = &case.solution;
    let mut performance = Vec::with_capacity(n_outer);

    for outer in 0..n_outer {
        psi.store_prev_iter();

        let mut eqn = fvm::laplacian(&gamma, &psi)?;
        eqn.try_negate()?;
        if case.decay > 0.0 {
            eqn.try_add(&fvm::sp_uniform(&decay, &psi)?)?;
        }
        if case.source != 0.0 {
            eqn.equate_source(&source, source_dims)?;
        }
        eqn.relax_from(solution, &psi)?;
        eqn.set_reference(&psi, ref_cell, ref_value, false)?;

        let controls = if outer + 1 == n_outer {
            solution.solver_controls_final(&case.field)?
        } else {
            solution.solver_controls(&case.field)?
        };
        let perf = eqn.solve(&mut psi, controls)?;
        psi.relax_from(solution)?;

        let initial = perf.initial_residual;
        performance.push(perf);
        if threshold.is_some_and(|tol| initial < tol) {
            info!("外迭代 {}: 初始残差 {:e} 低于控制阈值", outer + 1, initial);
            break;
        }
    }

    Ok((psi.internal().to_vec(), performance))
}
