// crates/lf_matrix/tests/scenarios.rs

//! 端到端求解场景
//!
//! 从离散算子组装方程，经边界折叠、约束与求解器选择，核对数值解。

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::DVec3;
use lf_config::{FvSolution, SolverControls};
use lf_foundation::{DimensionSet, DimensionedScalar};
use lf_matrix::boundary::{PatchFieldSpec, SpecValue};
use lf_matrix::field::{AreaScalarField, SurfaceScalarField, VolScalarField, VolVectorField};
use lf_matrix::fvm::{self, ConvectionScheme};
use lf_matrix::{fam, MatrixError, MatrixState};
use lf_mesh::generation::{LineMeshGenerator, RectMeshGenerator};
use lf_mesh::{GeoMesh, MeshKind};

fn specs(entries: &[(&str, PatchFieldSpec)]) -> BTreeMap<String, PatchFieldSpec> {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn kappa() -> DimensionedScalar {
    DimensionedScalar::new("kappa", DimensionSet::DIFFUSIVITY, 1.0)
}

fn pcg() -> SolverControls {
    SolverControls::new("PCG").with_preconditioner("DIC").with_tolerance(1e-12, 0.0)
}

fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= tol, "单元 {}: {} != {}", i, a, e);
    }
}

fn line(n: usize, length: f64) -> Arc<GeoMesh> {
    Arc::new(LineMeshGenerator::new(n, length).build().unwrap())
}

#[test]
fn test_dirichlet_diffusion() {
    let bcs = specs(&[
        ("left", PatchFieldSpec::fixed_value(0.0)),
        ("right", PatchFieldSpec::fixed_value(10.0)),
    ]);
    let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, line(5, 5.0), 0.0, &bcs).unwrap();
    let mut eqn = -fvm::laplacian(&kappa(), &t).unwrap();
    assert!(!t.need_reference().unwrap());
    assert!(!eqn.set_reference(&t, Some(0), 100.0, false).unwrap());

    let perf = eqn.solve(&mut t, &pcg()).unwrap();
    assert!(perf.converged());
    assert!(perf.n_iterations <= 5);
    assert_close(t.internal(), &[1.0, 3.0, 5.0, 7.0, 9.0], 1e-9);
    assert_eq!(eqn.state(), MatrixState::Solved);
    assert!(eqn.relax(0.5, &t).is_err());
}

#[test]
fn test_neumann_with_reference() {
    let bcs = specs(&[
        ("left", PatchFieldSpec::zero_gradient()),
        ("right", PatchFieldSpec::zero_gradient()),
    ]);
    let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, line(5, 5.0), 0.0, &bcs).unwrap();
    let mut eqn = -fvm::laplacian(&kappa(), &t).unwrap();
    assert!(t.need_reference().unwrap());
    assert!(eqn.set_reference(&t, Some(0), 5.0, false).unwrap());
    assert_eq!(eqn.ldu().diag()[0], 2.0);
    assert_eq!(eqn.source()[0], 5.0);

    let perf = eqn.solve(&mut t, &pcg()).unwrap();
    assert!(perf.converged());
    assert_close(t.internal(), &[5.0; 5], 1e-8);
}

#[test]
fn test_asymmetric_matrix_rejects_pcg() {
    let bcs = specs(&[
        ("left", PatchFieldSpec::fixed_value(1.0)),
        ("right", PatchFieldSpec::zero_gradient()),
    ]);
    let mesh = line(5, 5.0);
    let mut t = VolScalarField::uniform("T", DimensionSet::DIMLESS, Arc::clone(&mesh), 0.0, &bcs).unwrap();
    let phi = SurfaceScalarField::uniform("phi", DimensionSet::VOLUME / DimensionSet::TIME, mesh, 1.0);
    let mut eqn = fvm::div(&phi, &t, ConvectionScheme::Upwind).unwrap();
    assert!(eqn.ldu().asymmetric());

    let err = eqn.solve(&mut t, &SolverControls::new("PCG")).unwrap_err();
    match &err {
        MatrixError::UnsupportedSolver { name, valid, .. } => {
            assert_eq!(name, "PCG");
            assert!(valid.contains("PBiCG"));
            assert!(!valid.contains("PCG,"));
        }
        other => panic!("意外的错误: {}", other),
    }
    assert!(err.to_string().contains("PBiCGStab"));
}

/// 一维对流扩散衰减，左端流入定值、右端零梯度
fn convection_diffusion(mesh: &Arc<GeoMesh>) -> (VolScalarField, lf_matrix::FvMatrix<f64>) {
    let bcs = specs(&[
        ("left", PatchFieldSpec::fixed_value(1.0)),
        ("right", PatchFieldSpec::zero_gradient()),
    ]);
    let t = VolScalarField::uniform("T", DimensionSet::DIMLESS, Arc::clone(mesh), 0.0, &bcs).unwrap();
    let mut phi = SurfaceScalarField::uniform(
        "phi",
        DimensionSet::VOLUME / DimensionSet::TIME,
        Arc::clone(mesh),
        0.5,
    );
    phi.patch_mut(0).fill(-0.5);
    let gamma = DimensionedScalar::new("D", DimensionSet::AREA / DimensionSet::TIME, 0.1);
    let decay = DimensionedScalar::new("k", DimensionSet::TIME.pow(-1), 0.2);
    let eqn = fvm::div(&phi, &t, ConvectionScheme::Linear).unwrap() - fvm::laplacian(&gamma, &t).unwrap()
        + fvm::sp_uniform(&decay, &t).unwrap();
    (t, eqn)
}

#[test]
fn test_asymmetric_solvers_agree() {
    let mesh = line(20, 2.0);
    let controls = [
        SolverControls::new("PBiCG").with_preconditioner("DILU").with_tolerance(1e-12, 0.0),
        SolverControls::new("PBiCGStab").with_preconditioner("DILU").with_tolerance(1e-12, 0.0),
        SolverControls::new("smoothSolver")
            .with_smoother("symGaussSeidel")
            .with_tolerance(1e-12, 0.0)
            .with_max_iter(5000),
        SolverControls::new("GAMG").with_tolerance(1e-12, 0.0).with_max_iter(200),
    ];
    let mut solutions = Vec::new();
    for c in &controls {
        let (mut t, mut eqn) = convection_diffusion(&mesh);
        let perf = eqn.solve(&mut t, c).unwrap();
        assert!(perf.converged(), "{} 未收敛: {}", c.solver, perf);
        let r = eqn.residual(&t).unwrap();
        assert!(r.iter().all(|v| v.abs() < 1e-8), "{} 残差过大", c.solver);
        solutions.push(t.internal().to_vec());
    }
    for s in &solutions[1..] {
        assert_close(s, &solutions[0], 1e-7);
    }
    // 流入值沿流向单调衰减
    assert!(solutions[0].iter().all(|&v| v > 0.0 && v < 1.0));
    assert!(solutions[0].windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_gamg_recovers_linear_profile() {
    let mesh = Arc::new(RectMeshGenerator::new(20, 20, 2.0, 1.0).build().unwrap());
    let bcs = specs(&[
        ("left", PatchFieldSpec::fixed_value(0.0)),
        ("right", PatchFieldSpec::fixed_value(1.0)),
        ("bottom", PatchFieldSpec::zero_gradient()),
        ("top", PatchFieldSpec::zero_gradient()),
    ]);
    let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, Arc::clone(&mesh), 0.0, &bcs).unwrap();
    let mut eqn = -fvm::laplacian(&kappa(), &t).unwrap();
    let controls = SolverControls::new("GAMG")
        .with_smoother("GaussSeidel")
        .with_tolerance(1e-12, 0.0)
        .with_max_iter(100);
    let perf = eqn.solve(&mut t, &controls).unwrap();
    assert!(perf.converged());
    assert!(perf.n_iterations < 100);
    let expected: Vec<f64> = mesh.cell_centres().iter().map(|c| c.x / 2.0).collect();
    assert_close(t.internal(), &expected, 1e-6);
}

#[test]
fn test_smooth_solver_on_symmetric_system() {
    let mesh = Arc::new(RectMeshGenerator::new(8, 8, 1.0, 1.0).build().unwrap());
    let bcs = specs(&[
        ("left", PatchFieldSpec::fixed_value(1.0)),
        ("right", PatchFieldSpec::fixed_value(1.0)),
        ("bottom", PatchFieldSpec::fixed_value(1.0)),
        ("top", PatchFieldSpec::fixed_value(1.0)),
    ]);
    let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, mesh, 0.0, &bcs).unwrap();
    let mut eqn = -fvm::laplacian(&kappa(), &t).unwrap();
    let controls = SolverControls::new("smoothSolver")
        .with_smoother("DIC")
        .with_tolerance(1e-10, 0.0)
        .with_max_iter(5000);
    let perf = eqn.solve(&mut t, &controls).unwrap();
    assert!(perf.converged());
    assert!(t.internal().iter().all(|v| (v - 1.0).abs() < 1e-7));
}

#[test]
fn test_relative_tolerance_and_outer_iterations() {
    let solution = FvSolution::from_json_str(
        r#"{
            "solvers": { "T": { "solver": "PCG", "preconditioner": "DIC", "tolerance": 1e-12, "relTol": 0.0 } },
            "relaxationFactors": { "equations": { "T": 0.7 } }
        }"#,
    )
    .unwrap();
    let bcs = specs(&[
        ("left", PatchFieldSpec::fixed_value(0.0)),
        ("right", PatchFieldSpec::fixed_value(10.0)),
    ]);
    let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, line(5, 5.0), 0.0, &bcs).unwrap();

    let mut first_initial = None;
    let mut last_initial = 0.0;
    for _ in 0..100 {
        let mut eqn = -fvm::laplacian(&kappa(), &t).unwrap();
        eqn.relax_from(&solution, &t).unwrap();
        let perf = eqn.solve_from(&mut t, &solution).unwrap();
        first_initial.get_or_insert(perf.initial_residual);
        last_initial = perf.initial_residual;
    }
    assert!(last_initial < 1e-6 * first_initial.unwrap_or(1.0));
    assert_close(t.internal(), &[1.0, 3.0, 5.0, 7.0, 9.0], 1e-6);
}

#[test]
fn test_vector_equation_is_solved_per_component() {
    let left = PatchFieldSpec::fixed_value(0.0);
    let right = PatchFieldSpec::fixed_value(SpecValue::Components(vec![10.0, 20.0, -5.0]));
    let bcs = specs(&[("left", left), ("right", right)]);
    let mut u = VolVectorField::uniform("U", DimensionSet::VELOCITY, line(5, 5.0), DVec3::ZERO, &bcs).unwrap();
    let mut eqn = -fvm::laplacian(&kappa(), &u).unwrap();
    let perf = eqn.solve(&mut u, &pcg()).unwrap();
    assert!(perf.converged());
    assert_eq!(perf.field_name, "U");
    let x: Vec<f64> = u.internal().iter().map(|v| v.x).collect();
    let y: Vec<f64> = u.internal().iter().map(|v| v.y).collect();
    let z: Vec<f64> = u.internal().iter().map(|v| v.z).collect();
    assert_close(&x, &[1.0, 3.0, 5.0, 7.0, 9.0], 1e-9);
    assert_close(&y, &[2.0, 6.0, 10.0, 14.0, 18.0], 1e-9);
    assert_close(&z, &[-0.5, -1.5, -2.5, -3.5, -4.5], 1e-9);
    assert!(perf.initial_residual.y > 0.0);
}

#[test]
fn test_cyclic_reaction_diffusion_conserves() {
    let mesh = Arc::new(LineMeshGenerator::new(8, 8.0).cyclic(true).build().unwrap());
    assert!(mesh.interfaces().iter().all(Option::is_some));
    let mut t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, Arc::clone(&mesh), 0.0, &BTreeMap::new())
        .unwrap();
    let rate = DimensionedScalar::new("k", DimensionSet::TIME.pow(-1), 0.5);
    let f: Vec<f64> = (0..8).map(|i| if i < 2 { 4.0 } else { 0.0 }).collect();

    let mut eqn = fvm::sp_uniform(&rate, &t).unwrap() - fvm::laplacian(&kappa(), &t).unwrap();
    eqn.equate_source(&f, DimensionSet::TEMPERATURE / DimensionSet::TIME).unwrap();
    let perf = eqn.solve(&mut t, &pcg()).unwrap();
    assert!(perf.converged());

    // 周期边界上扩散通量互相抵消：Σ k·T·V = Σ f·V
    let reacted: f64 = t.internal().iter().zip(mesh.measures()).map(|(v, m)| 0.5 * v * m).sum();
    let supplied: f64 = f.iter().zip(mesh.measures()).map(|(v, m)| v * m).sum();
    assert!((reacted - supplied).abs() < 1e-8);
    // 关于 x = 1 对称：单元 i 与单元 (1 − i) mod 8 的值相同
    for i in 0..4 {
        let mirrored = t.internal()[(9 - i) % 8];
        assert!((t.internal()[i] - mirrored).abs() < 1e-8);
    }
    assert!(t.internal()[0] > t.internal()[4]);
    let r = eqn.residual(&t).unwrap();
    assert!(r.iter().all(|v| v.abs() < 1e-8));
}

#[test]
fn test_transient_area_equation() {
    let mesh = Arc::new(
        RectMeshGenerator::new(4, 4, 1.0, 1.0)
            .with_kind(MeshKind::Area)
            .build()
            .unwrap(),
    );
    let bcs = specs(&[
        ("left", PatchFieldSpec::zero_gradient()),
        ("right", PatchFieldSpec::zero_gradient()),
        ("bottom", PatchFieldSpec::zero_gradient()),
        ("top", PatchFieldSpec::zero_gradient()),
    ]);
    let initial: Vec<f64> = (0..16).map(|i| i as f64).collect();
    let mut h = AreaScalarField::from_specs("h", DimensionSet::LENGTH, Arc::clone(&mesh), initial, &bcs).unwrap();
    let mass = |h: &AreaScalarField| -> f64 { h.internal().iter().zip(mesh.measures()).map(|(v, a)| v * a).sum() };
    let m0 = mass(&h);

    for _ in 0..5 {
        h.store_old_time();
        let mut eqn = fam::ddt(&h, 0.01).unwrap() - fam::laplacian(&kappa(), &h).unwrap();
        assert_eq!(
            eqn.dimensions(),
            DimensionSet::LENGTH / DimensionSet::TIME * DimensionSet::AREA
        );
        let perf = eqn.solve(&mut h, &pcg()).unwrap();
        assert!(perf.converged());
    }
    // 零梯度边界上总量守恒，且场趋于平坦
    assert!((mass(&h) - m0).abs() < 1e-8);
    let (lo, hi) = h
        .internal()
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    assert!(hi - lo < 15.0);
}

#[test]
fn test_dimension_mismatch_is_reported() {
    let bcs = specs(&[
        ("left", PatchFieldSpec::zero_gradient()),
        ("right", PatchFieldSpec::zero_gradient()),
    ]);
    let t = VolScalarField::uniform("T", DimensionSet::TEMPERATURE, line(3, 3.0), 0.0, &bcs).unwrap();
    let mut ddt = fvm::ddt(&t, 1.0).unwrap();
    let lap = fvm::laplacian(&DimensionedScalar::dimless("nu", 1.0), &t).unwrap();
    let err = ddt.try_sub(&lap).unwrap_err();
    assert!(err.to_string().contains("量纲不一致"));
}
