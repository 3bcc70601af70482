//! End-to-end scenarios S1-S6.

mod common;

use std::sync::Arc;

use ndarray::Array1;

use dva_core::engines::ga::GaConfig;
use dva_core::engines::nsga2::{run_nsga2, Nsga2Config};
use dva_core::engines::{run_engine, AbortFlag, Engine, Problem, ProgressSink};
use dva_core::fitness::FitnessContext;
use dva_core::omega_conv::{run_omega_convergence, OmegaConvConfig};
use dva_core::sobol::{run_sobol, run_sobol_sweep};
use dva_model::N_DVA;

fn s1_problem(ctx: &Arc<FitnessContext>) -> Problem {
    let bounds = common::s1_bounds();
    let fixed_mask = vec![false; N_DVA];
    let parameter_names = (0..N_DVA).map(|i| format!("p{i}")).collect();
    let ctx = Arc::clone(ctx);
    Problem { bounds, fixed_mask, parameter_names, fit: Arc::new(move |x: &Array1<f64>| ctx.fitness(x)) }
}

fn s1_context() -> Arc<FitnessContext> {
    let (targets, weights) = common::zero_targets_unit_weights();
    Arc::new(FitnessContext::new(common::s1_main(), common::s1_omega(), targets, weights, 0.0))
}

#[test]
fn s1_ga_sanity() {
    let ctx = s1_context();
    let problem = s1_problem(&ctx);
    let cfg = Engine::Ga(GaConfig { population: 50, generations: 20, ..Default::default() });
    let record = run_engine(&cfg, &problem, 0, &ProgressSink::default(), &AbortFlag::new());
    assert!(record.best_fitness.is_finite());
    assert!(record.best_fitness < 1.0, "expected best_fitness < 1.0, got {}", record.best_fitness);
}

#[test]
fn s2_determinism() {
    let ctx = s1_context();
    let problem = s1_problem(&ctx);
    let cfg = Engine::Ga(GaConfig { population: 30, generations: 15, ..Default::default() });
    let r1 = run_engine(&cfg, &problem, 42, &ProgressSink::default(), &AbortFlag::new());
    let r2 = run_engine(&cfg, &problem, 42, &ProgressSink::default(), &AbortFlag::new());
    assert_eq!(r1.best_solution, r2.best_solution);
    assert_eq!(r1.best_fitness, r2.best_fitness);
}

#[test]
fn s3_penalty_floor_on_zero_omega_dc() {
    let mut main = common::s1_main();
    main.omega_dc = 0.0;
    let (targets, weights) = common::zero_targets_unit_weights();
    let ctx = FitnessContext::new(main, common::s1_omega(), targets, weights, 0.0);
    let x = Array1::from_elem(N_DVA, 0.3);
    assert_eq!(ctx.fitness(&x), dva_core::PENALTY);
}

#[test]
fn s4_sobol_monotonicity() {
    let ctx = s1_context();
    let bounds = common::s1_bounds();
    let model = move |x: &Array1<f64>| ctx.fitness(x);

    let r1 = run_sobol(&model, &bounds[..4], 32, 1);
    let r2 = run_sobol(&model, &bounds[..4], 64, 1);
    let r3 = run_sobol(&model, &bounds[..4], 128, 1);

    let mean_change = |a: &[f64], b: &[f64]| -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len() as f64
    };
    let s1_a: Vec<f64> = r1.indices.iter().map(|i| i.s1).collect();
    let s1_b: Vec<f64> = r2.indices.iter().map(|i| i.s1).collect();
    let s1_c: Vec<f64> = r3.indices.iter().map(|i| i.s1).collect();

    let change_1_2 = mean_change(&s1_a, &s1_b);
    let change_2_3 = mean_change(&s1_b, &s1_c);
    assert!(change_2_3 <= change_1_2 * 1.1 + 1e-6, "expected convergence trend: {change_1_2} -> {change_2_3}");
}

#[test]
fn s4b_sobol_sweep_matches_production_contract() {
    let ctx = s1_context();
    let bounds = common::s1_bounds();
    let model = move |x: &Array1<f64>| ctx.fitness(x);

    let report = run_sobol_sweep(&model, &bounds[..4], &[32, 64, 128], 1);
    assert_eq!(report.samples, vec![32, 64, 128]);
    assert_eq!(report.s1.len(), 3);
    assert_eq!(report.st.len(), 3);
    for row in &report.s1 {
        assert_eq!(row.len(), 4);
    }
}

#[test]
fn s5_omega_points_convergence() {
    let main = common::s1_main();
    let x = Array1::from_elem(N_DVA, 0.3);
    let cfg = OmegaConvConfig {
        omega_start: 0.0,
        omega_end: 10000.0,
        initial_points: 100,
        max_points: 2000,
        step: 100,
        threshold: 0.01,
        max_iter: 20,
        mass_of_interest: 0,
    };
    let report = run_omega_convergence(&main, &x, &cfg).unwrap();
    assert!(report.converged);
    assert!(report.convergence_point.unwrap() <= 2000);
}

#[test]
fn s6_nsga2_pareto_non_dominance() {
    let main = common::s1_main();
    let omega = common::s1_omega();
    let (targets, weights) = common::zero_targets_unit_weights();
    let bounds = common::s1_bounds();
    let fixed_mask = vec![false; N_DVA];
    let names: Vec<String> = (0..N_DVA).map(|i| format!("p{i}")).collect();
    let cfg = Nsga2Config { population: 20, generations: 10, ..Nsga2Config::with_defaults(N_DVA, vec![1.0; N_DVA]) };

    let record = run_nsga2(
        &main,
        &omega,
        &targets,
        &weights,
        &bounds,
        &fixed_mask,
        &names,
        &cfg,
        0,
        &ProgressSink::default(),
        &AbortFlag::new(),
    );

    assert!(!record.pareto_front.is_empty());
    for (i, a) in record.pareto_front.iter().enumerate() {
        for (j, b) in record.pareto_front.iter().enumerate() {
            if i == j {
                continue;
            }
            let a_dominates_b = a.objectives.iter().zip(b.objectives.iter()).all(|(x, y)| x <= y)
                && a.objectives.iter().zip(b.objectives.iter()).any(|(x, y)| x < y);
            assert!(!a_dominates_b, "front member {i} dominates member {j}");
        }
    }
}
