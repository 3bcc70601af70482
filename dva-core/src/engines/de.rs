//! Differential Evolution (C5.3): thin façade over `dva_de::differential_evolution`,
//! translating between the campaign `Problem` and the optimizer's own config/report
//! types, and capturing a per-generation trace via its callback hook.

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use dva_de::{differential_evolution, CallbackAction, DEConfig, Mutation, Strategy};

use super::common::{project, AbortFlag, BenchmarkMetrics, BenchmarkRecord, ProgressSink, SystemInfo};
use super::Problem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeConfig {
    pub maxiter: usize,
    pub popsize: usize,
    pub mutation_factor: f64,
    pub recombination: f64,
    pub tol: f64,
    /// One of `dva_de::Strategy`'s alias strings (e.g. `"rand1bin"`,
    /// `"best1bin"`, `"current-to-best1exp"`). Stored as a string rather
    /// than the enum directly since `Strategy` doesn't implement
    /// `Serialize`/`Deserialize` and `DeConfig` must round-trip through the
    /// tagged `Engine` JSON representation.
    pub strategy: String,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            maxiter: 500,
            popsize: 15,
            mutation_factor: 0.8,
            recombination: 0.7,
            tol: 1e-6,
            strategy: "rand1bin".to_string(),
        }
    }
}

/// Run differential evolution to completion or until `abort` is set.
pub fn run_de(problem: &Problem, cfg: &DeConfig, seed: u64, progress: &ProgressSink, abort: &AbortFlag) -> BenchmarkRecord {
    let start = std::time::Instant::now();
    let bounds = problem.bounds.clone();
    let fixed_mask = problem.fixed_mask.clone();
    let fit = Arc::clone(&problem.fit);

    let func = move |x: &Array1<f64>| {
        let mut projected = x.clone();
        project(projected.as_slice_mut().unwrap(), &bounds, &fixed_mask);
        (fit)(&projected)
    };

    let trace = Arc::new(Mutex::new(BenchmarkMetrics {
        system_info: SystemInfo::default(),
        ..Default::default()
    }));
    let trace_cb = Arc::clone(&trace);
    let abort_cb = abort.clone();
    let progress_cb = progress.clone();

    let strategy = Strategy::from_str(&cfg.strategy).unwrap_or(Strategy::Rand1Bin);

    let de_config = DEConfig {
        maxiter: cfg.maxiter,
        popsize: cfg.popsize,
        tol: cfg.tol,
        mutation: Mutation::Factor(cfg.mutation_factor),
        recombination: cfg.recombination,
        strategy,
        seed: Some(seed),
        callback: Some(Box::new(move |intermediate| {
            let mut t = trace_cb.lock().unwrap();
            t.best_fitness_per_gen.push(intermediate.fun);
            t.best_individual_per_gen.push(intermediate.x.to_vec());
            t.std_fitness_history.push(intermediate.convergence);
            progress_cb.emit_text(format!("de iter {}: best={:.6}", intermediate.iter, intermediate.fun));
            if abort_cb.is_set() {
                CallbackAction::Stop
            } else {
                CallbackAction::Continue
            }
        })),
        ..Default::default()
    };

    let eval_start = std::time::Instant::now();
    let report = differential_evolution(&func, &bounds, de_config);
    let elapsed_eval = eval_start.elapsed().as_secs_f64();
    let mut trace = Arc::try_unwrap(trace).map(|m| m.into_inner().unwrap()).unwrap_or_default();
    trace.evaluation_times.push(elapsed_eval);

    BenchmarkRecord {
        run_number: 0,
        best_fitness: report.fun,
        best_solution: report.x.to_vec(),
        parameter_names: problem.parameter_names.clone(),
        elapsed_time: start.elapsed().as_secs_f64(),
        benchmark_metrics: trace,
        optimization_metadata: serde_json::json!({"engine": "de", "strategy": cfg.strategy}),
        aborted: abort.is_set(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere_problem(n: usize) -> Problem {
        Problem {
            bounds: vec![(-5.0, 5.0); n],
            fixed_mask: vec![false; n],
            parameter_names: (0..n).map(|i| format!("p{i}")).collect(),
            fit: Arc::new(|x: &Array1<f64>| x.iter().map(|v| v * v).sum()),
        }
    }

    #[test]
    fn de_improves_on_sphere() {
        let problem = sphere_problem(4);
        let cfg = DeConfig { maxiter: 200, popsize: 12, ..Default::default() };
        let record = run_de(&problem, &cfg, 17, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
    }

    #[test]
    fn de_respects_fixed_coordinates() {
        let mut problem = sphere_problem(3);
        problem.bounds[0] = (3.0, 3.0);
        problem.fixed_mask[0] = true;
        let cfg = DeConfig { maxiter: 100, popsize: 10, ..Default::default() };
        let record = run_de(&problem, &cfg, 21, &ProgressSink::default(), &AbortFlag::new());
        assert!((record.best_solution[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn de_runs_with_explicit_best1bin_strategy() {
        let problem = sphere_problem(4);
        let cfg = DeConfig { maxiter: 200, popsize: 12, strategy: "best1bin".to_string(), ..Default::default() };
        let record = run_de(&problem, &cfg, 17, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
    }

    #[test]
    fn de_falls_back_to_rand1bin_on_unknown_strategy_name() {
        let problem = sphere_problem(4);
        let cfg = DeConfig { maxiter: 200, popsize: 12, strategy: "not-a-strategy".to_string(), ..Default::default() };
        let record = run_de(&problem, &cfg, 17, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
    }

    #[test]
    fn de_stops_early_on_abort() {
        let problem = sphere_problem(4);
        let cfg = DeConfig { maxiter: 100000, popsize: 10, ..Default::default() };
        let abort = AbortFlag::new();
        abort.set();
        let record = run_de(&problem, &cfg, 5, &ProgressSink::default(), &abort);
        assert!(record.aborted);
    }
}
