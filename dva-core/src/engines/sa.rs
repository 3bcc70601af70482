//! Simulated Annealing (C5.4): Gaussian neighborhood proposal scaled by the
//! per-coordinate bound span, geometric cooling, Metropolis acceptance.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::common::{project, AbortFlag, BenchmarkMetrics, BenchmarkRecord, ProgressSink, SystemInfo};
use super::Problem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaConfig {
    pub iterations: usize,
    pub initial_temp: f64,
    pub cooling_rate: f64,
    pub step_fraction: f64,
    pub reheat_after: usize,
    pub reheat_factor: f64,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            iterations: 5000,
            initial_temp: 10.0,
            cooling_rate: 0.995,
            step_fraction: 0.1,
            reheat_after: 400,
            reheat_factor: 2.0,
        }
    }
}

/// Run simulated annealing to completion or until `abort` is set.
pub fn run_sa(problem: &Problem, cfg: &SaConfig, seed: u64, progress: &ProgressSink, abort: &AbortFlag) -> BenchmarkRecord {
    let start = std::time::Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let n = problem.bounds.len();

    let mut current = Array1::from_shape_fn(n, |j| {
        let (lo, hi) = problem.bounds[j];
        rng.random_range(lo..=hi)
    });
    project(current.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
    let mut current_fit = (problem.fit)(&current);

    let mut best = current.clone();
    let mut best_fit = current_fit;

    let mut temp = cfg.initial_temp;
    let mut trace = BenchmarkMetrics { system_info: SystemInfo::default(), ..Default::default() };
    let mut aborted = false;
    let mut stall = 0usize;

    for iter in 0..cfg.iterations {
        if abort.is_set() {
            aborted = true;
            break;
        }

        let mut candidate = current.clone();
        for j in 0..n {
            if problem.fixed_mask[j] {
                continue;
            }
            let (lo, hi) = problem.bounds[j];
            let sigma = cfg.step_fraction * (hi - lo).max(1e-12);
            let normal = Normal::new(0.0, sigma).expect("sigma must be positive");
            candidate[j] += normal.sample(&mut rng);
        }
        project(candidate.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
        let eval_start = std::time::Instant::now();
        let candidate_fit = (problem.fit)(&candidate);
        trace.evaluation_times.push(eval_start.elapsed().as_secs_f64());

        let delta = candidate_fit - current_fit;
        let accept = delta < 0.0 || rng.random_range(0.0..1.0) < (-delta / temp.max(1e-12)).exp();
        if accept {
            current = candidate;
            current_fit = candidate_fit;
        }

        if current_fit < best_fit - 1e-12 {
            best_fit = current_fit;
            best = current.clone();
            stall = 0;
        } else {
            stall += 1;
        }

        temp *= cfg.cooling_rate;
        if stall >= cfg.reheat_after {
            temp *= cfg.reheat_factor;
            stall = 0;
        }

        trace.fitness_history.push(vec![current_fit]);
        trace.best_fitness_per_gen.push(best_fit);
        trace.best_individual_per_gen.push(best.to_vec());
        trace.mean_fitness_history.push(current_fit);
        trace.std_fitness_history.push(temp);
        progress.emit_text(format!("sa iter {iter}: best={best_fit:.6} temp={temp:.4}"));
    }

    BenchmarkRecord {
        run_number: 0,
        best_fitness: best_fit,
        best_solution: best.to_vec(),
        parameter_names: problem.parameter_names.clone(),
        elapsed_time: start.elapsed().as_secs_f64(),
        benchmark_metrics: trace,
        optimization_metadata: serde_json::json!({"engine": "sa", "final_temp": temp}),
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn sphere_problem(n: usize) -> Problem {
        Problem {
            bounds: vec![(-5.0, 5.0); n],
            fixed_mask: vec![false; n],
            parameter_names: (0..n).map(|i| format!("p{i}")).collect(),
            fit: Arc::new(|x: &Array1<f64>| x.iter().map(|v| v * v).sum()),
        }
    }

    #[test]
    fn sa_improves_on_sphere() {
        let problem = sphere_problem(4);
        let cfg = SaConfig { iterations: 1500, ..Default::default() };
        let record = run_sa(&problem, &cfg, 13, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 2.0);
    }

    #[test]
    fn sa_respects_fixed_coordinates() {
        let mut problem = sphere_problem(3);
        problem.bounds[2] = (-1.0, -1.0);
        problem.fixed_mask[2] = true;
        let cfg = SaConfig { iterations: 300, ..Default::default() };
        let record = run_sa(&problem, &cfg, 4, &ProgressSink::default(), &AbortFlag::new());
        assert!((record.best_solution[2] - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn sa_never_worsens_best_fitness() {
        let problem = sphere_problem(3);
        let cfg = SaConfig { iterations: 500, ..Default::default() };
        let record = run_sa(&problem, &cfg, 6, &ProgressSink::default(), &AbortFlag::new());
        let mut prev = f64::INFINITY;
        for v in &record.benchmark_metrics.best_fitness_per_gen {
            assert!(*v <= prev + 1e-9);
            prev = *v;
        }
    }

    #[test]
    fn sa_stops_early_on_abort() {
        let problem = sphere_problem(4);
        let cfg = SaConfig { iterations: 100000, ..Default::default() };
        let abort = AbortFlag::new();
        abort.set();
        let record = run_sa(&problem, &cfg, 5, &ProgressSink::default(), &abort);
        assert!(record.aborted);
    }
}
