//! CMA-ES (C5.5): a minimal rank-mu covariance-matrix-adaptation evolution
//! strategy, projecting each sampled candidate back into bounds and pinning
//! fixed coordinates before evaluation.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use super::common::{diversity, population_stats, project, AbortFlag, BenchmarkMetrics, BenchmarkRecord, ProgressSink, SystemInfo};
use super::Problem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmaEsConfig {
    pub generations: usize,
    pub population: Option<usize>,
    pub initial_sigma: f64,
    pub tolerance: f64,
}

impl Default for CmaEsConfig {
    fn default() -> Self {
        Self { generations: 150, population: None, initial_sigma: 0.3, tolerance: 1e-8 }
    }
}

fn default_population(n: usize) -> usize {
    4 + (3.0 * (n as f64).ln()).floor() as usize
}

fn cholesky(c: &Array2<f64>) -> Array2<f64> {
    let n = c.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = c[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                l[[i, j]] = sum.max(1e-18).sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    l
}

/// Run CMA-ES to completion or until `abort` is set.
pub fn run_cmaes(problem: &Problem, cfg: &CmaEsConfig, seed: u64, progress: &ProgressSink, abort: &AbortFlag) -> BenchmarkRecord {
    let start = std::time::Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let n = problem.bounds.len();
    let lambda = cfg.population.unwrap_or_else(|| default_population(n)).max(4);
    let mu = lambda / 2;

    let weights_raw: Vec<f64> = (0..mu).map(|i| ((mu as f64 + 0.5).ln() - ((i + 1) as f64).ln())).collect();
    let weight_sum: f64 = weights_raw.iter().sum();
    let weights: Vec<f64> = weights_raw.iter().map(|w| w / weight_sum).collect();
    let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

    let cc = (4.0 + mu_eff / n as f64) / (n as f64 + 4.0 + 2.0 * mu_eff / n as f64);
    let cs = (mu_eff + 2.0) / (n as f64 + mu_eff + 5.0);
    let c1 = 2.0 / ((n as f64 + 1.3).powi(2) + mu_eff);
    let cmu = (2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((n as f64 + 2.0).powi(2) + mu_eff)).min(1.0 - c1);
    let damps = 1.0 + 2.0 * ((mu_eff - 1.0) / (n as f64 + 1.0)).max(0.0).sqrt() + cs;

    let mut mean = Array1::from_shape_fn(n, |j| {
        let (lo, hi) = problem.bounds[j];
        lo + 0.5 * (hi - lo)
    });
    let mut sigma = cfg.initial_sigma;
    let mut cov = Array2::<f64>::eye(n);
    let mut pc = Array1::<f64>::zeros(n);
    let mut ps = Array1::<f64>::zeros(n);

    let mut trace = BenchmarkMetrics { system_info: SystemInfo::default(), ..Default::default() };
    let mut best_x = mean.clone();
    let mut best_fit = (problem.fit)(&mean);
    let mut aborted = false;

    for gen in 0..cfg.generations {
        if abort.is_set() {
            aborted = true;
            break;
        }

        let l = cholesky(&cov);
        let mut samples: Vec<Array1<f64>> = Vec::with_capacity(lambda);
        let mut zs: Vec<Array1<f64>> = Vec::with_capacity(lambda);
        for _ in 0..lambda {
            let z = Array1::from_shape_fn(n, |_| StandardNormal.sample(&mut rng));
            let y = l.dot(&z);
            let mut x = &mean + sigma * &y;
            project(x.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
            samples.push(x);
            zs.push(z);
        }

        let eval_start = std::time::Instant::now();
        let mut fitnesses: Vec<f64> = samples.iter().map(|x| (problem.fit)(x)).collect();
        trace.evaluation_times.push(eval_start.elapsed().as_secs_f64());
        let mut idx: Vec<usize> = (0..lambda).collect();
        idx.sort_by(|&a, &b| fitnesses[a].total_cmp(&fitnesses[b]));

        if fitnesses[idx[0]] < best_fit {
            best_fit = fitnesses[idx[0]];
            best_x = samples[idx[0]].clone();
        }

        let old_mean = mean.clone();
        let mut new_mean = Array1::<f64>::zeros(n);
        for (w, &i) in weights.iter().zip(idx.iter().take(mu)) {
            new_mean = new_mean + *w * &samples[i];
        }
        mean = new_mean;

        let y_mean = (&mean - &old_mean) / sigma;
        ps = (1.0 - cs) * &ps + (cs * (2.0 - cs) * mu_eff).sqrt() * &y_mean;
        let ps_norm = ps.dot(&ps).sqrt();
        let expected_norm = (n as f64).sqrt() * (1.0 - 1.0 / (4.0 * n as f64) + 1.0 / (21.0 * (n as f64).powi(2)));
        let hsig = (ps_norm / expected_norm) < (1.4 + 2.0 / (n as f64 + 1.0));
        let hsig_f = if hsig { 1.0 } else { 0.0 };

        pc = (1.0 - cc) * &pc + hsig_f * (cc * (2.0 - cc) * mu_eff).sqrt() * &y_mean;

        let mut rank_mu = Array2::<f64>::zeros((n, n));
        for (w, &i) in weights.iter().zip(idx.iter().take(mu)) {
            let y = (&samples[i] - &old_mean) / sigma;
            for r in 0..n {
                for c in 0..n {
                    rank_mu[[r, c]] += w * y[r] * y[c];
                }
            }
        }

        let delta_hsig = (1.0 - hsig_f) * cc * (2.0 - cc);
        for r in 0..n {
            for c in 0..n {
                let rank_one = pc[r] * pc[c];
                cov[[r, c]] = (1.0 - c1 - cmu) * cov[[r, c]] + c1 * (rank_one + delta_hsig * cov[[r, c]]) + cmu * rank_mu[[r, c]];
            }
        }

        sigma *= ((cs / damps) * (ps_norm / expected_norm - 1.0)).exp();
        sigma = sigma.clamp(1e-12, 1e6);

        let (mean_f, std_f) = population_stats(&fitnesses);
        fitnesses.sort_by(|a, b| a.total_cmp(b));
        trace.fitness_history.push(fitnesses.clone());
        trace.best_fitness_per_gen.push(best_fit);
        trace.best_individual_per_gen.push(best_x.to_vec());
        trace.mean_fitness_history.push(mean_f);
        trace.std_fitness_history.push(std_f);
        trace.diversity_history.push(diversity(&samples.iter().map(|x| x.to_vec()).collect::<Vec<_>>()));
        progress.emit_text(format!("cmaes gen {gen}: best={best_fit:.6} sigma={sigma:.4}"));

        if best_fit <= cfg.tolerance {
            break;
        }
    }

    BenchmarkRecord {
        run_number: 0,
        best_fitness: best_fit,
        best_solution: best_x.to_vec(),
        parameter_names: problem.parameter_names.clone(),
        elapsed_time: start.elapsed().as_secs_f64(),
        benchmark_metrics: trace,
        optimization_metadata: serde_json::json!({"engine": "cmaes", "final_sigma": sigma}),
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
    fn cmaes_improves_on_sphere() {
        let problem = sphere_problem(4);
        let cfg = CmaEsConfig { generations: 80, ..Default::default() };
        let record = run_cmaes(&problem, &cfg, 23, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
    }

    #[test]
    fn cmaes_respects_bounds() {
        let problem = sphere_problem(3);
        let cfg = CmaEsConfig { generations: 30, ..Default::default() };
        let record = run_cmaes(&problem, &cfg, 2, &ProgressSink::default(), &AbortFlag::new());
        for (v, (lo, hi)) in record.best_solution.iter().zip(problem.bounds.iter()) {
            assert!(*v >= *lo - 1e-9 && *v <= *hi + 1e-9);
        }
    }

    #[test]
    fn cmaes_stops_early_on_abort() {
        let problem = sphere_problem(4);
        let cfg = CmaEsConfig { generations: 100000, ..Default::default() };
        let abort = AbortFlag::new();
        abort.set();
        let record = run_cmaes(&problem, &cfg, 5, &ProgressSink::default(), &abort);
        assert!(record.aborted);
    }
}
