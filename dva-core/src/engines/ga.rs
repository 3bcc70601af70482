//! Genetic Algorithm (C5.1): tournament selection, blend crossover,
//! per-coordinate mutation, optional adaptive cxpb/mutpb schedule.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::common::{
    diversity, population_stats, project, AbortFlag, AdaptationType, AdaptiveRateEvent,
    BenchmarkMetrics, BenchmarkRecord, ProgressSink, SystemInfo,
};
use super::Problem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    pub population: usize,
    pub generations: usize,
    pub cxpb: f64,
    pub mutpb: f64,
    pub indpb: f64,
    pub tolerance: f64,
    pub adaptive: bool,
    pub stagnation_limit: usize,
    pub cxpb_min: f64,
    pub cxpb_max: f64,
    pub mutpb_min: f64,
    pub mutpb_max: f64,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population: 50,
            generations: 100,
            cxpb: 0.6,
            mutpb: 0.2,
            indpb: 0.1,
            tolerance: 1e-6,
            adaptive: false,
            stagnation_limit: 10,
            cxpb_min: 0.3,
            cxpb_max: 0.8,
            mutpb_min: 0.4,
            mutpb_max: 0.1,
        }
    }
}

fn tournament_select(rng: &mut StdRng, fitnesses: &[f64]) -> usize {
    let n = fitnesses.len();
    let mut best = rng.random_range(0..n);
    for _ in 0..2 {
        let cand = rng.random_range(0..n);
        if fitnesses[cand] < fitnesses[best] {
            best = cand;
        }
    }
    best
}

fn blend_crossover(a: &Array1<f64>, b: &Array1<f64>, rng: &mut StdRng, alpha: f64) -> (Array1<f64>, Array1<f64>) {
    let n = a.len();
    let mut c1 = Array1::zeros(n);
    let mut c2 = Array1::zeros(n);
    for j in 0..n {
        let lo = a[j].min(b[j]) - alpha * (a[j] - b[j]).abs();
        let hi = a[j].max(b[j]) + alpha * (a[j] - b[j]).abs();
        c1[j] = rng.random_range(lo..=hi);
        c2[j] = rng.random_range(lo..=hi);
    }
    (c1, c2)
}

fn mutate(x: &mut Array1<f64>, bounds: &[(f64, f64)], rng: &mut StdRng, indpb: f64) {
    for j in 0..x.len() {
        if rng.random_range(0.0..1.0) < indpb {
            let (lo, hi) = bounds[j];
            let span = (hi - lo).max(1e-12);
            let delta = rng.random_range(-0.1..0.1) * span;
            x[j] += delta;
        }
    }
}

/// Run the genetic algorithm to completion or until `abort` is set.
pub fn run_ga(problem: &Problem, cfg: &GaConfig, seed: u64, progress: &ProgressSink, abort: &AbortFlag) -> BenchmarkRecord {
    let start = std::time::Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let n = problem.bounds.len();

    let mut population: Vec<Array1<f64>> = (0..cfg.population)
        .map(|_| {
            let mut x = Array1::from_shape_fn(n, |j| {
                let (lo, hi) = problem.bounds[j];
                rng.random_range(lo..=hi)
            });
            project(x.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
            x
        })
        .collect();
    let mut fitnesses: Vec<f64> = population.iter().map(|x| (problem.fit)(x)).collect();

    let best_idx = super::common_argmin(&fitnesses);
    let mut best_x = population[best_idx].clone();
    let mut best_fit = fitnesses[best_idx];

    let mut cxpb = cfg.cxpb;
    let mut mutpb = cfg.mutpb;
    let mut stagnation = 0usize;
    let mut trace = BenchmarkMetrics { system_info: SystemInfo::default(), ..Default::default() };
    let mut aborted = false;

    for gen in 0..cfg.generations {
        if abort.is_set() {
            aborted = true;
            break;
        }
        if best_fit <= cfg.tolerance {
            break;
        }

        let selection_start = std::time::Instant::now();
        let mut parent_pairs = Vec::with_capacity(cfg.population.div_ceil(2));
        while parent_pairs.len() * 2 < cfg.population {
            let i = tournament_select(&mut rng, &fitnesses);
            let j = tournament_select(&mut rng, &fitnesses);
            parent_pairs.push((i, j));
        }
        trace.selection_times.push(selection_start.elapsed().as_secs_f64());

        let crossover_start = std::time::Instant::now();
        let mut offspring: Vec<Array1<f64>> = Vec::with_capacity(cfg.population);
        for (i, j) in &parent_pairs {
            let (c1, c2) = if rng.random_range(0.0..1.0) < cxpb {
                blend_crossover(&population[*i], &population[*j], &mut rng, 0.5)
            } else {
                (population[*i].clone(), population[*j].clone())
            };
            offspring.push(c1);
            if offspring.len() < cfg.population {
                offspring.push(c2);
            }
        }
        trace.crossover_times.push(crossover_start.elapsed().as_secs_f64());

        let mutation_start = std::time::Instant::now();
        for child in offspring.iter_mut() {
            if rng.random_range(0.0..1.0) < mutpb {
                mutate(child, &problem.bounds, &mut rng, cfg.indpb);
            }
            project(child.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
        }
        trace.mutation_times.push(mutation_start.elapsed().as_secs_f64());

        population = offspring;
        let eval_start = std::time::Instant::now();
        fitnesses = population.iter().map(|x| (problem.fit)(x)).collect();
        trace.evaluation_times.push(eval_start.elapsed().as_secs_f64());

        let gen_best_idx = super::common_argmin(&fitnesses);
        let improved = fitnesses[gen_best_idx] < best_fit - 1e-12;
        if improved {
            best_fit = fitnesses[gen_best_idx];
            best_x = population[gen_best_idx].clone();
            stagnation = 0;
        } else {
            stagnation += 1;
        }

        if cfg.adaptive {
            let old_cxpb = cxpb;
            let old_mutpb = mutpb;
            if stagnation >= cfg.stagnation_limit {
                cxpb = (cxpb + (cfg.cxpb_min - cxpb) * 0.1).clamp(cfg.cxpb_min.min(cfg.cxpb_max), cfg.cxpb_min.max(cfg.cxpb_max));
                mutpb = (mutpb + (cfg.mutpb_max - mutpb) * 0.1).clamp(cfg.mutpb_min.min(cfg.mutpb_max), cfg.mutpb_min.max(cfg.mutpb_max));
                trace.adaptive_rates_history.push(AdaptiveRateEvent {
                    generation: gen,
                    old_cxpb,
                    new_cxpb: cxpb,
                    old_mutpb,
                    new_mutpb: mutpb,
                    adaptation_type: AdaptationType::Exploration,
                });
            } else if improved {
                cxpb = (cxpb + (cfg.cxpb_max - cxpb) * 0.1).clamp(cfg.cxpb_min.min(cfg.cxpb_max), cfg.cxpb_min.max(cfg.cxpb_max));
                mutpb = (mutpb + (cfg.mutpb_min - mutpb) * 0.1).clamp(cfg.mutpb_min.min(cfg.mutpb_max), cfg.mutpb_min.max(cfg.mutpb_max));
                trace.adaptive_rates_history.push(AdaptiveRateEvent {
                    generation: gen,
                    old_cxpb,
                    new_cxpb: cxpb,
                    old_mutpb,
                    new_mutpb: mutpb,
                    adaptation_type: AdaptationType::Exploitation,
                });
            }
        }

        let (mean_f, std_f) = population_stats(&fitnesses);
        trace.fitness_history.push(fitnesses.clone());
        trace.best_fitness_per_gen.push(best_fit);
        trace.best_individual_per_gen.push(best_x.to_vec());
        trace.mean_fitness_history.push(mean_f);
        trace.std_fitness_history.push(std_f);
        trace.diversity_history.push(diversity(&population.iter().map(|x| x.to_vec()).collect::<Vec<_>>()));

        progress.emit_text(format!("ga gen {gen}: best={best_fit:.6}"));
    }

    BenchmarkRecord {
        run_number: 0,
        best_fitness: best_fit,
        best_solution: best_x.to_vec(),
        parameter_names: problem.parameter_names.clone(),
        elapsed_time: start.elapsed().as_secs_f64(),
        benchmark_metrics: trace,
        optimization_metadata: serde_json::json!({"engine": "ga", "cxpb_final": cxpb, "mutpb_final": mutpb}),
        aborted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::Problem;
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
    fn ga_improves_on_sphere() {
        let problem = sphere_problem(4);
        let cfg = GaConfig { population: 30, generations: 40, ..Default::default() };
        let record = run_ga(&problem, &cfg, 7, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
    }

    #[test]
    fn ga_respects_fixed_coordinates() {
        let mut problem = sphere_problem(3);
        problem.bounds[1] = (2.0, 2.0);
        problem.fixed_mask[1] = true;
        let cfg = GaConfig { population: 20, generations: 15, ..Default::default() };
        let record = run_ga(&problem, &cfg, 3, &ProgressSink::default(), &AbortFlag::new());
        assert!((record.best_solution[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn ga_respects_bounds_throughout() {
        let problem = sphere_problem(3);
        let cfg = GaConfig { population: 15, generations: 10, ..Default::default() };
        let record = run_ga(&problem, &cfg, 1, &ProgressSink::default(), &AbortFlag::new());
        for (v, (lo, hi)) in record.best_solution.iter().zip(problem.bounds.iter()) {
            assert!(*v >= *lo - 1e-9 && *v <= *hi + 1e-9);
        }
    }

    #[test]
    fn ga_stops_early_on_abort() {
        let problem = sphere_problem(4);
        let cfg = GaConfig { population: 20, generations: 1000, ..Default::default() };
        let abort = AbortFlag::new();
        abort.set();
        let record = run_ga(&problem, &cfg, 5, &ProgressSink::default(), &abort);
        assert!(record.aborted);
    }
}
