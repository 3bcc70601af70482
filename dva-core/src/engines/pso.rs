//! Particle Swarm Optimization (C5.2): configurable topology, adaptive
//! inertia decay, boundary handling, early stopping and stagnation escape.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::common::{diversity, population_stats, project, AbortFlag, BenchmarkMetrics, BenchmarkRecord, ProgressSink, SystemInfo};
use super::Problem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    Global,
    Ring,
    VonNeumann,
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryHandling {
    Absorbing,
    Reflecting,
    Invisible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsoConfig {
    pub particles: usize,
    pub iterations: usize,
    pub w: f64,
    pub w_damping: f64,
    pub c1: f64,
    pub c2: f64,
    pub v_max_factor: f64,
    pub topology: Topology,
    pub boundary: BoundaryHandling,
    pub adaptive_inertia: bool,
    pub mutation_rate: f64,
    pub early_stopping_tol: f64,
    pub early_stopping_iters: usize,
    pub stagnation_limit: usize,
    /// Seed the initial swarm positions from a scrambled Latin Hypercube
    /// (the same generator DE and the Sobol analyzer use) instead of
    /// independent uniform draws per coordinate.
    #[serde(default)]
    pub quasi_random_init: bool,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            particles: 40,
            iterations: 150,
            w: 0.9,
            w_damping: 0.99,
            c1: 1.5,
            c2: 1.5,
            v_max_factor: 0.2,
            topology: Topology::Global,
            boundary: BoundaryHandling::Absorbing,
            adaptive_inertia: true,
            mutation_rate: 0.05,
            early_stopping_tol: 1e-8,
            early_stopping_iters: 30,
            stagnation_limit: 25,
            quasi_random_init: false,
        }
    }
}

fn neighbor_best(topology: Topology, i: usize, n: usize, pbest_fit: &[f64], rng: &mut StdRng) -> usize {
    match topology {
        Topology::Global => super::common_argmin(pbest_fit),
        Topology::Ring => {
            let l = (i + n - 1) % n;
            let r = (i + 1) % n;
            [l, i, r].into_iter().min_by(|&a, &b| pbest_fit[a].total_cmp(&pbest_fit[b])).unwrap()
        }
        Topology::VonNeumann => {
            let step = (n as f64).sqrt().max(1.0) as usize;
            let l = (i + n - 1) % n;
            let r = (i + 1) % n;
            let u = (i + n - step) % n;
            let d = (i + step) % n;
            [l, r, u, d, i].into_iter().min_by(|&a, &b| pbest_fit[a].total_cmp(&pbest_fit[b])).unwrap()
        }
        Topology::Random => {
            let a = rng.random_range(0..n);
            let b = rng.random_range(0..n);
            if pbest_fit[a] < pbest_fit[b] { a } else { b }
        }
    }
}

/// Run particle swarm optimization to completion or until `abort` is set.
pub fn run_pso(problem: &Problem, cfg: &PsoConfig, seed: u64, progress: &ProgressSink, abort: &AbortFlag) -> BenchmarkRecord {
    let start = std::time::Instant::now();
    let mut rng = StdRng::seed_from_u64(seed);
    let n_dim = problem.bounds.len();
    let n = cfg.particles;

    let mut positions: Vec<Array1<f64>> = if cfg.quasi_random_init {
        let lower = ndarray::Array1::from_vec(problem.bounds.iter().map(|b| b.0).collect());
        let upper = ndarray::Array1::from_vec(problem.bounds.iter().map(|b| b.1).collect());
        let is_free: Vec<bool> = problem.fixed_mask.iter().map(|f| !f).collect();
        let lhs = dva_de::init_latin_hypercube(n_dim, n, &lower, &upper, &is_free, &mut rng);
        (0..n)
            .map(|i| {
                let mut x = lhs.row(i).to_owned();
                project(x.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
                x
            })
            .collect()
    } else {
        (0..n)
            .map(|_| {
                let mut x = Array1::from_shape_fn(n_dim, |j| {
                    let (lo, hi) = problem.bounds[j];
                    rng.random_range(lo..=hi)
                });
                project(x.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
                x
            })
            .collect()
    };
    let v_max: Vec<f64> = problem.bounds.iter().map(|(lo, hi)| cfg.v_max_factor * (hi - lo)).collect();
    let mut velocities: Vec<Array1<f64>> = vec![Array1::zeros(n_dim); n];
    let mut fitnesses: Vec<f64> = positions.iter().map(|x| (problem.fit)(x)).collect();

    let mut pbest_pos = positions.clone();
    let mut pbest_fit = fitnesses.clone();
    let gbest_idx = super::common_argmin(&pbest_fit);
    let mut gbest_pos = pbest_pos[gbest_idx].clone();
    let mut gbest_fit = pbest_fit[gbest_idx];

    let mut w = cfg.w;
    let mut trace = BenchmarkMetrics { system_info: SystemInfo::default(), ..Default::default() };
    let mut aborted = false;
    let mut stall = 0usize;
    let mut since_improve = 0usize;

    for iter in 0..cfg.iterations {
        if abort.is_set() {
            aborted = true;
            break;
        }

        for i in 0..n {
            let nb = neighbor_best(cfg.topology, i, n, &pbest_fit, &mut rng);
            let nbest = &pbest_pos[nb];
            for j in 0..n_dim {
                if problem.fixed_mask[j] {
                    velocities[i][j] = 0.0;
                    continue;
                }
                let r1: f64 = rng.random_range(0.0..1.0);
                let r2: f64 = rng.random_range(0.0..1.0);
                let v = w * velocities[i][j]
                    + cfg.c1 * r1 * (pbest_pos[i][j] - positions[i][j])
                    + cfg.c2 * r2 * (nbest[j] - positions[i][j]);
                velocities[i][j] = v.clamp(-v_max[j], v_max[j]);
            }

            for j in 0..n_dim {
                positions[i][j] += velocities[i][j];
                let (lo, hi) = problem.bounds[j];
                match cfg.boundary {
                    BoundaryHandling::Absorbing => {
                        if positions[i][j] < lo {
                            positions[i][j] = lo;
                            velocities[i][j] = 0.0;
                        } else if positions[i][j] > hi {
                            positions[i][j] = hi;
                            velocities[i][j] = 0.0;
                        }
                    }
                    BoundaryHandling::Reflecting => {
                        if positions[i][j] < lo {
                            positions[i][j] = lo + (lo - positions[i][j]);
                            velocities[i][j] = -velocities[i][j];
                        } else if positions[i][j] > hi {
                            positions[i][j] = hi - (positions[i][j] - hi);
                            velocities[i][j] = -velocities[i][j];
                        }
                    }
                    BoundaryHandling::Invisible => {}
                }
            }
            project(positions[i].as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);

            if rng.random_range(0.0..1.0) < cfg.mutation_rate {
                let j = rng.random_range(0..n_dim);
                if !problem.fixed_mask[j] {
                    let (lo, hi) = problem.bounds[j];
                    positions[i][j] = rng.random_range(lo..=hi);
                }
            }
        }

        let eval_start = std::time::Instant::now();
        for i in 0..n {
            let invisible_penalty = matches!(cfg.boundary, BoundaryHandling::Invisible)
                && (0..n_dim).any(|j| positions[i][j] < problem.bounds[j].0 || positions[i][j] > problem.bounds[j].1);
            fitnesses[i] = if invisible_penalty { 1e6 } else { (problem.fit)(&positions[i]) };
            if fitnesses[i] < pbest_fit[i] {
                pbest_fit[i] = fitnesses[i];
                pbest_pos[i] = positions[i].clone();
            }
        }
        trace.evaluation_times.push(eval_start.elapsed().as_secs_f64());

        let cur_best_idx = super::common_argmin(&pbest_fit);
        if pbest_fit[cur_best_idx] < gbest_fit - cfg.early_stopping_tol {
            gbest_fit = pbest_fit[cur_best_idx];
            gbest_pos = pbest_pos[cur_best_idx].clone();
            since_improve = 0;
            stall = 0;
        } else {
            since_improve += 1;
            stall += 1;
        }

        if cfg.adaptive_inertia {
            w *= cfg.w_damping;
        }

        if stall >= cfg.stagnation_limit {
            let reinit_count = (n / 4).max(1);
            for i in 0..reinit_count {
                let mut x = Array1::from_shape_fn(n_dim, |j| {
                    let (lo, hi) = problem.bounds[j];
                    rng.random_range(lo..=hi)
                });
                project(x.as_slice_mut().unwrap(), &problem.bounds, &problem.fixed_mask);
                positions[i] = x;
                velocities[i] = Array1::zeros(n_dim);
            }
            stall = 0;
        }

        let (mean_f, std_f) = population_stats(&fitnesses);
        trace.fitness_history.push(fitnesses.clone());
        trace.best_fitness_per_gen.push(gbest_fit);
        trace.best_individual_per_gen.push(gbest_pos.to_vec());
        trace.mean_fitness_history.push(mean_f);
        trace.std_fitness_history.push(std_f);
        trace.diversity_history.push(diversity(&positions.iter().map(|x| x.to_vec()).collect::<Vec<_>>()));
        progress.emit_text(format!("pso iter {iter}: gbest={gbest_fit:.6}"));

        if since_improve >= cfg.early_stopping_iters {
            break;
        }
    }

    BenchmarkRecord {
        run_number: 0,
        best_fitness: gbest_fit,
        best_solution: gbest_pos.to_vec(),
        parameter_names: problem.parameter_names.clone(),
        elapsed_time: start.elapsed().as_secs_f64(),
        benchmark_metrics: trace,
        optimization_metadata: serde_json::json!({"engine": "pso", "topology": cfg.topology, "final_inertia": w}),
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
    fn pso_improves_on_sphere() {
        let problem = sphere_problem(4);
        let cfg = PsoConfig { particles: 30, iterations: 60, ..Default::default() };
        let record = run_pso(&problem, &cfg, 11, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
    }

    #[test]
    fn pso_respects_fixed_coordinates() {
        let mut problem = sphere_problem(3);
        problem.bounds[0] = (1.0, 1.0);
        problem.fixed_mask[0] = true;
        let cfg = PsoConfig { particles: 20, iterations: 30, ..Default::default() };
        let record = run_pso(&problem, &cfg, 2, &ProgressSink::default(), &AbortFlag::new());
        assert!((record.best_solution[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn pso_ring_topology_runs_and_respects_bounds() {
        let problem = sphere_problem(3);
        let cfg = PsoConfig { particles: 20, iterations: 20, topology: Topology::Ring, ..Default::default() };
        let record = run_pso(&problem, &cfg, 9, &ProgressSink::default(), &AbortFlag::new());
        for (v, (lo, hi)) in record.best_solution.iter().zip(problem.bounds.iter()) {
            assert!(*v >= *lo - 1e-9 && *v <= *hi + 1e-9);
        }
    }

    #[test]
    fn pso_quasi_random_init_respects_bounds_and_converges() {
        let problem = sphere_problem(4);
        let cfg = PsoConfig { particles: 30, iterations: 60, quasi_random_init: true, ..Default::default() };
        let record = run_pso(&problem, &cfg, 11, &ProgressSink::default(), &AbortFlag::new());
        assert!(record.best_fitness < 1.0);
        for (v, (lo, hi)) in record.best_solution.iter().zip(problem.bounds.iter()) {
            assert!(*v >= *lo - 1e-9 && *v <= *hi + 1e-9);
        }
    }
}
