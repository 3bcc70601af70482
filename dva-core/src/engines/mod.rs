//! Optimization engines (C5): a shared `Problem` façade plus six concrete
//! engines (GA, PSO, DE, SA, CMA-ES, NSGA-II) behind a single dispatcher.

pub mod common;
pub mod de;
pub mod ga;
pub mod pso;
pub mod sa;
pub mod cmaes;
pub mod nsga2;

use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub use common::{
    AbortFlag, AdaptationType, AdaptiveRateEvent, BenchmarkMetrics, BenchmarkRecord, CampaignGuard,
    ProgressEvent, ProgressSink, SystemInfo,
};

/// Everything a single-objective engine needs to evaluate and bound
/// candidates: the per-coordinate bounds, which coordinates are pinned, the
/// names used for reporting, and the boxed fitness closure itself.
#[derive(Clone)]
pub struct Problem {
    pub bounds: Vec<(f64, f64)>,
    pub fixed_mask: Vec<bool>,
    pub parameter_names: Vec<String>,
    pub fit: Arc<dyn Fn(&Array1<f64>) -> f64 + Send + Sync>,
}

/// Index of the minimum value in `values`. Panics on an empty slice, which
/// never happens: every engine always holds a non-empty population.
pub fn common_argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .expect("population must be non-empty")
}

/// Tagged configuration for every engine, resolving the "dispatch by engine
/// name" requirement into a single enum instead of runtime string matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "engine", rename_all = "snake_case")]
pub enum Engine {
    Ga(ga::GaConfig),
    Pso(pso::PsoConfig),
    De(de::DeConfig),
    Sa(sa::SaConfig),
    CmaEs(cmaes::CmaEsConfig),
}

/// Run whichever engine `config` selects, returning its benchmark record.
pub fn run_engine(
    config: &Engine,
    problem: &Problem,
    seed: u64,
    progress: &ProgressSink,
    abort: &AbortFlag,
) -> BenchmarkRecord {
    match config {
        Engine::Ga(cfg) => ga::run_ga(problem, cfg, seed, progress, abort),
        Engine::Pso(cfg) => pso::run_pso(problem, cfg, seed, progress, abort),
        Engine::De(cfg) => de::run_de(problem, cfg, seed, progress, abort),
        Engine::Sa(cfg) => sa::run_sa(problem, cfg, seed, progress, abort),
        Engine::CmaEs(cfg) => cmaes::run_cmaes(problem, cfg, seed, progress, abort),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_argmin_finds_smallest() {
        assert_eq!(common_argmin(&[3.0, 1.0, 2.0]), 1);
    }

    #[test]
    fn common_argmin_handles_ties_by_first_occurrence() {
        assert_eq!(common_argmin(&[1.0, 1.0, 2.0]), 0);
    }

    #[test]
    fn run_engine_dispatches_ga() {
        let problem = Problem {
            bounds: vec![(-5.0, 5.0); 3],
            fixed_mask: vec![false; 3],
            parameter_names: vec!["a".into(), "b".into(), "c".into()],
            fit: Arc::new(|x: &Array1<f64>| x.iter().map(|v| v * v).sum()),
        };
        let cfg = Engine::Ga(ga::GaConfig { population: 10, generations: 5, ..Default::default() });
        let record = run_engine(&cfg, &problem, 1, &ProgressSink::default(), &AbortFlag::new());
        assert_eq!(record.parameter_names.len(), 3);
    }
}
