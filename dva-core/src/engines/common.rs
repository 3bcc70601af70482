//! Shared façade types for every optimization engine (C5): bounds/fixed-mask
//! handling, the benchmark record shape, the progress sink and the
//! single-campaign-at-a-time guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Structured per-generation progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub std_fitness: f64,
    pub diversity: f64,
}

/// Optional text and structured-event progress channels. Either side may be
/// absent; a CLI run without `--progress-json` only drains `text` to stderr,
/// matching the reference crate's `eprintln!`-based progress reporting.
#[derive(Default, Clone)]
pub struct ProgressSink {
    pub text: Option<Sender<String>>,
    pub events: Option<Sender<ProgressEvent>>,
}

impl ProgressSink {
    pub fn emit_text(&self, message: impl Into<String>) {
        if let Some(tx) = &self.text {
            let _ = tx.send(message.into());
        } else {
            eprintln!("{}", message.into());
        }
    }

    pub fn emit_event(&self, event: ProgressEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Checked between generations/iterations; allows graceful early
/// termination with the best-so-far solution still returned.
#[derive(Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One adaptive-rate drift event (GA's adaptive cxpb/mutpb schedule),
/// matching the benchmark JSON schema's `adaptive_rates_history` entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdaptiveRateEvent {
    pub generation: usize,
    pub old_cxpb: f64,
    pub new_cxpb: f64,
    pub old_mutpb: f64,
    pub new_mutpb: f64,
    pub adaptation_type: AdaptationType,
}

/// Direction of a GA adaptive-rate drift: away from the current rates
/// (`Exploration`, triggered by stagnation) or back toward them
/// (`Exploitation`, triggered by improvement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdaptationType {
    Exploration,
    Exploitation,
}

/// Host machine/thread-pool snapshot recorded once per run, matching the
/// benchmark JSON schema's `benchmark_metrics.system_info`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SystemInfo {
    pub num_cpus: usize,
    pub rayon_threads: usize,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self { num_cpus: num_cpus::get(), rayon_threads: rayon::current_num_threads() }
    }
}

/// Per-generation trace captured by every engine for the benchmark harness,
/// matching the stable benchmark JSON schema's `benchmark_metrics` object
/// field-for-field (`diversity_history` is an additive extension the schema
/// doesn't name but §4.6 of the requirements calls for in the trace).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub fitness_history: Vec<Vec<f64>>,
    pub mean_fitness_history: Vec<f64>,
    pub std_fitness_history: Vec<f64>,
    pub best_fitness_per_gen: Vec<f64>,
    pub best_individual_per_gen: Vec<Vec<f64>>,
    pub adaptive_rates_history: Vec<AdaptiveRateEvent>,
    pub evaluation_times: Vec<f64>,
    pub crossover_times: Vec<f64>,
    pub mutation_times: Vec<f64>,
    pub selection_times: Vec<f64>,
    pub system_info: SystemInfo,
    #[serde(default)]
    pub diversity_history: Vec<f64>,
}

/// One engine run's complete record, matching the stable benchmark JSON
/// schema's `benchmark_data[]` entries field-for-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub run_number: usize,
    pub best_fitness: f64,
    pub best_solution: Vec<f64>,
    pub parameter_names: Vec<String>,
    pub elapsed_time: f64,
    pub benchmark_metrics: BenchmarkMetrics,
    #[serde(default)]
    pub optimization_metadata: serde_json::Value,
    #[serde(default)]
    pub aborted: bool,
}

/// Clip a candidate to its bounds in place, then re-pin every fixed
/// coordinate to its bound value (bounds respect + fixed-coordinate
/// stability, invariants 1-2, §8).
pub fn project(x: &mut [f64], bounds: &[(f64, f64)], fixed_mask: &[bool]) {
    for (j, v) in x.iter_mut().enumerate() {
        let (lo, hi) = bounds[j];
        if fixed_mask[j] {
            *v = lo;
            continue;
        }
        if *v < lo {
            *v = lo;
        } else if *v > hi {
            *v = hi;
        }
    }
}

/// Mean pairwise L2 distance across a population, a simple diversity metric
/// reused by every population-based engine's per-generation trace.
pub fn diversity(pop: &[Vec<f64>]) -> f64 {
    let n = pop.len();
    if n < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let d: f64 = pop[i].iter().zip(pop[j].iter()).map(|(a, b)| (a - b).powi(2)).sum();
            sum += d.sqrt();
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Guards against a second campaign starting while one is already running.
#[derive(Default)]
pub struct CampaignGuard(Mutex<Option<String>>);

impl CampaignGuard {
    pub fn new() -> Self {
        Self(Mutex::new(None))
    }

    /// Attempt to start a campaign named `label`; fails if one is already running.
    pub fn try_start(&self, label: impl Into<String>) -> Result<(), String> {
        let mut guard = self.0.lock();
        if let Some(running) = guard.as_ref() {
            return Err(format!("a campaign is already running: {running}"));
        }
        *guard = Some(label.into());
        Ok(())
    }

    pub fn finish(&self) {
        *self.0.lock() = None;
    }
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Compute mean/std fitness over a population's fitness vector, used by
/// every engine's per-generation trace.
pub fn population_stats(fitnesses: &[f64]) -> (f64, f64) {
    mean_std(fitnesses)
}
