//! Benchmark harness (C6): repeat a single engine across N independent
//! seeds, aggregate summary statistics, and serialize/deserialize the
//! resulting snapshot to JSON for later comparison across runs.

use serde::{Deserialize, Serialize};

use crate::engines::{run_engine, AbortFlag, BenchmarkRecord, Engine, Problem, ProgressSink};

/// Descriptive statistics over one scalar metric across benchmark runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let idx = (p * (sorted.len() as f64 - 1.0)).round().clamp(0.0, sorted.len() as f64 - 1.0);
    sorted[idx as usize]
}

pub fn compute_stats(values: &[f64]) -> Stats {
    if values.is_empty() {
        return Stats::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    Stats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        std: var.sqrt(),
        median: percentile(&sorted, 0.5),
        q1,
        q3,
        iqr: q3 - q1,
    }
}

/// A full benchmark snapshot: every run's record plus aggregate statistics,
/// matching the stable benchmark JSON wire format field-for-field
/// (`benchmark_data`/`export_timestamp`), with the aggregate stats carried
/// as additive top-level fields alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSnapshot {
    pub engine_label: String,
    pub benchmark_data: Vec<BenchmarkRecord>,
    pub export_timestamp: String,
    pub best_fitness_stats: Stats,
    pub elapsed_time_stats: Stats,
    pub success_rate: f64,
}

/// Run `engine` `n_runs` times with seeds `seed_base + run_index`, aggregating
/// into a single [`BenchmarkSnapshot`].
pub fn run_benchmark(
    engine_label: &str,
    engine: &Engine,
    problem: &Problem,
    n_runs: usize,
    seed_base: u64,
    success_tolerance: f64,
    progress: &ProgressSink,
    abort: &AbortFlag,
) -> BenchmarkSnapshot {
    let mut benchmark_data = Vec::with_capacity(n_runs);
    for run_index in 0..n_runs {
        if abort.is_set() {
            break;
        }
        let mut record = run_engine(engine, problem, seed_base + run_index as u64, progress, abort);
        record.run_number = run_index;
        progress.emit_text(format!("{engine_label} run {run_index}/{n_runs}: best={:.6}", record.best_fitness));
        benchmark_data.push(record);
    }

    let best_fitnesses: Vec<f64> = benchmark_data.iter().map(|r| r.best_fitness).collect();
    let elapsed: Vec<f64> = benchmark_data.iter().map(|r| r.elapsed_time).collect();
    let success_count = benchmark_data.iter().filter(|r| r.best_fitness <= success_tolerance && !r.aborted).count();
    let success_rate =
        if benchmark_data.is_empty() { 0.0 } else { success_count as f64 / benchmark_data.len() as f64 };

    BenchmarkSnapshot {
        engine_label: engine_label.to_string(),
        export_timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        best_fitness_stats: compute_stats(&best_fitnesses),
        elapsed_time_stats: compute_stats(&elapsed),
        success_rate,
        benchmark_data,
    }
}

/// Pearson correlation matrix across a set of named per-run scalar series
/// (e.g. best_fitness vs elapsed_time), used to spot engines whose runtime
/// correlates suspiciously with solution quality.
pub fn correlation_matrix(series: &[(&str, Vec<f64>)]) -> Vec<Vec<f64>> {
    let n = series.len();
    let mut m = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            m[i][j] = pearson(&series[i].1, &series[j].1);
        }
    }
    m
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::NAN;
    }
    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a <= 0.0 || var_b <= 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// Serialize a snapshot to a pretty-printed JSON string.
pub fn snapshot_to_json(snapshot: &BenchmarkSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// Parse a snapshot back from JSON (e.g. to compare against a prior run).
pub fn snapshot_from_json(json: &str) -> Result<BenchmarkSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

/// Dump every run's per-generation best-fitness trace to a CSV file, one row
/// per generation per run, mirroring the reference crate's
/// `OptimizationRecorder::save_to_csv` layout.
pub fn traces_to_csv<W: std::io::Write>(snapshot: &BenchmarkSnapshot, writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["run_number", "generation", "best_fitness", "mean_fitness", "std_fitness"])?;
    for run in &snapshot.benchmark_data {
        for (gen, best) in run.benchmark_metrics.best_fitness_per_gen.iter().enumerate() {
            let mean = run.benchmark_metrics.mean_fitness_history.get(gen).copied().unwrap_or(f64::NAN);
            let std = run.benchmark_metrics.std_fitness_history.get(gen).copied().unwrap_or(f64::NAN);
            wtr.write_record([
                run.run_number.to_string(),
                gen.to_string(),
                best.to_string(),
                mean.to_string(),
                std.to_string(),
            ])?;
        }
    }
    wtr.flush()?;
    Ok(())
}
