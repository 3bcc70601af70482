//! Sobol sensitivity analyzer (C7): Saltelli sampling and first-order/total
//! index estimators, built on the Latin-hypercube quasi-random generator
//! already shared with PSO's optional quasi-random seeding since this
//! workspace carries no dedicated Sobol-sequence crate.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use dva_de::init_latin_hypercube;

/// First-order and total-order sensitivity indices for one parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SobolIndex {
    pub s1: f64,
    pub st: f64,
    pub s1_unstable: bool,
    pub st_unstable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SobolReport {
    pub indices: Vec<SobolIndex>,
    pub base_variance: f64,
    pub n_samples: usize,
}

/// Convergence sweep across a list of sample budgets, matching the stable
/// benchmark JSON wire format's `{samples, S1, ST, warnings}` shape: `S1`
/// and `ST` each hold one row of per-parameter indices per sample budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SobolSweepReport {
    pub samples: Vec<usize>,
    #[serde(rename = "S1")]
    pub s1: Vec<Vec<f64>>,
    #[serde(rename = "ST")]
    pub st: Vec<Vec<f64>>,
    pub warnings: Vec<String>,
}

/// Negative or implausibly large indices relative to total variance indicate
/// an under-sampled estimate; flagged rather than silently reported.
const INSTABILITY_MARGIN: f64 = 0.05;

fn build_saltelli_matrices(n_vars: usize, n_base: usize, bounds: &[(f64, f64)], seed: u64) -> (Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let lower = Array1::from_vec(bounds.iter().map(|b| b.0).collect());
    let upper = Array1::from_vec(bounds.iter().map(|b| b.1).collect());
    let is_free = vec![true; n_vars];
    let a = init_latin_hypercube(n_vars, n_base, &lower, &upper, &is_free, &mut rng);
    let b = init_latin_hypercube(n_vars, n_base, &lower, &upper, &is_free, &mut rng);
    (a, b)
}

/// Run the Saltelli estimator for `model` over `bounds`, using `n_base`
/// base samples (total model evaluations: `n_base * (n_vars + 2)`).
pub fn run_sobol<F>(model: &F, bounds: &[(f64, f64)], n_base: usize, seed: u64) -> SobolReport
where
    F: Fn(&Array1<f64>) -> f64 + Sync,
{
    let n_vars = bounds.len();
    let (a, b) = build_saltelli_matrices(n_vars, n_base, bounds, seed);

    let eval_row = |m: &Array2<f64>, i: usize| -> Array1<f64> { m.row(i).to_owned() };

    let ya: Vec<f64> = (0..n_base).map(|i| model(&eval_row(&a, i))).collect();
    let yb: Vec<f64> = (0..n_base).map(|i| model(&eval_row(&b, i))).collect();

    let all_y: Vec<f64> = ya.iter().chain(yb.iter()).copied().collect();
    let mean_y = all_y.iter().sum::<f64>() / all_y.len() as f64;
    let base_variance = all_y.iter().map(|y| (y - mean_y).powi(2)).sum::<f64>() / all_y.len() as f64;

    let mut indices = Vec::with_capacity(n_vars);
    for j in 0..n_vars {
        let mut ab_j = a.clone();
        for i in 0..n_base {
            ab_j[[i, j]] = b[[i, j]];
        }
        let y_ab: Vec<f64> = (0..n_base).map(|i| model(&eval_row(&ab_j, i))).collect();

        let s1_numer: f64 = (0..n_base).map(|i| yb[i] * (y_ab[i] - ya[i])).sum::<f64>() / n_base as f64;
        let st_numer: f64 = (0..n_base).map(|i| (ya[i] - y_ab[i]).powi(2)).sum::<f64>() / (2.0 * n_base as f64);

        let s1 = if base_variance > 1e-15 { s1_numer / base_variance } else { 0.0 };
        let st = if base_variance > 1e-15 { st_numer / base_variance } else { 0.0 };

        indices.push(SobolIndex {
            s1,
            st,
            s1_unstable: s1 < -INSTABILITY_MARGIN || s1 > 1.0 + INSTABILITY_MARGIN,
            st_unstable: st < -INSTABILITY_MARGIN || st > 1.0 + INSTABILITY_MARGIN,
        });
    }

    SobolReport { indices, base_variance, n_samples: n_base * (n_vars + 2) }
}

/// Run the Saltelli estimator once per entry of `sample_sizes`, reporting
/// convergence across the whole budget sweep plus instability warnings.
pub fn run_sobol_sweep<F>(model: &F, bounds: &[(f64, f64)], sample_sizes: &[usize], seed: u64) -> SobolSweepReport
where
    F: Fn(&Array1<f64>) -> f64 + Sync,
{
    let mut samples = Vec::with_capacity(sample_sizes.len());
    let mut s1 = Vec::with_capacity(sample_sizes.len());
    let mut st = Vec::with_capacity(sample_sizes.len());
    let mut warnings = Vec::new();

    for (budget_idx, &n_base) in sample_sizes.iter().enumerate() {
        if n_base == 0 {
            warnings.push(format!("sample budget at index {budget_idx} is zero, skipping"));
            samples.push(0);
            s1.push(Vec::new());
            st.push(Vec::new());
            continue;
        }
        let report = run_sobol(model, bounds, n_base, seed.wrapping_add(budget_idx as u64));
        samples.push(n_base);
        s1.push(report.indices.iter().map(|i| i.s1).collect());
        st.push(report.indices.iter().map(|i| i.st).collect());

        for (j, idx) in report.indices.iter().enumerate() {
            if idx.s1_unstable {
                warnings.push(format!(
                    "parameter {j}: S1 index unstable at n_base={n_base} (value outside [-{m}, 1+{m}])",
                    m = INSTABILITY_MARGIN
                ));
            }
            if idx.st_unstable {
                warnings.push(format!(
                    "parameter {j}: ST index unstable at n_base={n_base} (value outside [-{m}, 1+{m}])",
                    m = INSTABILITY_MARGIN
                ));
            }
        }

        if budget_idx > 0 {
            let prev_s1 = &s1[budget_idx - 1];
            let drift: f64 = prev_s1
                .iter()
                .zip(s1.last().unwrap().iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            if drift > 0.2 {
                warnings.push(format!(
                    "S1 indices have not converged between n_base={} and n_base={} (max drift {:.3})",
                    sample_sizes[budget_idx - 1],
                    n_base,
                    drift
                ));
            }
        }
    }

    SobolSweepReport { samples, s1, st, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sobol_ranks_dominant_variable_highest() {
        let bounds = vec![(-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)];
        let model = |x: &Array1<f64>| 10.0 * x[0] + 0.01 * x[1] + 0.01 * x[2];
        let report = run_sobol(&model, &bounds, 512, 7);
        assert!(report.indices[0].s1 > report.indices[1].s1);
        assert!(report.indices[0].s1 > report.indices[2].s1);
    }

    #[test]
    fn sobol_total_sample_count_matches_formula() {
        let bounds = vec![(-1.0, 1.0); 4];
        let model = |x: &Array1<f64>| x.iter().sum();
        let report = run_sobol(&model, &bounds, 64, 3);
        assert_eq!(report.n_samples, 64 * (4 + 2));
    }

    #[test]
    fn sobol_constant_model_has_zero_variance_and_flat_indices() {
        let bounds = vec![(-1.0, 1.0); 2];
        let model = |_: &Array1<f64>| 5.0;
        let report = run_sobol(&model, &bounds, 64, 1);
        assert!(report.base_variance.abs() < 1e-12);
        for idx in &report.indices {
            assert_eq!(idx.s1, 0.0);
            assert_eq!(idx.st, 0.0);
        }
    }

    #[test]
    fn sobol_sweep_reports_one_row_per_sample_budget() {
        let bounds = vec![(-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)];
        let model = |x: &Array1<f64>| 10.0 * x[0] + 0.01 * x[1] + 0.01 * x[2];
        let sample_sizes = [64, 256, 1024];
        let report = run_sobol_sweep(&model, &bounds, &sample_sizes, 7);
        assert_eq!(report.samples, vec![64, 256, 1024]);
        assert_eq!(report.s1.len(), 3);
        assert_eq!(report.st.len(), 3);
        for row in &report.s1 {
            assert_eq!(row.len(), 3);
        }
        assert!(report.s1[2][0] > report.s1[2][1]);
    }

    #[test]
    fn sobol_sweep_warns_on_zero_sample_budget() {
        let bounds = vec![(-1.0, 1.0); 2];
        let model = |x: &Array1<f64>| x.iter().sum();
        let report = run_sobol_sweep(&model, &bounds, &[0, 64], 3);
        assert!(report.warnings.iter().any(|w| w.contains("zero")));
        assert_eq!(report.samples[0], 0);
    }
}
