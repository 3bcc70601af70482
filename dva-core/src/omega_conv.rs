//! Omega-points convergence helper (C8): grid-refinement search that
//! increases frequency-sweep resolution until the maximum magnitude slope
//! on a chosen mass stabilizes within a relative tolerance.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use dva_model::{assemble, linspace, sweep, MainParams, ModelError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmegaConvConfig {
    pub omega_start: f64,
    pub omega_end: f64,
    pub initial_points: usize,
    pub max_points: usize,
    pub step: usize,
    pub threshold: f64,
    pub max_iter: usize,
    pub mass_of_interest: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmegaConvReport {
    pub omega_points: Vec<usize>,
    pub max_slopes: Vec<f64>,
    pub relative_changes: Vec<f64>,
    pub converged: bool,
    pub convergence_point: Option<usize>,
    pub iteration_limit_reached: bool,
}

fn max_abs_slope(omega: &Array1<f64>, magnitude: &Array1<f64>) -> f64 {
    let mut max_slope: f64 = 0.0;
    for i in 1..omega.len() {
        let d_omega = omega[i] - omega[i - 1];
        if d_omega.abs() < 1e-15 {
            continue;
        }
        let slope = (magnitude[i] - magnitude[i - 1]) / d_omega;
        max_slope = max_slope.max(slope.abs());
    }
    max_slope
}

/// Run the convergence search for `main`/`x` per [`OmegaConvConfig`].
/// `step` is never silently adjusted; if the budget is exhausted without
/// convergence, `iteration_limit_reached` is reported honestly.
pub fn run_omega_convergence(main: &MainParams, x: &Array1<f64>, cfg: &OmegaConvConfig) -> Result<OmegaConvReport, ModelError> {
    let sys = assemble(main, x)?;

    let mut n = cfg.initial_points;
    let mut omega_points = Vec::new();
    let mut max_slopes = Vec::new();
    let mut relative_changes = Vec::new();
    let mut converged = false;
    let mut convergence_point = None;
    let mut iteration_limit_reached = true;

    let mut prev_slope: Option<f64> = None;

    for _ in 0..cfg.max_iter {
        let omega = linspace(cfg.omega_start, cfg.omega_end, n);
        let frf = sweep(&sys, &omega);
        let slope = max_abs_slope(&frf.omega, &frf.magnitude[cfg.mass_of_interest]);

        omega_points.push(n);
        max_slopes.push(slope);

        if let Some(prev) = prev_slope {
            let rel = if prev.abs() > 1e-15 { (slope - prev).abs() / prev.abs() } else { 0.0 };
            relative_changes.push(rel);
            if rel < cfg.threshold {
                converged = true;
                convergence_point = Some(n);
                iteration_limit_reached = false;
                break;
            }
        } else {
            relative_changes.push(f64::NAN);
        }

        prev_slope = Some(slope);

        if n >= cfg.max_points {
            break;
        }
        n = (n + cfg.step).min(cfg.max_points);
    }

    Ok(OmegaConvReport {
        omega_points,
        max_slopes,
        relative_changes,
        converged,
        convergence_point,
        iteration_limit_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dva_model::{N_DVA, N_MASS};

    fn default_main() -> MainParams {
        MainParams {
            mu: 1.0,
            lambda_main: [1.0, 1.0, 0.5, 0.5, 0.5],
            nu_main: [0.75; N_MASS],
            a_low: 0.05,
            a_up: 0.05,
            f1: 100.0,
            f2: 100.0,
            omega_dc: 5000.0,
            zeta_dc: 0.01,
        }
    }

    #[test]
    fn converges_within_budget_for_a_smooth_curve() {
        let main = default_main();
        let x = Array1::from_elem(N_DVA, 0.3);
        let cfg = OmegaConvConfig {
            omega_start: 0.0,
            omega_end: 10000.0,
            initial_points: 50,
            max_points: 2000,
            step: 50,
            threshold: 0.05,
            max_iter: 100,
            mass_of_interest: 0,
        };
        let report = run_omega_convergence(&main, &x, &cfg).unwrap();
        assert!(report.converged);
        assert!(report.convergence_point.is_some());
        assert!(!report.iteration_limit_reached);
    }

    #[test]
    fn reports_budget_exhaustion_honestly_when_threshold_unreachable() {
        let main = default_main();
        let x = Array1::from_elem(N_DVA, 0.3);
        let cfg = OmegaConvConfig {
            omega_start: 0.0,
            omega_end: 10000.0,
            initial_points: 50,
            max_points: 150,
            step: 50,
            threshold: 1e-15,
            max_iter: 2,
            mass_of_interest: 0,
        };
        let report = run_omega_convergence(&main, &x, &cfg).unwrap();
        assert!(!report.converged);
        assert!(report.iteration_limit_reached);
        assert!(report.convergence_point.is_none());
    }

    #[test]
    fn propagates_model_assembly_errors() {
        let mut main = default_main();
        main.omega_dc = 0.0;
        let x = Array1::from_elem(N_DVA, 0.3);
        let cfg = OmegaConvConfig {
            omega_start: 0.0,
            omega_end: 1000.0,
            initial_points: 20,
            max_points: 100,
            step: 20,
            threshold: 0.01,
            max_iter: 5,
            mass_of_interest: 0,
        };
        assert!(run_omega_convergence(&main, &x, &cfg).is_err());
    }
}
