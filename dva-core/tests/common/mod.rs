//! Shared fixtures for end-to-end scenario tests (S1-S6).

use dva_model::{linspace, MainParams, MassTargets, MassWeights, N_DVA, N_MASS};

/// The S1 scenario's main-system parameters, reused by every scenario below.
pub fn s1_main() -> MainParams {
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

pub fn s1_omega() -> ndarray::Array1<f64> {
    linspace(0.0, 10000.0, 1200)
}

pub fn s1_bounds() -> Vec<(f64, f64)> {
    vec![(0.0001, 2.5); N_DVA]
}

pub fn zero_targets_unit_weights() -> ([MassTargets; N_MASS], [MassWeights; N_MASS]) {
    let targets: [MassTargets; N_MASS] = std::array::from_fn(|_| MassTargets {
        peak_values: [Some(0.0); 4],
        peak_positions: [Some(0.0); 5],
        bandwidths: [Some(0.0); dva_model::N_PAIRS],
        slopes: [Some(0.0); dva_model::N_PAIRS],
        area_under_curve: Some(0.0),
    });
    let weights: [MassWeights; N_MASS] = std::array::from_fn(|_| MassWeights {
        peak_values: [1.0; 4],
        peak_positions: [1.0; 5],
        bandwidths: [1.0; dva_model::N_PAIRS],
        slopes: [1.0; dva_model::N_PAIRS],
        area_under_curve: 1.0,
    });
    (targets, weights)
}
