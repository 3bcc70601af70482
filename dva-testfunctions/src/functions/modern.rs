//! Modern benchmark functions
//!
//! Recent additions to the standard benchmark suites (CEC competitions,
//! Bayesian-optimization literature) used alongside the classic landscapes.

use ndarray::Array1;

/// Forrester et al. (2008) function - 1D, used for surrogate-modeling tests
/// Global minimum: f(x) = -6.02074 at x = 0.757249
/// Bounds: x in [0, 1]
pub fn forrester_2008(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    (6.0 * x1 - 2.0).powi(2) * (12.0 * x1 - 4.0).sin()
}

/// Gramacy & Lee function (alternate, Gaussian-process testing variant)
/// f(x) = exp(x*(x-0.5)*(x-1)) + x^2 / 10
/// Global minimum: f(x) = 1 at x = 0 (boundary minimum)
/// Bounds: x in [0, 1]
pub fn gramacy_lee_function(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    (x1 * (x1 - 0.5) * (x1 - 1.0)).exp() + x1 * x1 / 10.0
}

/// Power Sum function - 4D constrained-fit problem with no exact global
/// minimum (the target vector `b` is not simultaneously attainable).
/// Bounds: x_i in [0, 4]
pub fn power_sum(x: &Array1<f64>) -> f64 {
    const B: [f64; 4] = [8.0, 18.0, 44.0, 114.0];
    (1..=4)
        .map(|k| {
            let inner: f64 = x.iter().map(|&xi| xi.powi(k)).sum();
            (inner - B[(k - 1) as usize]).powi(2)
        })
        .sum()
}

/// Shekel function (m = 10 local minima), 4D
/// Global minimum: f(x) ≈ -10.5364 at x = (4, 4, 4, 4)
/// Bounds: x_i in [0, 10]
pub fn shekel(x: &Array1<f64>) -> f64 {
    const A: [[f64; 4]; 10] = [
        [4.0, 4.0, 4.0, 4.0],
        [1.0, 1.0, 1.0, 1.0],
        [8.0, 8.0, 8.0, 8.0],
        [6.0, 6.0, 6.0, 6.0],
        [3.0, 7.0, 3.0, 7.0],
        [2.0, 9.0, 2.0, 9.0],
        [5.0, 5.0, 3.0, 3.0],
        [8.0, 1.0, 8.0, 1.0],
        [6.0, 2.0, 6.0, 2.0],
        [7.0, 3.6, 7.0, 3.6],
    ];
    const C: [f64; 10] = [0.1, 0.2, 0.2, 0.4, 0.4, 0.6, 0.3, 0.7, 0.5, 0.5];

    -(0..10)
        .map(|i| {
            let dist_sq: f64 = (0..4).map(|j| (x[j] - A[i][j]).powi(2)).sum();
            1.0 / (dist_sq + C[i])
        })
        .sum::<f64>()
}

/// HappyCat function - recent CEC benchmark
/// Global minimum: f(x) = 0 at x = (-1, -1, ..., -1)
/// Bounds: x_i in [-2, 2]
pub fn happycat(x: &Array1<f64>) -> f64 {
    let d = x.len() as f64;
    let alpha = 1.0 / 8.0;
    let sum_sq: f64 = x.iter().map(|&xi| xi * xi).sum();
    let sum: f64 = x.iter().sum();
    (sum_sq - d).abs().powf(alpha) + (0.5 * sum_sq + sum) / d + 0.5
}
