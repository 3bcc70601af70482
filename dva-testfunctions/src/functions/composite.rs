//! Composite test functions
//!
//! Hybrid functions that combine the characteristics of more than one
//! base landscape, used to exercise optimizers against combined failure
//! modes (e.g. a narrow curved valley superimposed on a multimodal floor).

use ndarray::Array1;

/// Expanded Griewank-Rosenbrock function - combines Rosenbrock's narrow
/// curved valley with Griewank's multimodal floor.
/// Global minimum: f(x) = 0 at x = (1, 1, ..., 1)
/// Bounds: x_i in [-5, 5]
pub fn expanded_griewank_rosenbrock(x: &Array1<f64>) -> f64 {
    let n = x.len();
    if n < 2 {
        return 0.0;
    }
    let griewank_of = |t: f64| 1.0 + t * t / 4000.0 - t.cos();
    (0..n)
        .map(|i| {
            let xi = x[i];
            let xi1 = x[(i + 1) % n];
            let rosen = 100.0 * (xi1 - xi * xi).powi(2) + (1.0 - xi).powi(2);
            griewank_of(rosen)
        })
        .sum()
}
