//! Unimodal test functions
//!
//! Single-optimum, bowl- or plate-shaped landscapes used to check that an
//! optimizer actually converges before throwing it at harder multimodal
//! surfaces.

use ndarray::Array1;

/// Sphere function - N-dimensional quadratic bowl
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5, 5]
pub fn sphere(x: &Array1<f64>) -> f64 {
    x.iter().map(|&xi| xi * xi).sum()
}

/// Rosenbrock's banana function - N-dimensional
/// Global minimum: f(x) = 0 at x = (1, 1, ..., 1)
/// Bounds: x_i in [-2.048, 2.048]
pub fn rosenbrock(x: &Array1<f64>) -> f64 {
    x.windows(2)
        .into_iter()
        .map(|w| {
            let xi = w[0];
            let xi1 = w[1];
            100.0 * (xi1 - xi * xi).powi(2) + (1.0 - xi).powi(2)
        })
        .sum()
}

/// Booth function - 2D unimodal
/// Global minimum: f(x) = 0 at x = (1, 3)
/// Bounds: x_i in [-10, 10]
pub fn booth(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    let x2 = x[1];
    (x1 + 2.0 * x2 - 7.0).powi(2) + (2.0 * x1 + x2 - 5.0).powi(2)
}

/// Matyas function - 2D unimodal
/// Global minimum: f(x) = 0 at x = (0, 0)
/// Bounds: x_i in [-10, 10]
pub fn matyas(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    let x2 = x[1];
    0.26 * (x1.powi(2) + x2.powi(2)) - 0.48 * x1 * x2
}

/// Beale function - 2D unimodal
/// Global minimum: f(x) = 0 at x = (3, 0.5)
/// Bounds: x_i in [-4.5, 4.5]
pub fn beale(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    let x2 = x[1];
    (1.5 - x1 + x1 * x2).powi(2)
        + (2.25 - x1 + x1 * x2 * x2).powi(2)
        + (2.625 - x1 + x1 * x2.powi(3)).powi(2)
}

/// Himmelblau's function - 2D, four global minima
/// Global minimum: f(x) = 0 at (3,2), (-2.805118, 3.131312),
/// (-3.779310, -3.283186), (3.584428, -1.848126)
/// Bounds: x_i in [-5, 5]
pub fn himmelblau(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    let x2 = x[1];
    (x1 * x1 + x2 - 11.0).powi(2) + (x1 + x2 * x2 - 7.0).powi(2)
}

/// Six-hump camel function - 2D, two global minima
/// Global minimum: f(x) = -1.0316 at (0.0898, -0.7126) and (-0.0898, 0.7126)
/// Bounds: x1 in [-3, 3], x2 in [-2, 2]
pub fn six_hump_camel(x: &Array1<f64>) -> f64 {
    let x1 = x[0];
    let x2 = x[1];
    (4.0 - 2.1 * x1.powi(2) + x1.powi(4) / 3.0) * x1.powi(2)
        + x1 * x2
        + (-4.0 + 4.0 * x2.powi(2)) * x2.powi(2)
}

/// Sum of squares (weighted) - N-dimensional
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-10, 10]
pub fn sum_squares(x: &Array1<f64>) -> f64 {
    x.iter()
        .enumerate()
        .map(|(i, &xi)| (i as f64 + 1.0) * xi * xi)
        .sum()
}

/// Different powers function - N-dimensional, ill-conditioned
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-1, 1]
pub fn different_powers(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    x.iter()
        .enumerate()
        .map(|(i, &xi)| xi.abs().powf(2.0 + 4.0 * (i as f64) / (n - 1.0).max(1.0)))
        .sum::<f64>()
        .sqrt()
}

/// Elliptic function - N-dimensional, separable, ill-conditioned
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-100, 100]
pub fn elliptic(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    x.iter()
        .enumerate()
        .map(|(i, &xi)| {
            let exp = if n > 1.0 { i as f64 / (n - 1.0) } else { 0.0 };
            1e6f64.powf(exp) * xi * xi
        })
        .sum()
}

/// Cigar function - N-dimensional, ill-conditioned
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-100, 100]
pub fn cigar(x: &Array1<f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let tail: f64 = x.iter().skip(1).map(|&xi| xi * xi).sum();
    x[0] * x[0] + 1e6 * tail
}

/// Tablet function - N-dimensional, ill-conditioned (first coordinate scaled)
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-100, 100]
pub fn tablet(x: &Array1<f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let tail: f64 = x.iter().skip(1).map(|&xi| xi * xi).sum();
    1e6 * x[0] * x[0] + tail
}

/// Discus function - N-dimensional, ill-conditioned (alias of tablet scaling
/// convention used by several CEC suites)
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-100, 100]
pub fn discus(x: &Array1<f64>) -> f64 {
    tablet(x)
}

/// Ridge function - N-dimensional
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5, 5]
pub fn ridge(x: &Array1<f64>) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let d = 1.0;
    let tail: f64 = x.iter().skip(1).map(|&xi| xi * xi).sum();
    x[0] + d * tail.powf(0.5)
}

/// Perm(0, d, beta) function - 2D default, scalable
/// Global minimum: f(x) = 0 at x_i = 1/i
/// Bounds: x_i in [-1, 1] (default)
pub fn perm_0_d_beta(x: &Array1<f64>) -> f64 {
    let d = x.len() as f64;
    let beta = 10.0;
    (1..=x.len())
        .map(|i| {
            let inner: f64 = (1..=x.len())
                .map(|j| {
                    let xj = x[j - 1];
                    ((j as f64) + beta) * (xj.powi(i as i32) - 1.0 / (j as f64).powi(i as i32))
                })
                .sum();
            inner * inner
        })
        .sum::<f64>()
        / (d * d)
}

/// Perm(d, beta) function - same family as [`perm_0_d_beta`] with a
/// different weighting constant; shares its global minimum at x_j = 1/j.
/// Bounds: x_i in [-1, 1] (default, scaled by the caller for wider domains)
pub fn perm_d_beta(x: &Array1<f64>) -> f64 {
    let d = x.len() as f64;
    let beta = 0.5;
    (1..=x.len())
        .map(|i| {
            let inner: f64 = (1..=x.len())
                .map(|j| {
                    let xj = x[j - 1];
                    ((j as f64) + beta) * (xj.powi(i as i32) - 1.0 / (j as f64).powi(i as i32))
                })
                .sum();
            inner * inner
        })
        .sum::<f64>()
        / (d * d)
}

/// Xin-She Yang N.1 function - N-dimensional, randomized exponent variant
/// (deterministic surrogate: fixed weights instead of random epsilon_i)
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5, 5]
pub fn xin_she_yang_n1(x: &Array1<f64>) -> f64 {
    x.iter()
        .enumerate()
        .map(|(i, &xi)| (i as f64 + 1.0) * xi.abs().powi(2 + (i as i32 % 3)))
        .sum()
}
