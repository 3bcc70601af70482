//! Frequency Response Function evaluator: sweeps a frequency grid, solves the
//! complex 5x5 linear system at each point, and returns per-mass magnitude
//! curves. The solve itself is a hand-written Gaussian elimination with
//! partial pivoting rather than a call into a general-purpose linear-algebra
//! crate, matching the reference codebase's own DSP code (hand-rolled
//! biquad/IIR arithmetic) rather than pulling in `nalgebra`.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rayon::prelude::*;

use crate::assemble::{MechanicalSystem, N_MASS};

/// Solve `a * x = b` for a square complex matrix `a` via Gaussian elimination
/// with partial pivoting. Returns `None` if the matrix is (numerically)
/// singular at any pivot step.
pub fn solve_complex(a: &Array2<Complex64>, b: &Array1<Complex64>) -> Option<Array1<Complex64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    let mut m = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_mag = m[[col, col]].norm();
        for row in (col + 1)..n {
            let mag = m[[row, col]].norm();
            if mag > pivot_mag {
                pivot_mag = mag;
                pivot_row = row;
            }
        }
        if pivot_mag < 1e-14 {
            return None;
        }
        if pivot_row != col {
            for k in 0..n {
                m.swap((col, k), (pivot_row, k));
            }
            rhs.swap(col, pivot_row);
        }

        let pivot = m[[col, col]];
        for row in (col + 1)..n {
            let factor = m[[row, col]] / pivot;
            if factor == Complex64::new(0.0, 0.0) {
                continue;
            }
            for k in col..n {
                let sub = factor * m[[col, k]];
                m[[row, k]] -= sub;
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = Array1::<Complex64>::zeros(n);
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in (row + 1)..n {
            acc -= m[[row, k]] * x[k];
        }
        x[row] = acc / m[[row, row]];
    }
    Some(x)
}

/// Per-mass magnitude curves across a frequency sweep. `magnitude[i]` has
/// length `omega.len()` and holds `|U_i(omega)|` for each sampled frequency;
/// a sample that fails to solve (singular system or a non-finite result)
/// is recorded as `NaN`.
#[derive(Debug, Clone)]
pub struct FrfResult {
    pub omega: Array1<f64>,
    pub magnitude: [Array1<f64>; N_MASS],
}

/// Build the complex dynamic-stiffness matrix `-omega^2 * M + i*omega*C + K`
/// for one frequency sample.
fn dynamic_stiffness(sys: &MechanicalSystem, omega: f64) -> Array2<Complex64> {
    let mut d = Array2::<Complex64>::zeros((N_MASS, N_MASS));
    for i in 0..N_MASS {
        for j in 0..N_MASS {
            let re = -omega * omega * sys.mass[[i, j]] + sys.stiffness[[i, j]];
            let im = omega * sys.damping[[i, j]];
            d[[i, j]] = Complex64::new(re, im);
        }
    }
    d
}

/// Sweep `omega` and solve the linear system at each sample, in parallel via
/// rayon. Magnitude-array ordering is preserved regardless of scheduling.
pub fn sweep(sys: &MechanicalSystem, omega: &Array1<f64>) -> FrfResult {
    let per_sample: Vec<[f64; N_MASS]> = omega
        .to_vec()
        .into_par_iter()
        .map(|w| {
            let d = dynamic_stiffness(sys, w);
            let f = sys.forcing(w);
            match solve_complex(&d, &f) {
                Some(u) => {
                    let mut row = [f64::NAN; N_MASS];
                    for i in 0..N_MASS {
                        let mag = u[i].norm();
                        row[i] = if mag.is_finite() { mag } else { f64::NAN };
                    }
                    row
                }
                None => [f64::NAN; N_MASS],
            }
        })
        .collect();

    let mut magnitude: [Array1<f64>; N_MASS] = Default::default();
    for i in 0..N_MASS {
        magnitude[i] = Array1::from_vec(per_sample.iter().map(|row| row[i]).collect());
    }

    FrfResult {
        omega: omega.clone(),
        magnitude,
    }
}

/// Build a linearly spaced frequency grid `[omega_start, omega_end]` with `n` points.
pub fn linspace(omega_start: f64, omega_end: f64, n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::from_vec(vec![omega_start]);
    }
    let step = (omega_end - omega_start) / (n as f64 - 1.0);
    Array1::from_vec((0..n).map(|i| omega_start + i as f64 * step).collect())
}
