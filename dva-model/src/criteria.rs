//! Criterion extraction: peaks, peak positions, bandwidths, slopes and
//! area-under-curve from a single mass's magnitude curve, reduced against
//! user targets and weights into a singular response and a percentage-error
//! channel for the multi-objective engines.

use ndarray::Array1;

use crate::assemble::N_MASS;

/// Number of (i, j) pairs with 1 <= i < j <= 4.
pub const N_PAIRS: usize = 6;
/// Pair ordering shared by bandwidth and slope: (1,2) (1,3) (1,4) (2,3) (2,4) (3,4), 1-indexed.
pub const PAIRS: [(usize, usize); N_PAIRS] = [(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)];

/// A local-maximum qualifies as a peak once its magnitude is at least this
/// fraction of the global maximum magnitude on the curve. Pinned by
/// `peak_extraction_is_pinned` below so the threshold cannot silently drift.
pub const PEAK_PROMINENCE_FRACTION: f64 = 0.05;

/// Extracted features for one mass's magnitude curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaFeatures {
    /// First four detected peak magnitudes, in frequency order; `NaN` for missing peaks.
    pub peak_values: [f64; 4],
    /// First five detected peak frequencies, in frequency order; `NaN` for missing peaks.
    pub peak_positions: [f64; 5],
    /// `|peak_position[j] - peak_position[i]|` for each pair in [`PAIRS`].
    pub bandwidths: [f64; N_PAIRS],
    /// `(peak_value[j] - peak_value[i]) / (peak_position[j] - peak_position[i])` per pair.
    pub slopes: [f64; N_PAIRS],
    /// Trapezoidal integral of magnitude over the full frequency grid.
    pub area_under_curve: f64,
}

/// Detect local maxima and keep those at least [`PEAK_PROMINENCE_FRACTION`] of
/// the global maximum magnitude. Returns `(position, value)` pairs in
/// frequency order.
fn detect_peaks(omega: &Array1<f64>, magnitude: &Array1<f64>) -> Vec<(f64, f64)> {
    let n = magnitude.len();
    if n < 3 {
        return Vec::new();
    }
    let global_max = magnitude.iter().cloned().filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    if global_max <= 0.0 {
        return Vec::new();
    }
    let threshold = PEAK_PROMINENCE_FRACTION * global_max;

    let mut peaks = Vec::new();
    for i in 1..(n - 1) {
        let (prev, cur, next) = (magnitude[i - 1], magnitude[i], magnitude[i + 1]);
        if !cur.is_finite() || !prev.is_finite() || !next.is_finite() {
            continue;
        }
        if cur > prev && cur > next && cur >= threshold {
            peaks.push((omega[i], cur));
        }
    }
    peaks
}

fn take_padded<const N: usize>(values: &[f64]) -> [f64; N] {
    let mut out = [f64::NAN; N];
    for (slot, v) in out.iter_mut().zip(values.iter()) {
        *slot = *v;
    }
    out
}

/// Extract peak/bandwidth/slope/area features from a single mass's magnitude curve.
pub fn extract_criteria(omega: &Array1<f64>, magnitude: &Array1<f64>) -> CriteriaFeatures {
    let peaks = detect_peaks(omega, magnitude);
    let positions: Vec<f64> = peaks.iter().map(|(p, _)| *p).collect();
    let values: Vec<f64> = peaks.iter().map(|(_, v)| *v).collect();

    let peak_positions: [f64; 5] = take_padded(&positions);
    let peak_values: [f64; 4] = take_padded(&values);

    let mut bandwidths = [f64::NAN; N_PAIRS];
    let mut slopes = [f64::NAN; N_PAIRS];
    for (slot, &(i, j)) in PAIRS.iter().enumerate() {
        let (pi, pj) = (peak_positions[i - 1], peak_positions[j - 1]);
        if pi.is_finite() && pj.is_finite() {
            bandwidths[slot] = (pj - pi).abs();
        }
        let (vi, vj) = (peak_values[i - 1], peak_values[j - 1]);
        if pi.is_finite() && pj.is_finite() && vi.is_finite() && vj.is_finite() && (pj - pi).abs() > 1e-12 {
            slopes[slot] = (vj - vi) / (pj - pi);
        }
    }

    let area_under_curve = trapz(omega, magnitude);

    CriteriaFeatures {
        peak_values,
        peak_positions,
        bandwidths,
        slopes,
        area_under_curve,
    }
}

/// Trapezoidal integral of `y` sampled at `x`.
pub fn trapz(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    if x.len() < 2 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 1..x.len() {
        let dx = x[i] - x[i - 1];
        if !y[i].is_finite() || !y[i - 1].is_finite() {
            continue;
        }
        acc += dx * (y[i] + y[i - 1]) / 2.0;
    }
    acc
}

/// Target and weight schema for a single mass, mirroring [`CriteriaFeatures`].
/// A feature with `target = None` is excluded from the reduction regardless
/// of its paired weight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassTargets {
    pub peak_values: [Option<f64>; 4],
    pub peak_positions: [Option<f64>; 5],
    pub bandwidths: [Option<f64>; N_PAIRS],
    pub slopes: [Option<f64>; N_PAIRS],
    pub area_under_curve: Option<f64>,
}

/// Nonnegative weights paired with [`MassTargets`]; a weight of `0.0` excludes
/// that feature from the reduction even if a target is present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassWeights {
    pub peak_values: [f64; 4],
    pub peak_positions: [f64; 5],
    pub bandwidths: [f64; N_PAIRS],
    pub slopes: [f64; N_PAIRS],
    pub area_under_curve: f64,
}

/// Percentage differences per feature, populated only where a target exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MassPercentageDiffs {
    pub peak_values: [Option<f64>; 4],
    pub peak_positions: [Option<f64>; 5],
    pub bandwidths: [Option<f64>; N_PAIRS],
    pub slopes: [Option<f64>; N_PAIRS],
    pub area_under_curve: Option<f64>,
}

impl MassPercentageDiffs {
    /// Absolute sum of every finite entry, the aggregation confirmed against
    /// the source NSGA-II worker for the multi-objective percentage-error channel.
    pub fn absolute_sum(&self) -> f64 {
        self.peak_values
            .iter()
            .chain(self.peak_positions.iter())
            .chain(self.bandwidths.iter())
            .chain(self.slopes.iter())
            .chain(std::iter::once(&self.area_under_curve))
            .filter_map(|v| *v)
            .map(f64::abs)
            .sum()
    }
}

const PCT_EPS: f64 = 1e-9;

fn pct_diff(extracted: f64, target: Option<f64>) -> Option<f64> {
    if !extracted.is_finite() {
        return None;
    }
    target.map(|t| (extracted - t).abs() / t.abs().max(PCT_EPS))
}

fn weighted_abs_err(extracted: f64, target: Option<f64>, weight: f64) -> f64 {
    match target {
        Some(t) if weight > 0.0 && extracted.is_finite() => weight * (extracted - t).abs(),
        _ => 0.0,
    }
}

/// Reduce one mass's extracted features against its targets/weights to a
/// scalar composite measure and a percentage-difference record.
pub fn reduce_mass(
    features: &CriteriaFeatures,
    targets: &MassTargets,
    weights: &MassWeights,
) -> (f64, MassPercentageDiffs) {
    let mut composite = 0.0;
    let mut pct = MassPercentageDiffs::default();

    for k in 0..4 {
        composite += weighted_abs_err(features.peak_values[k], targets.peak_values[k], weights.peak_values[k]);
        pct.peak_values[k] = pct_diff(features.peak_values[k], targets.peak_values[k]);
    }
    for k in 0..5 {
        composite += weighted_abs_err(
            features.peak_positions[k],
            targets.peak_positions[k],
            weights.peak_positions[k],
        );
        pct.peak_positions[k] = pct_diff(features.peak_positions[k], targets.peak_positions[k]);
    }
    for k in 0..N_PAIRS {
        composite += weighted_abs_err(features.bandwidths[k], targets.bandwidths[k], weights.bandwidths[k]);
        pct.bandwidths[k] = pct_diff(features.bandwidths[k], targets.bandwidths[k]);
        composite += weighted_abs_err(features.slopes[k], targets.slopes[k], weights.slopes[k]);
        pct.slopes[k] = pct_diff(features.slopes[k], targets.slopes[k]);
    }
    composite += weighted_abs_err(features.area_under_curve, targets.area_under_curve, weights.area_under_curve);
    pct.area_under_curve = pct_diff(features.area_under_curve, targets.area_under_curve);

    (composite, pct)
}

/// Reduce all five masses' features to the overall singular response plus
/// per-mass composite measures and percentage-difference records.
pub fn reduce_to_singular_response(
    features: &[CriteriaFeatures; N_MASS],
    targets: &[MassTargets; N_MASS],
    weights: &[MassWeights; N_MASS],
) -> (f64, [f64; N_MASS], [MassPercentageDiffs; N_MASS]) {
    let mut composite_per_mass = [0.0; N_MASS];
    let mut pct_per_mass: [MassPercentageDiffs; N_MASS] = Default::default();
    let mut singular_response = 0.0;

    for i in 0..N_MASS {
        let (composite, pct) = reduce_mass(&features[i], &targets[i], &weights[i]);
        composite_per_mass[i] = composite;
        pct_per_mass[i] = pct;
        singular_response += composite;
    }

    (singular_response, composite_per_mass, pct_per_mass)
}
