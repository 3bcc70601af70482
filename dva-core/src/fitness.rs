//! Fitness function (C4): thin wrapper over the mechanical model, FRF
//! evaluator and criterion extractor, adding the sparsity penalty and the
//! non-finite-result penalty floor shared by every optimization engine.

use ndarray::Array1;

use dva_model::{
    assemble, extract_criteria, reduce_to_singular_response, sweep, CriteriaFeatures, MainParams,
    MassPercentageDiffs, MassTargets, MassWeights, N_MASS,
};

/// Fitness value substituted whenever the underlying computation produces a
/// non-finite singular response (invariant 4, §8 of the requirements).
pub const PENALTY: f64 = 1e6;

/// Full evaluation outcome: the scalar fitness plus the intermediate
/// singular response and percentage-difference channel NSGA-II's f4
/// objective needs.
#[derive(Debug, Clone)]
pub struct FitnessOutcome {
    pub value: f64,
    pub singular_response: f64,
    pub percentage_differences: [MassPercentageDiffs; N_MASS],
}

/// Holds everything that is constant across a campaign so repeated
/// evaluations (one per candidate, across thousands of generations) avoid
/// re-parsing configuration on every call.
#[derive(Debug, Clone)]
pub struct FitnessContext {
    pub main: MainParams,
    pub omega: Array1<f64>,
    pub targets: [MassTargets; N_MASS],
    pub weights: [MassWeights; N_MASS],
    pub alpha: f64,
}

impl FitnessContext {
    pub fn new(
        main: MainParams,
        omega: Array1<f64>,
        targets: [MassTargets; N_MASS],
        weights: [MassWeights; N_MASS],
        alpha: f64,
    ) -> Self {
        Self { main, omega, targets, weights, alpha }
    }

    /// Full evaluation: C1 -> C2 -> C3 -> C4, returning the singular response
    /// and percentage-difference channel alongside the scalar fitness.
    pub fn evaluate(&self, x: &Array1<f64>) -> FitnessOutcome {
        let sys = match assemble(&self.main, x) {
            Ok(sys) => sys,
            Err(_) => {
                return FitnessOutcome {
                    value: PENALTY,
                    singular_response: f64::NAN,
                    percentage_differences: Default::default(),
                }
            }
        };
        let frf = sweep(&sys, &self.omega);
        let features: [CriteriaFeatures; N_MASS] =
            std::array::from_fn(|i| extract_criteria(&frf.omega, &frf.magnitude[i]));
        let (singular_response, _composite, percentage_differences) =
            reduce_to_singular_response(&features, &self.targets, &self.weights);

        if !singular_response.is_finite() {
            return FitnessOutcome { value: PENALTY, singular_response, percentage_differences };
        }

        let sparsity: f64 = x.iter().map(|v| v.abs()).sum();
        let value = (singular_response - 1.0).abs() + self.alpha * sparsity;
        if !value.is_finite() {
            return FitnessOutcome { value: PENALTY, singular_response, percentage_differences };
        }

        FitnessOutcome { value, singular_response, percentage_differences }
    }

    /// Scalar-only evaluation, the contract every engine actually consumes.
    pub fn fitness(&self, x: &Array1<f64>) -> f64 {
        self.evaluate(x).value
    }
}
