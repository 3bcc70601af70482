//! Five-mass DVA mechanical model: matrix assembly, FRF evaluation and
//! criterion extraction (the C1-C3 subsystems consumed by `dva-core`'s
//! fitness function and optimization engines).

pub mod assemble;
pub mod criteria;
pub mod frf;

pub use assemble::{assemble, DvaLayout, MainParams, MechanicalSystem, ModelError, N_DVA, N_MASS};
pub use criteria::{
    extract_criteria, reduce_mass, reduce_to_singular_response, CriteriaFeatures, MassPercentageDiffs,
    MassTargets, MassWeights, N_PAIRS, PAIRS, PEAK_PROMINENCE_FRACTION,
};
pub use frf::{linspace, solve_complex, sweep, FrfResult};

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn default_main() -> MainParams {
        MainParams {
            mu: 1.0,
            lambda_main: [0.1; N_MASS],
            nu_main: [0.01; N_MASS],
            a_low: 0.1,
            a_up: 1.0,
            f1: 5.0,
            f2: 12.0,
            omega_dc: 3.0,
            zeta_dc: 0.05,
        }
    }

    /// End-to-end: assemble -> sweep -> extract_criteria -> reduce, exercised
    /// across the public re-exports the way `dva-core`'s fitness function will use them.
    #[test]
    fn full_pipeline_produces_finite_singular_response() {
        let main = default_main();
        let x = Array1::from_elem(N_DVA, 0.3);
        let sys = assemble(&main, &x).unwrap();
        let omega = linspace(0.1, 30.0, 256);
        let frf = sweep(&sys, &omega);

        let mut features: [CriteriaFeatures; N_MASS] = std::array::from_fn(|i| extract_criteria(&frf.omega, &frf.magnitude[i]));
        let targets: [MassTargets; N_MASS] = Default::default();
        let weights: [MassWeights; N_MASS] = Default::default();
        let (singular_response, composite, _pct) = reduce_to_singular_response(&features, &targets, &weights);

        // No targets configured -> every composite and the singular response is zero.
        assert!(singular_response.abs() < 1e-12);
        assert!(composite.iter().all(|c| c.abs() < 1e-12));
        assert!(features.iter_mut().all(|f| f.area_under_curve.is_finite()));
    }
}
