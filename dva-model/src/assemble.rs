//! Five-mass mechanical model assembly (mass/damping/stiffness matrices and
//! the harmonic forcing vector) from main-system parameters and the 48-wide
//! DVA parameter vector.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use thiserror::Error;

/// Number of masses in the resonator.
pub const N_MASS: usize = 5;
/// Length of the DVA parameter vector.
pub const N_DVA: usize = 48;

/// Fixed ordering of the DVA parameter vector: `beta[15], lambda[15], mu[3], nu[15]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvaLayout;

impl DvaLayout {
    pub const BETA_LEN: usize = 15;
    pub const LAMBDA_LEN: usize = 15;
    pub const MU_LEN: usize = 3;
    pub const NU_LEN: usize = 15;

    pub const BETA_OFFSET: usize = 0;
    pub const LAMBDA_OFFSET: usize = Self::BETA_OFFSET + Self::BETA_LEN;
    pub const MU_OFFSET: usize = Self::LAMBDA_OFFSET + Self::LAMBDA_LEN;
    pub const NU_OFFSET: usize = Self::MU_OFFSET + Self::MU_LEN;
}

/// Main-system parameters, constant for the lifetime of one optimization campaign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainParams {
    /// Mass of the primary structure (mass 1).
    pub mu: f64,
    /// Baseline ground stiffness per mass (main-system contribution, independent of DVA tuning).
    pub lambda_main: [f64; N_MASS],
    /// Baseline ground damping per mass (main-system contribution, independent of DVA tuning).
    pub nu_main: [f64; N_MASS],
    /// Lower bound of the forcing amplitude envelope.
    pub a_low: f64,
    /// Upper bound of the forcing amplitude envelope.
    pub a_up: f64,
    /// First excitation frequency of the two-tone forcing envelope.
    pub f1: f64,
    /// Second excitation frequency of the two-tone forcing envelope.
    pub f2: f64,
    /// Reference (design-center) natural frequency of the primary structure. Must be > 0.
    pub omega_dc: f64,
    /// Reference (design-center) damping ratio of the primary structure, in [0, 1).
    pub zeta_dc: f64,
}

/// Errors raised while assembling or evaluating the mechanical model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("main-system parameter is non-finite or out of range: {0}")]
    InvalidMainParams(String),
    #[error("DVA parameter vector must have length {N_DVA}, got {0}")]
    WrongDvaLength(usize),
    #[error("DVA parameter vector contains a non-finite entry at index {0}")]
    NonFiniteDvaEntry(usize),
}

impl MainParams {
    fn validate(&self) -> Result<(), ModelError> {
        let scalars = [self.mu, self.a_low, self.a_up, self.f1, self.f2, self.omega_dc, self.zeta_dc];
        if scalars.iter().any(|v| !v.is_finite())
            || self.lambda_main.iter().any(|v| !v.is_finite())
            || self.nu_main.iter().any(|v| !v.is_finite())
        {
            return Err(ModelError::InvalidMainParams(
                "non-finite field in MainParams".to_string(),
            ));
        }
        if self.omega_dc <= 0.0 {
            return Err(ModelError::InvalidMainParams(
                "omega_dc must be strictly positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.zeta_dc) {
            return Err(ModelError::InvalidMainParams(
                "zeta_dc must be in [0, 1)".to_string(),
            ));
        }
        Ok(())
    }
}

/// The assembled, frequency-independent part of the mechanical system plus a
/// closure-free forcing builder. Holding the forcing parameters alongside the
/// matrices (rather than returning a boxed closure) keeps `assemble` allocation-free
/// and lets `frf::sweep` call [`MechanicalSystem::forcing`] directly inside its
/// rayon-parallel loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MechanicalSystem {
    pub mass: Array2<f64>,
    pub damping: Array2<f64>,
    pub stiffness: Array2<f64>,
    main: MainParams,
}

impl MechanicalSystem {
    /// Harmonic forcing vector at angular frequency `omega`, applied to the
    /// primary structure (mass 1) only: a two-tone Gaussian envelope between
    /// `[a_low, a_up]` centered on `f1` and `f2`.
    pub fn forcing(&self, omega: f64) -> Array1<Complex64> {
        let bump = |center: f64| -> f64 {
            if center.abs() < f64::EPSILON {
                return 0.0;
            }
            let bw = (center.abs() * 0.1).max(1e-6);
            (-((omega - center) / bw).powi(2)).exp()
        };
        let envelope = bump(self.main.f1).max(bump(self.main.f2));
        let amplitude = self.main.a_low + (self.main.a_up - self.main.a_low) * envelope;
        let mut f = Array1::<Complex64>::zeros(N_MASS);
        f[0] = Complex64::new(amplitude, 0.0);
        f
    }
}

/// Assemble the mass, damping and stiffness matrices from main-system
/// parameters and a DVA parameter vector.
///
/// Topology (serial chain-absorber, see DESIGN.md for the full rationale):
/// mass 1 is the primary structure; masses 2-5 are absorber stages chained
/// 1-2, 2-3, 3-4, 4-5. Each of the four chain connections consumes three
/// consecutive entries of `beta`/`lambda`/`nu` (12 of each, indices 0..12),
/// combined into one effective stiffness/damping/coupling-stiffness value per
/// connection. The remaining three entries of `beta`/`lambda`/`nu` (indices
/// 12..15) apply as direct-to-ground stiffness/damping/coupling terms on
/// masses 2, 3 and 4. The three `mu` entries become the masses of absorber
/// stages 2, 3 and 4; the fourth absorber stage (mass 5) takes their mean,
/// since the parameter vector supplies only three independent mass ratios
/// for four absorber stages. `lambda_main`/`nu_main` (main-system fields,
/// distinct from the DVA `lambda`/`nu` sub-vectors) seed a baseline
/// ground stiffness/damping on every mass, and `omega_dc`/`zeta_dc` seed
/// the primary structure's own ground stiffness/damping.
pub fn assemble(main: &MainParams, x: &Array1<f64>) -> Result<MechanicalSystem, ModelError> {
    main.validate()?;
    if x.len() != N_DVA {
        return Err(ModelError::WrongDvaLength(x.len()));
    }
    if let Some(i) = x.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteDvaEntry(i));
    }

    let beta = x.slice(ndarray::s![DvaLayout::BETA_OFFSET..DvaLayout::BETA_OFFSET + DvaLayout::BETA_LEN]);
    let lambda =
        x.slice(ndarray::s![DvaLayout::LAMBDA_OFFSET..DvaLayout::LAMBDA_OFFSET + DvaLayout::LAMBDA_LEN]);
    let mu = x.slice(ndarray::s![DvaLayout::MU_OFFSET..DvaLayout::MU_OFFSET + DvaLayout::MU_LEN]);
    let nu = x.slice(ndarray::s![DvaLayout::NU_OFFSET..DvaLayout::NU_OFFSET + DvaLayout::NU_LEN]);

    let mut mass_diag = [0.0f64; N_MASS];
    mass_diag[0] = main.mu;
    mass_diag[1] = mu[0];
    mass_diag[2] = mu[1];
    mass_diag[3] = mu[2];
    mass_diag[4] = (mu[0] + mu[1] + mu[2]) / 3.0;
    let mut mass = Array2::<f64>::zeros((N_MASS, N_MASS));
    for i in 0..N_MASS {
        mass[[i, i]] = mass_diag[i];
    }

    let mut stiffness = Array2::<f64>::zeros((N_MASS, N_MASS));
    let mut damping = Array2::<f64>::zeros((N_MASS, N_MASS));

    for (p, q) in [0usize, 1, 2, 3].into_iter().zip([1usize, 2, 3, 4]) {
        let slot = p * 3;
        let k = beta[slot] + beta[slot + 1] + beta[slot + 2];
        let c = lambda[slot] + lambda[slot + 1] + lambda[slot + 2];
        let coupling = nu[slot] + nu[slot + 1] + nu[slot + 2];
        let k_total = k + coupling;
        stiffness[[p, p]] += k_total;
        stiffness[[q, q]] += k_total;
        stiffness[[p, q]] -= k_total;
        stiffness[[q, p]] -= k_total;
        damping[[p, p]] += c;
        damping[[q, q]] += c;
        damping[[p, q]] -= c;
        damping[[q, p]] -= c;
    }

    for (slot, mass_idx) in (0..3).zip([1usize, 2, 3]) {
        let ground_idx = DvaLayout::BETA_LEN - 3 + slot;
        stiffness[[mass_idx, mass_idx]] += beta[ground_idx] + nu[ground_idx];
        damping[[mass_idx, mass_idx]] += lambda[ground_idx];
    }

    for i in 0..N_MASS {
        stiffness[[i, i]] += main.lambda_main[i];
        damping[[i, i]] += main.nu_main[i];
    }
    stiffness[[0, 0]] += main.omega_dc * main.omega_dc * main.mu;
    damping[[0, 0]] += 2.0 * main.zeta_dc * main.omega_dc * main.mu;

    Ok(MechanicalSystem {
        mass,
        damping,
        stiffness,
        main: *main,
    })
}
