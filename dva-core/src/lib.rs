//! DVA parameter optimization campaigns: the fitness function, six
//! optimization engines, the benchmark harness, Sobol sensitivity analysis,
//! the omega-points convergence helper, and campaign configuration.

pub mod benchmark;
pub mod cli;
pub mod config;
pub mod engines;
pub mod error;
pub mod fitness;
pub mod omega_conv;
pub mod sobol;

pub use config::{Campaign, FrequencySpec, MainParamsSpec, ParameterSpec};
pub use error::DvaError;
pub use fitness::{FitnessContext, FitnessOutcome, PENALTY};
