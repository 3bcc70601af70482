//! Typed error taxonomy shared by every component, following the same
//! one-enum-per-concern pattern as `dva_env::EnvError`.

use thiserror::Error;

/// Errors surfaced by campaign validation, engines and analysis components.
#[derive(Debug, Error)]
pub enum DvaError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("numeric failure: {0}")]
    NumericFailure(String),

    #[error("infeasible candidate: {0}")]
    Infeasible(String),

    #[error("run aborted by user request")]
    Aborted,

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl DvaError {
    /// Exit-code mapping used by the CLI binary: `InvalidInput` maps to 2
    /// (bad configuration), everything else that escapes to `main` maps to 3.
    pub fn exit_code(&self) -> i32 {
        match self {
            DvaError::InvalidInput(_) => 2,
            _ => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_exit_code_two() {
        assert_eq!(DvaError::InvalidInput("bad".into()).exit_code(), 2);
    }

    #[test]
    fn other_errors_map_to_exit_code_three() {
        assert_eq!(DvaError::Aborted.exit_code(), 3);
        assert_eq!(DvaError::NumericFailure("x".into()).exit_code(), 3);
        assert_eq!(DvaError::Infeasible("x".into()).exit_code(), 3);
        assert_eq!(DvaError::ResourceExhausted("x".into()).exit_code(), 3);
    }
}
