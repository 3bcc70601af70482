//! Shared constants for the dva workspace.

/// Environment variable that caps the number of worker threads used by
/// rayon-parallel fitness evaluation. Unset or `0` falls back to the
/// number of logical CPUs.
pub const ENV_THREADS: &str = "DEVANA_THREADS";

/// Default directory (relative to the current working directory) used
/// for benchmark and Sobol snapshot exports when `--out` is not given.
pub const DEFAULT_SNAPSHOT_DIR: &str = "dva_generated";
