//! Environment variable and directory utilities.

use crate::constants::{DEFAULT_SNAPSHOT_DIR, ENV_THREADS};
use std::env;
use std::path::PathBuf;

/// Error type for environment-related failures.
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("{0} is set to a non-numeric value: {1}")]
    ThreadsNotNumeric(&'static str, String),

    #[error("failed to create snapshot directory {0}: {1}")]
    SnapshotDirCreationFailed(PathBuf, std::io::Error),
}

/// Resolve the number of worker threads to use for rayon-parallel
/// fitness evaluation.
///
/// Reads `DEVANA_THREADS`; unset or `0` falls back to
/// [`num_cpus::get`]. A non-numeric value is an error rather than a
/// silent fallback, so misconfiguration is visible.
pub fn thread_count() -> Result<usize, EnvError> {
    match env::var(ENV_THREADS) {
        Err(_) => Ok(num_cpus::get()),
        Ok(raw) => {
            let n: usize = raw
                .parse()
                .map_err(|_| EnvError::ThreadsNotNumeric(ENV_THREADS, raw.clone()))?;
            if n == 0 {
                Ok(num_cpus::get())
            } else {
                Ok(n)
            }
        }
    }
}

/// Resolve (and create) the directory used for benchmark/Sobol snapshot
/// exports when the caller does not supply an explicit path.
pub fn snapshot_dir() -> Result<PathBuf, EnvError> {
    let dir = PathBuf::from(DEFAULT_SNAPSHOT_DIR);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| EnvError::SnapshotDirCreationFailed(dir.clone(), e))?;
    }
    Ok(dir)
}

/// Diagnostic check used by the CLI's `--check-env` style entry points.
pub fn check_snapshot_dir() -> Result<(), EnvError> {
    let dir = snapshot_dir()?;
    println!("snapshot directory: {}", dir.display());
    Ok(())
}
