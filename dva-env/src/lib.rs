//! DVA environment and parallelism utilities
//!
//! This crate centralizes environment variable handling and directory
//! resolution that is shared across the workspace, following the same
//! pattern as a typed-error environment helper: a pure resolver function
//! per concern, no panicking variants.

pub mod constants;
pub mod env_utils;

pub use constants::{DEFAULT_SNAPSHOT_DIR, ENV_THREADS};
pub use env_utils::{check_snapshot_dir, snapshot_dir, thread_count, EnvError};
