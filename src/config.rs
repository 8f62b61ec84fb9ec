//! Run-wide configuration and the errors that make a run impossible.
//!
//! A [`ConfigError`] is fatal: it is raised before the first page URL is
//! touched and aborts the whole batch.

use std::path::PathBuf;

use thiserror::Error;

/// Minimum number of concurrent batch workers.
pub const MIN_JOBS: usize = 1;

/// Maximum number of concurrent batch workers.
pub const MAX_JOBS: usize = 16;

/// Errors that prevent a batch run from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// More than one transfer backend was requested for the same run.
    #[error(
        "conflicting transfer backends: {first} and {second} were both selected\n  Suggestion: pass at most one of --wget / --curl"
    )]
    ConflictingBackends {
        /// First backend requested.
        first: &'static str,
        /// Second backend requested.
        second: &'static str,
    },

    /// The executable configured for an external backend could not be found.
    #[error(
        "transfer executable '{program}' not found: {reason}\n  Suggestion: install it or pass its full path"
    )]
    ExecutableNotFound {
        /// Program name or path as configured.
        program: String,
        /// Why lookup failed.
        reason: String,
    },

    /// Worker count outside the supported range.
    #[error("invalid job count {value}: must be between {MIN_JOBS} and {MAX_JOBS}")]
    InvalidJobs {
        /// The rejected value.
        value: usize,
    },

    /// The HTTP session could not be built from the supplied settings.
    #[error("HTTP session cannot be built: {source}")]
    HttpClient {
        /// Underlying client builder error.
        #[source]
        source: reqwest::Error,
    },
}

/// Per-run policy shared read-only by every batch item.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory; each title gets its own sub-directory below it.
    pub destination_root: PathBuf,
    /// Replace files that already exist.
    pub overwrite: bool,
    /// Resolve and log, but never invoke a transfer backend.
    pub skip_transfer: bool,
    /// Number of items processed at once.
    pub jobs: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            destination_root: PathBuf::from("."),
            overwrite: false,
            skip_transfer: false,
            jobs: MIN_JOBS,
        }
    }
}

impl RunConfig {
    /// Checks values that clap or the config file could not constrain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJobs`] when `jobs` is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_JOBS..=MAX_JOBS).contains(&self.jobs) {
            return Err(ConfigError::InvalidJobs { value: self.jobs });
        }
        Ok(())
    }
}
