//! Run configuration and validation.
//!
//! Pure domain types; adapters (the CLI) build a [`RunConfig`] from their own
//! inputs and call [`RunConfig::validate`] before any work starts.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How long force-killed workers get to propagate their exit before the
/// coordinator stops waiting on exit events and reaps directly.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(100);

/// Upper bound on a single result-channel read.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Result transport between workers and the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Binary pair over the worker's stdout pipe.
    #[default]
    Pipe,
    /// `"<min> <max>"` text file per worker.
    File,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipe => f.write_str("pipe"),
            Self::File => f.write_str("file"),
        }
    }
}

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("seed must be a positive number")]
    InvalidSeed,

    #[error("array_size must be a positive number")]
    InvalidArraySize,

    #[error("pnum must be a positive number")]
    InvalidWorkerCount,

    #[error("output directory cannot be empty")]
    EmptyOutputDir,
}

/// Everything one coordinator run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed for the array generator.
    pub seed: u64,
    /// Number of array elements.
    pub array_size: usize,
    /// Number of partitions (and at most that many worker processes).
    pub workers: usize,
    /// Wall-clock limit for the whole dispatch; `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Result transport, fixed for the whole run.
    pub transport: TransportKind,
    /// Directory for file-transport results.
    pub output_dir: PathBuf,
    /// See [`DEFAULT_GRACE_PERIOD`].
    pub grace_period: Duration,
    /// See [`DEFAULT_READ_TIMEOUT`].
    pub read_timeout: Duration,
}

impl RunConfig {
    /// Create a configuration with defaults for everything optional.
    pub fn new(seed: u64, array_size: usize, workers: usize) -> Self {
        Self {
            seed,
            array_size,
            workers,
            timeout: None,
            transport: TransportKind::default(),
            output_dir: PathBuf::from("."),
            grace_period: DEFAULT_GRACE_PERIOD,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Set the dispatch timeout. Zero means no timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Select the result transport.
    #[must_use]
    pub const fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Set the directory used by the file transport.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the post-kill grace period.
    #[must_use]
    pub const fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seed == 0 {
            return Err(ConfigError::InvalidSeed);
        }
        if self.array_size == 0 {
            return Err(ConfigError::InvalidArraySize);
        }
        self.validate_dispatch()
    }

    /// Validate only what dispatching a caller-supplied array needs.
    ///
    /// `seed` and `array_size` are generation inputs and are ignored.
    pub fn validate_dispatch(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.transport == TransportKind::File && self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyOutputDir);
        }
        Ok(())
    }
}
