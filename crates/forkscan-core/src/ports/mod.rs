//! Port definitions (trait abstractions) for infrastructure the core depends on.
//!
//! # Design Rules
//!
//! - No process, pipe, or filesystem types in any signature
//! - Transports are seen only through [`ResultChannel`]

pub mod result_channel;

use thiserror::Error;

pub use result_channel::ResultChannel;

/// Why a result channel yielded nothing usable.
///
/// None of these abort a run: the partition is recorded as "no result" and
/// the aggregate is built from whatever did arrive.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The worker never wrote a result (killed, crashed, or empty partition).
    #[error("no result from {0}")]
    Empty(String),

    /// Something was written but it is not a valid min/max pair.
    #[error("malformed result from {source_name}: {detail}")]
    Malformed { source_name: String, detail: String },

    /// The channel could not be read.
    #[error("failed to read {source_name}: {reason}")]
    Io { source_name: String, reason: String },

    /// The channel did not deliver within its read bound.
    #[error("timed out reading {0}")]
    TimedOut(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (CLI exit codes, runtime
/// run errors).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid run configuration.
    #[error(transparent)]
    Configuration(#[from] crate::config::ConfigError),

    /// Output directory could not be prepared.
    #[error(transparent)]
    Path(#[from] crate::paths::PathError),
}
