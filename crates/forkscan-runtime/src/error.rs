//! Runtime error types.

use std::io;

use forkscan_core::{ConfigError, CoreError};
use thiserror::Error;

use crate::process::WorkerState;

/// Process supervision failures. All of these are fatal for the run.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The OS refused to create a worker process.
    #[error("Failed to spawn worker {index}: {source}")]
    SpawnFailed {
        index: usize,
        #[source]
        source: io::Error,
    },

    /// The worker started but its result channel could not be bound.
    #[error("Failed to set up result channel for worker {index}: {reason}")]
    ChannelSetup { index: usize, reason: String },

    /// A worker handle was asked to make a transition its lifecycle forbids.
    #[error("Worker {index}: invalid state transition {from:?} -> {to:?}")]
    InvalidTransition {
        index: usize,
        from: WorkerState,
        to: WorkerState,
    },
}

/// Fatal run-level error. Partial results and timeouts are not errors; they
/// are reported through [`forkscan_core::RunReport`].
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Worker-side failures, reported through the worker's exit status.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to read partition input: {0}")]
    Input(#[source] io::Error),

    #[error("partition input ends with {0} stray bytes")]
    TrailingBytes(usize),

    #[error("failed to deliver result: {0}")]
    Deliver(#[source] io::Error),
}
