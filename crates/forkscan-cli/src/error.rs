//! CLI error type and exit-code mapping.

use forkscan_core::{ConfigError, CoreError};
use forkscan_runtime::RunError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing, malformed or out-of-range arguments.
    #[error("{0}")]
    Arguments(String),

    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Worker process could not be created or wired up.
    #[error("Process error: {0}")]
    Process(String),

    /// IO error (unwritable output directory, missing executable, etc.).
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// - 1: invalid arguments or general failure
    /// - 71: `EX_OSERR`, a worker could not be spawned
    /// - 74: `EX_IOERR`
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) | Self::Core(_) => 1,
            Self::Process(_) => 71,
            Self::Io(_) => 74,
        }
    }

    /// Whether the usage line should follow the message.
    pub const fn shows_usage(&self) -> bool {
        matches!(self, Self::Arguments(_))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Arguments(msg),
            CoreError::Configuration(config_err) => config_err.into(),
            CoreError::Path(path_err) => Self::Io(path_err.to_string()),
        }
    }
}

impl From<RunError> for CliError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::Config(config_err) => config_err.into(),
            RunError::Core(core_err) => core_err.into(),
            RunError::Process(proc_err) => Self::Process(proc_err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
