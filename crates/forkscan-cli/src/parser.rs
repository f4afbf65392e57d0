//! Command-line parser.
//!
//! Numeric flags are parsed as signed integers so that zero and negative
//! values reach [`Cli::run_config`] and get a specific diagnostic instead of
//! a generic parse error.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use forkscan_core::{ConfigError, RunConfig, TransportKind};

use crate::error::CliError;

/// Parallel min/max over a generated array, one worker process per partition.
#[derive(Debug, Parser)]
#[command(name = "forkscan")]
#[command(about = "Parallel min/max search across worker processes")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Seed for the generated array
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i64>,

    /// Number of array elements
    #[arg(long = "array_size", allow_negative_numbers = true)]
    pub array_size: Option<i64>,

    /// Number of partitions (one worker process each)
    #[arg(long, allow_negative_numbers = true)]
    pub pnum: Option<i64>,

    /// Kill workers still running after this many seconds (0 disables)
    #[arg(long, allow_negative_numbers = true, default_value_t = 0)]
    pub timeout: i64,

    /// Exchange results through files instead of pipes
    #[arg(short = 'f', long = "by_files")]
    pub by_files: bool,

    /// Directory for result files
    #[arg(long = "output-dir", env = "FORKSCAN_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reduce one partition read from stdin (internal)
    #[command(hide = true)]
    Worker {
        /// Partition index
        #[arg(long)]
        index: usize,

        /// Write the result to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn required(value: Option<i64>, flag: &str) -> Result<i64, CliError> {
    value.ok_or_else(|| CliError::Arguments(format!("missing required option --{flag}")))
}

fn positive<T: TryFrom<i64>>(value: i64, err: ConfigError) -> Result<T, ConfigError> {
    if value <= 0 {
        return Err(err);
    }
    T::try_from(value).map_err(|_| err)
}

impl Cli {
    /// Build the run configuration from the coordinator flags.
    pub fn run_config(&self) -> Result<RunConfig, CliError> {
        let seed = positive(required(self.seed, "seed")?, ConfigError::InvalidSeed)?;
        let array_size = positive(
            required(self.array_size, "array_size")?,
            ConfigError::InvalidArraySize,
        )?;
        let workers = positive(required(self.pnum, "pnum")?, ConfigError::InvalidWorkerCount)?;

        let mut config = RunConfig::new(seed, array_size, workers);
        if self.timeout > 0 {
            config = config.with_timeout(Duration::from_secs(self.timeout.unsigned_abs()));
        }
        if self.by_files {
            config = config.with_transport(TransportKind::File);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }

        config.validate()?;
        Ok(config)
    }
}
