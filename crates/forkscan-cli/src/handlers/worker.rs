//! Worker command: reduce the partition on stdin and report it.
//!
//! Stdout is the result pipe when no output file is given, so nothing else
//! may be printed there.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use forkscan_runtime::{FileSink, PipeSink, run_worker};
use tracing::debug;

/// Reduce stdin and deliver through the file at `output`, or stdout.
pub fn execute(index: usize, output: Option<&Path>) -> Result<()> {
    let input = io::stdin().lock();
    let result = match output {
        Some(path) => run_worker(input, &mut FileSink::new(path)),
        None => run_worker(input, &mut PipeSink::new(io::stdout().lock())),
    };

    let extrema = result.with_context(|| format!("worker {index} failed"))?;
    debug!(worker = index, ?extrema, "Worker done");
    Ok(())
}
