//! Result transports between workers and the coordinator.
//!
//! A transport is chosen once per run. Each has two halves:
//! - coordinator side: [`Transport`] wires the worker command before spawn and
//!   binds a [`ResultChannel`] to the spawned child
//! - worker side: a [`ResultSink`] that delivers the `{min, max}` pair

mod file;
mod pipe;

use std::io;
use std::path::Path;
use std::time::Duration;

use forkscan_core::{Extrema, Partition, ResultChannel, RunConfig, TransportKind};
use tokio::process::{Child, Command};

use crate::error::ProcessError;

pub use file::{FileChannel, FileSink, FileTransport, write_result_file};
pub use pipe::{PipeChannel, PipeSink, PipeTransport};

/// Coordinator-side half of a result transport.
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Configure the worker command before it is spawned.
    fn prepare(&self, partition: &Partition, command: &mut Command) -> Result<(), ProcessError>;

    /// Bind the coordinator end of the channel to a freshly spawned child.
    fn bind(
        &self,
        partition: &Partition,
        child: &mut Child,
    ) -> Result<Box<dyn ResultChannel>, ProcessError>;

    /// Remove anything the run left behind for this partition.
    fn cleanup(&self, partition: &Partition);
}

/// Worker-side half of a result transport.
pub trait ResultSink {
    fn deliver(&mut self, extrema: Extrema) -> io::Result<()>;
}

/// Build the transport selected by `config`.
pub fn for_config(config: &RunConfig) -> Box<dyn Transport> {
    for_kind(config.transport, &config.output_dir, config.read_timeout)
}

/// Build a transport directly, mainly for tests and embedding.
pub fn for_kind(kind: TransportKind, output_dir: &Path, read_timeout: Duration) -> Box<dyn Transport> {
    match kind {
        TransportKind::Pipe => Box::new(PipeTransport::new(read_timeout)),
        TransportKind::File => Box::new(FileTransport::new(output_dir)),
    }
}
