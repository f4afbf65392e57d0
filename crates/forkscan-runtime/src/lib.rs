#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod deadline;
pub mod engine;
pub mod error;
pub mod launcher;
pub mod process;
pub mod transport;
pub mod worker;

pub use deadline::{TimeoutController, TimerState};
pub use engine::Coordinator;
pub use error::{ProcessError, RunError, WorkerError};
pub use launcher::{ExecutableLauncher, WORKER_SUBCOMMAND, WorkerLauncher};
pub use process::{Supervisor, WaitOutcome, WorkerHandle, WorkerState};
pub use transport::{
    FileSink, FileTransport, PipeSink, PipeTransport, ResultSink, Transport, write_result_file,
};
pub use worker::{encode_input, read_values, run_worker};
