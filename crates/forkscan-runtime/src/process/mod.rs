//! Worker process lifecycle: spawn, wait, kill, reap.

mod handle;
mod shutdown;
mod supervisor;

pub use handle::{WorkerHandle, WorkerState};
pub use shutdown::{exit_kind, force_kill};
pub use supervisor::{Supervisor, WaitOutcome};
