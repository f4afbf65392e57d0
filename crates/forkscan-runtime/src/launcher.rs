//! How worker processes are started.
//!
//! The supervisor only needs a [`Command`] per partition; it adds the stdio
//! wiring and the transport arguments itself. The production launcher
//! re-executes the current binary in worker mode.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

use forkscan_core::Partition;
use tokio::process::Command;

/// Subcommand the coordinator binary uses to enter worker mode.
pub const WORKER_SUBCOMMAND: &str = "worker";

/// Builds the command for one worker process.
pub trait WorkerLauncher: Send + Sync {
    /// Command for the worker bound to `partition`.
    fn command(&self, partition: &Partition) -> Command;
}

/// Launches `program [args..] --index <i>`.
#[derive(Debug, Clone)]
pub struct ExecutableLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ExecutableLauncher {
    /// Launch `program` with a fixed argument prefix.
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Re-execute the running binary as `<exe> worker`.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, [WORKER_SUBCOMMAND]))
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }
}

impl WorkerLauncher for ExecutableLauncher {
    fn command(&self, partition: &Partition) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--index")
            .arg(partition.index.to_string());
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_partition_index() {
        let launcher = ExecutableLauncher::new("/usr/bin/forkscan", [WORKER_SUBCOMMAND]);
        let command = launcher.command(&Partition::new(3, 30, 40));
        let std_cmd = command.as_std();
        assert_eq!(std_cmd.get_program(), "/usr/bin/forkscan");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, ["worker", "--index", "3"]);
    }

    #[test]
    fn test_current_exe_enters_worker_mode() {
        let launcher = ExecutableLauncher::current_exe().unwrap();
        assert!(launcher.program().is_absolute());
        let command = launcher.command(&Partition::new(0, 0, 1));
        assert_eq!(command.as_std().get_args().next().unwrap(), WORKER_SUBCOMMAND);
    }
}
