//! Forced termination for `tokio::process::Child` workers.
//!
//! Workers have nothing to clean up and are never asked to stop gracefully,
//! so there is no SIGTERM phase: the supervisor goes straight to SIGKILL and
//! then reaps.

use std::io;
use std::process::ExitStatus;

use forkscan_core::ExitKind;
use tokio::process::Child;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Kill a child process with SIGKILL and reap it.
///
/// # Platform behavior
/// - Unix: Uses nix to deliver SIGKILL; `ESRCH` (already gone) is not an error
/// - Windows: Calls `.start_kill()` (TerminateProcess)
///
/// # Returns
/// - `Ok(ExitStatus)` once the process has been reaped
/// - `Err` if signalling or waiting fails
pub async fn force_kill(child: &mut Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        kill_unix(child).await
    }

    #[cfg(not(unix))]
    {
        child.start_kill()?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn kill_unix(child: &mut Child) -> io::Result<ExitStatus> {
    // No PID means the child has already been waited on.
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    match signal::kill(Pid::from_raw(pid), Signal::SIGKILL) {
        // Exited but not yet reaped still counts as present; either way wait() collects it.
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => return Err(io::Error::other(e)),
    }

    child.wait().await
}

/// Classify a wait result for reporting.
pub fn exit_kind(status: &io::Result<ExitStatus>) -> ExitKind {
    let Ok(status) = status else {
        return ExitKind::Unknown;
    };

    if let Some(code) = status.code() {
        return ExitKind::Exited(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitKind::Signaled(signal);
        }
    }

    ExitKind::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    #[cfg(unix)]
    async fn test_kills_running_process() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        let status = force_kill(&mut child).await;
        assert_eq!(exit_kind(&status), ExitKind::Signaled(9));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_handles_already_exited() {
        let mut child = Command::new("true").spawn().expect("failed to spawn true");

        // Give it time to exit (it stays a zombie until reaped)
        sleep(Duration::from_millis(100)).await;

        let status = force_kill(&mut child).await;
        assert_eq!(exit_kind(&status), ExitKind::Exited(0));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn test_handles_already_reaped() {
        let mut child = Command::new("true").spawn().expect("failed to spawn true");
        child.wait().await.unwrap();

        let status = force_kill(&mut child).await;
        assert_eq!(exit_kind(&status), ExitKind::Exited(0));
    }

    #[test]
    fn test_wait_error_is_unknown() {
        let status: io::Result<ExitStatus> = Err(io::Error::other("boom"));
        assert_eq!(exit_kind(&status), ExitKind::Unknown);
    }
}
