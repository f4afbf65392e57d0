//! Per-worker bookkeeping owned by the supervisor.

use std::io;
use std::process::ExitStatus;

use forkscan_core::{ExitKind, ResultChannel, WorkerOutcome};
use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::shutdown::{exit_kind, force_kill};
use crate::error::ProcessError;

/// Lifecycle of one worker process.
///
/// `Spawned → Running → {Reported | Killed} → Reaped`. `Spawned → Killed`
/// is also allowed for a worker torn down while a run aborts mid-spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Process exists, result channel bound.
    Spawned,
    /// Input is being fed; the supervisor is waiting on its exit.
    Running,
    /// Exited on its own (its result may still be missing or invalid).
    Reported,
    /// Exited because the supervisor killed it.
    Killed,
    /// Exit status collected; the process-table entry is gone.
    Reaped,
}

impl WorkerState {
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Spawned, Self::Running | Self::Killed)
                | (Self::Running, Self::Reported | Self::Killed)
                | (Self::Reported | Self::Killed, Self::Reaped)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Reaped)
    }
}

/// Exit notification sent by a worker's reaper task.
#[derive(Debug)]
pub(crate) struct ExitEvent {
    pub id: usize,
    pub status: io::Result<ExitStatus>,
    pub killed: bool,
}

/// Wait on `child` until it exits or a kill request arrives, then report.
///
/// This task is the only place the child is ever waited on, so every
/// spawned process is reaped exactly once.
async fn reap(
    id: usize,
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<ExitEvent>,
) {
    let exited = tokio::select! {
        status = child.wait() => Some(status),
        Ok(()) = kill_rx => None,
    };

    let (status, killed) = match exited {
        Some(status) => (status, false),
        None => {
            debug!(worker = id, "Delivering SIGKILL");
            (force_kill(&mut child).await, true)
        }
    };

    // The receiver only goes away when the supervisor itself is dropped.
    let _ = events.send(ExitEvent { id, status, killed });
}

/// Supervisor-side record of one worker process.
pub struct WorkerHandle {
    id: usize,
    pid: Option<u32>,
    state: WorkerState,
    kill_switch: Option<oneshot::Sender<()>>,
    reaper: Option<JoinHandle<()>>,
    feeder: Option<JoinHandle<()>>,
    channel: Option<Box<dyn ResultChannel>>,
    exit: Option<ExitKind>,
    killed: bool,
    reap_count: usize,
}

impl WorkerHandle {
    /// Take ownership of a spawned child and start its reaper task.
    pub(crate) fn start(
        id: usize,
        child: Child,
        channel: Box<dyn ResultChannel>,
        events: mpsc::UnboundedSender<ExitEvent>,
    ) -> Self {
        let pid = child.id();
        let (kill_tx, kill_rx) = oneshot::channel();
        let reaper = tokio::spawn(reap(id, child, kill_rx, events));

        Self {
            id,
            pid,
            state: WorkerState::Spawned,
            kill_switch: Some(kill_tx),
            reaper: Some(reaper),
            feeder: None,
            channel: Some(channel),
            exit: None,
            killed: false,
            reap_count: 0,
        }
    }

    pub const fn id(&self) -> usize {
        self.id
    }

    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub const fn state(&self) -> WorkerState {
        self.state
    }

    /// How many times this worker's exit status was collected (must end at 1).
    pub const fn reap_count(&self) -> usize {
        self.reap_count
    }

    pub const fn exit(&self) -> Option<ExitKind> {
        self.exit
    }

    pub(crate) fn transition(&mut self, next: WorkerState) -> Result<(), ProcessError> {
        if !self.state.can_transition_to(next) {
            return Err(ProcessError::InvalidTransition {
                index: self.id,
                from: self.state,
                to: next,
            });
        }
        debug!(worker = self.id, from = ?self.state, to = ?next, "Worker state change");
        self.state = next;
        Ok(())
    }

    pub(crate) fn attach_feeder(&mut self, feeder: JoinHandle<()>) {
        self.feeder = Some(feeder);
    }

    /// Ask the reaper to SIGKILL the process. Idempotent; never blocks.
    ///
    /// Returns `true` if a kill request was actually sent.
    pub(crate) fn request_kill(&mut self) -> bool {
        if !matches!(self.state, WorkerState::Spawned | WorkerState::Running) {
            return false;
        }
        match self.kill_switch.take() {
            // The reaper may already have finished; then the exit is simply in flight.
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Record the exit event produced by this worker's reaper.
    pub(crate) fn record_exit(&mut self, event: &ExitEvent) -> Result<(), ProcessError> {
        let next = if event.killed {
            WorkerState::Killed
        } else {
            WorkerState::Reported
        };
        self.exit = Some(exit_kind(&event.status));
        self.killed = event.killed;
        self.kill_switch = None;
        self.transition(next)
    }

    /// Join the reaper task, then stop the input feeder.
    pub(crate) async fn join(&mut self) {
        if let Some(reaper) = self.reaper.take() {
            if let Err(e) = reaper.await {
                warn!(worker = self.id, error = %e, "Reaper task failed");
            }
        }
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
            let _ = feeder.await;
        }
    }

    /// Final transition once the exit event has been recorded and the reaper joined.
    pub(crate) fn mark_reaped(&mut self) -> Result<(), ProcessError> {
        self.transition(WorkerState::Reaped)?;
        self.reap_count += 1;
        Ok(())
    }

    pub(crate) fn take_channel(&mut self) -> Option<Box<dyn ResultChannel>> {
        self.channel.take()
    }

    /// Diagnostics for the run report; `reported` is filled in by the caller.
    pub fn outcome(&self) -> WorkerOutcome {
        WorkerOutcome {
            index: self.id,
            pid: self.pid,
            exit: self.exit.unwrap_or(ExitKind::Unknown),
            killed: self.killed,
            reported: false,
        }
    }
}
