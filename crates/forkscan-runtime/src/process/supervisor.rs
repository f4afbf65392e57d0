//! Worker process supervision.
//!
//! The supervisor owns every [`WorkerHandle`] for one run. Exits are
//! multiplexed over a single event channel fed by per-worker reaper tasks, so
//! waiting never polls and never blocks on one particular child.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use forkscan_core::{DEFAULT_GRACE_PERIOD, Partition, ResultChannel, WorkerOutcome};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use super::handle::{ExitEvent, WorkerHandle, WorkerState};
use super::shutdown::force_kill;
use crate::deadline::TimeoutController;
use crate::error::ProcessError;
use crate::launcher::WorkerLauncher;
use crate::transport::Transport;
use crate::worker::encode_input;

/// How [`Supervisor::wait`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every worker exited before the deadline.
    Completed,
    /// The deadline fired; remaining workers were killed.
    TimedOut,
}

enum Step {
    Exit(Option<ExitEvent>),
    Deadline,
}

/// Spawns, tracks, kills and reaps the workers of one run.
pub struct Supervisor {
    handles: Vec<WorkerHandle>,
    events_tx: mpsc::UnboundedSender<ExitEvent>,
    events_rx: mpsc::UnboundedReceiver<ExitEvent>,
    /// Workers whose exit has not been observed yet.
    active: usize,
    grace_period: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD)
    }
}

impl Supervisor {
    /// Create a supervisor that waits at most `grace_period` for killed
    /// workers to report their exit.
    pub fn new(grace_period: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            handles: Vec::new(),
            events_tx,
            events_rx,
            active: 0,
            grace_period,
        }
    }

    pub fn handles(&self) -> &[WorkerHandle] {
        &self.handles
    }

    /// Number of worker processes created so far.
    pub fn spawned(&self) -> usize {
        self.handles.len()
    }

    /// Workers still running as far as the supervisor knows.
    pub const fn active(&self) -> usize {
        self.active
    }

    /// Spawn one worker per non-empty partition.
    ///
    /// Each worker gets its slice of `array` on stdin. If any spawn fails,
    /// the workers already started are killed and reaped before the error
    /// is returned.
    pub async fn spawn_all(
        &mut self,
        partitions: &[Partition],
        array: &Arc<[i32]>,
        launcher: &dyn WorkerLauncher,
        transport: &dyn Transport,
    ) -> Result<(), ProcessError> {
        for partition in partitions.iter().filter(|p| !p.is_empty()) {
            if let Err(e) = self.spawn_one(partition, array, launcher, transport).await {
                warn!(worker = partition.index, error = %e, "Aborting run after spawn failure");
                self.kill_all();
                self.reap_all().await;
                return Err(e);
            }
        }
        info!(workers = self.handles.len(), transport = %transport.kind(), "Workers dispatched");
        Ok(())
    }

    async fn spawn_one(
        &mut self,
        partition: &Partition,
        array: &Arc<[i32]>,
        launcher: &dyn WorkerLauncher,
        transport: &dyn Transport,
    ) -> Result<(), ProcessError> {
        let mut command = launcher.command(partition);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        transport.prepare(partition, &mut command)?;

        let mut child = command.spawn().map_err(|source| ProcessError::SpawnFailed {
            index: partition.index,
            source,
        })?;

        let channel = match transport.bind(partition, &mut child) {
            Ok(channel) => channel,
            Err(e) => {
                if let Err(kill_err) = force_kill(&mut child).await {
                    debug!(worker = partition.index, error = %kill_err, "Failed to kill unbound worker");
                }
                return Err(e);
            }
        };

        let stdin = child.stdin.take();
        let mut handle = WorkerHandle::start(partition.index, child, channel, self.events_tx.clone());
        debug!(worker = partition.index, pid = ?handle.pid(), begin = partition.begin, end = partition.end, "Worker spawned");

        if let Some(mut stdin) = stdin {
            let index = partition.index;
            let array = Arc::clone(array);
            let range = partition.range();
            handle.attach_feeder(tokio::spawn(async move {
                let bytes = encode_input(&array[range]);
                // A killed worker closes its end early; that is not an error here.
                if let Err(e) = stdin.write_all(&bytes).await {
                    debug!(worker = index, error = %e, "Input feed interrupted");
                }
            }));
        }

        let running = handle.transition(WorkerState::Running);
        self.handles.push(handle);
        self.active += 1;
        running
    }

    /// Wait until every worker has exited or the deadline fires.
    pub async fn wait(&mut self, timer: &mut TimeoutController) -> WaitOutcome {
        while self.active > 0 {
            let step = tokio::select! {
                biased;
                event = self.events_rx.recv() => Step::Exit(event),
                () = timer.expired() => Step::Deadline,
            };

            match step {
                Step::Exit(Some(event)) => self.apply(&event),
                // Unreachable while we hold a sender; bail out rather than spin.
                Step::Exit(None) => break,
                Step::Deadline => {
                    timer.fire();
                    warn!(remaining = self.active, "Deadline reached, killing remaining workers");
                    self.kill_all();
                    self.drain_for(self.grace_period).await;
                    return WaitOutcome::TimedOut;
                }
            }
        }

        timer.disarm();
        WaitOutcome::Completed
    }

    /// Keep recording exits until none remain or `grace` elapses.
    async fn drain_for(&mut self, grace: Duration) {
        let deadline = Instant::now() + grace;
        while self.active > 0 {
            match timeout_at(deadline, self.events_rx.recv()).await {
                Ok(Some(event)) => self.apply(&event),
                Ok(None) | Err(_) => break,
            }
        }
        if self.active > 0 {
            debug!(remaining = self.active, "Grace period over; reaping continues in background");
        }
    }

    fn apply(&mut self, event: &ExitEvent) {
        let Some(handle) = self.handles.iter_mut().find(|h| h.id() == event.id) else {
            warn!(worker = event.id, "Exit event for unknown worker");
            return;
        };

        match handle.record_exit(event) {
            Ok(()) => {
                self.active = self.active.saturating_sub(1);
                debug!(worker = event.id, killed = event.killed, exit = ?handle.exit(), "Worker exited");
            }
            Err(e) => warn!(error = %e, "Unexpected exit event"),
        }
    }

    /// Send a kill request to every worker that has not exited.
    ///
    /// Idempotent and non-blocking; the reaper tasks deliver SIGKILL.
    /// Returns the number of requests sent by this call.
    pub fn kill_all(&mut self) -> usize {
        let sent = self
            .handles
            .iter_mut()
            .map(WorkerHandle::request_kill)
            .filter(|sent| *sent)
            .count();
        if sent > 0 {
            debug!(count = sent, "Kill requests sent");
        }
        sent
    }

    /// Join every reaper and move every handle to `Reaped`.
    ///
    /// Workers that are still running are killed first. Safe to call more
    /// than once; already reaped workers are left alone.
    pub async fn reap_all(&mut self) -> Vec<WorkerOutcome> {
        self.kill_all();

        for handle in &mut self.handles {
            handle.join().await;
        }

        // Every reaper has finished, so every exit event is already queued.
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(&event);
        }

        for handle in self.handles.iter_mut().filter(|h| !h.state().is_terminal()) {
            if let Err(e) = handle.mark_reaped() {
                warn!(error = %e, "Worker could not be marked reaped");
            }
        }

        self.handles.iter().map(WorkerHandle::outcome).collect()
    }

    /// Hand over the coordinator ends of all result channels.
    pub fn take_channels(&mut self) -> Vec<(usize, Box<dyn ResultChannel>)> {
        self.handles
            .iter_mut()
            .filter_map(|h| h.take_channel().map(|c| (h.id(), c)))
            .collect()
    }
}
