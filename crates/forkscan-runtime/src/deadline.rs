//! Run-level deadline.
//!
//! Replaces a signal handler flipping global flags: the supervisor races
//! [`TimeoutController::expired`] against worker exits inside `select!`, and
//! the controller itself only tracks state.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};

/// Deadline lifecycle: `Idle → Armed → {Fired | Disarmed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Armed,
    Fired,
    Disarmed,
}

/// One-shot deadline for a single run.
#[derive(Debug)]
pub struct TimeoutController {
    state: TimerState,
    deadline: Option<Instant>,
}

impl Default for TimeoutController {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeoutController {
    pub const fn new() -> Self {
        Self {
            state: TimerState::Idle,
            deadline: None,
        }
    }

    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Arm at dispatch time. A deadline is only set for a positive timeout;
    /// without one the controller is armed but can never fire.
    pub fn arm(&mut self, timeout: Option<Duration>) {
        if self.state != TimerState::Idle {
            return;
        }
        self.deadline = timeout
            .filter(|t| !t.is_zero())
            .map(|t| Instant::now() + t);
        self.state = TimerState::Armed;
    }

    /// Completes when the deadline passes. Pends forever if there is no
    /// deadline or the controller is not armed.
    pub async fn expired(&self) {
        match (self.state, self.deadline) {
            (TimerState::Armed, Some(deadline)) => sleep_until(deadline).await,
            _ => std::future::pending().await,
        }
    }

    /// Transition to `Fired`. Returns `false` on any call after the first
    /// or when the controller was not armed.
    pub fn fire(&mut self) -> bool {
        if self.state != TimerState::Armed {
            return false;
        }
        self.state = TimerState::Fired;
        true
    }

    /// Cancel the deadline once every worker has finished.
    pub fn disarm(&mut self) -> bool {
        if self.state != TimerState::Armed {
            return false;
        }
        self.deadline = None;
        self.state = TimerState::Disarmed;
        true
    }

    pub fn timed_out(&self) -> bool {
        self.state == TimerState::Fired
    }
}
