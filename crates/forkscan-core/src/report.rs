//! Outcome of one coordinator run.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::Extrema;
use crate::aggregate::Aggregate;

/// How a worker process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExitKind {
    /// Exited on its own with this status code.
    Exited(i32),
    /// Terminated by this signal number.
    Signaled(i32),
    /// Status was not available.
    Unknown,
}

impl ExitKind {
    /// Whether the worker exited with status 0.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with status {code}"),
            Self::Signaled(signal) => write!(f, "terminated by signal {signal}"),
            Self::Unknown => f.write_str("unknown exit"),
        }
    }
}

/// Per-worker diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerOutcome {
    /// Partition index the worker was bound to.
    pub index: usize,
    /// OS process id at spawn time.
    pub pid: Option<u32>,
    /// How the process ended.
    pub exit: ExitKind,
    /// Whether the coordinator force-killed it.
    pub killed: bool,
    /// Whether its result made it into the aggregate.
    pub reported: bool,
}

/// Result of a full run: aggregate plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Global extremes; `None` when no worker reported.
    pub extrema: Option<Extrema>,
    /// Number of partial results received.
    pub results_received: usize,
    /// Number of partitions; every partition counts, even an empty one.
    pub total_expected: usize,
    /// Number of partitions, including empty ones that were never dispatched.
    pub partitions: usize,
    /// Number of worker processes actually spawned.
    pub dispatched: usize,
    /// Whether the deadline fired.
    pub timed_out: bool,
    /// Wall-clock time from dispatch to aggregate.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    /// One entry per spawned worker, in partition order.
    pub workers: Vec<WorkerOutcome>,
}

impl RunReport {
    /// Assemble a report from a finished aggregate.
    pub fn new(
        aggregate: Aggregate,
        partitions: usize,
        dispatched: usize,
        timed_out: bool,
        elapsed: Duration,
        workers: Vec<WorkerOutcome>,
    ) -> Self {
        Self {
            extrema: aggregate.extrema,
            results_received: aggregate.received,
            total_expected: aggregate.expected,
            partitions,
            dispatched,
            timed_out,
            elapsed,
            workers,
        }
    }

    pub fn global_min(&self) -> Option<i32> {
        self.extrema.map(|e| e.min)
    }

    pub fn global_max(&self) -> Option<i32> {
        self.extrema.map(|e| e.max)
    }

    /// Whether fewer results arrived than there are partitions.
    ///
    /// Empty partitions are never dispatched, so a run with more partitions
    /// than elements is always partial.
    pub const fn is_partial(&self) -> bool {
        self.results_received < self.total_expected
    }

    /// Elapsed time in fractional milliseconds.
    pub fn elapsed_millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}
