//! Folding partial results into a global minimum and maximum.
//!
//! The fold is commutative and associative, so the order in which workers
//! finish never changes the aggregate.

use tracing::{debug, warn};

use crate::Extrema;
use crate::ports::ResultChannel;

/// Running fold over the partial results of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregator {
    extrema: Option<Extrema>,
    received: usize,
    skipped: usize,
    expected: usize,
}

/// Final state of an [`Aggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregate {
    /// Global extremes, `None` when nothing was received.
    pub extrema: Option<Extrema>,
    /// Number of partial results folded in.
    pub received: usize,
    /// Number of partial results the run was waiting for.
    pub expected: usize,
}

impl Aggregate {
    /// Whether fewer results arrived than were expected.
    pub const fn is_partial(&self) -> bool {
        self.received < self.expected
    }
}

impl Aggregator {
    /// Start a fold expecting `expected` results.
    pub const fn new(expected: usize) -> Self {
        Self {
            extrema: None,
            received: 0,
            skipped: 0,
            expected,
        }
    }

    /// Fold one received pair.
    pub fn record(&mut self, partial: Extrema) {
        self.extrema = Some(match self.extrema {
            Some(acc) => acc.merge(partial),
            None => partial,
        });
        self.received += 1;
    }

    /// Note a partition that produced no usable result.
    pub const fn skip(&mut self) {
        self.skipped += 1;
    }

    /// Read one channel and fold its result; failures are skipped, not propagated.
    pub async fn collect(&mut self, channel: &mut dyn ResultChannel) -> Option<Extrema> {
        match channel.receive().await {
            Ok(partial) => {
                debug!(channel = %channel.describe(), min = partial.min, max = partial.max, "Result received");
                self.record(partial);
                Some(partial)
            }
            Err(e) => {
                warn!(channel = %channel.describe(), error = %e, "No result for partition");
                self.skip();
                None
            }
        }
    }

    /// Number of results folded so far.
    pub const fn received(&self) -> usize {
        self.received
    }

    /// Number of channels that yielded nothing.
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finish the fold.
    pub const fn finish(self) -> Aggregate {
        Aggregate {
            extrema: self.extrema,
            received: self.received,
            expected: self.expected,
        }
    }
}
