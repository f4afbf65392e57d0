//! Splitting an array into contiguous, worker-sized index ranges.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::ports::CoreError;

/// A contiguous half-open index range `[begin, end)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Position of this partition in the run (0-based).
    pub index: usize,
    /// First index covered.
    pub begin: usize,
    /// One past the last index covered.
    pub end: usize,
}

impl Partition {
    /// Create a new partition.
    #[must_use]
    pub const fn new(index: usize, begin: usize, end: usize) -> Self {
        Self { index, begin, end }
    }

    /// Number of elements covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Whether the range covers no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// The range as a `Range<usize>` for slicing.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.begin..self.end
    }
}

/// Split `len` elements into `count` contiguous partitions.
///
/// Every partition but the last spans `len / count` elements; the last one
/// absorbs the remainder. When `count > len` the chunk size is zero, so all
/// leading partitions are empty and the last spans the whole array.
pub fn partition(len: usize, count: usize) -> Result<Vec<Partition>, CoreError> {
    if count == 0 {
        return Err(CoreError::Validation(
            "partition count must be at least 1".to_string(),
        ));
    }

    let chunk = len / count;
    let partitions = (0..count)
        .map(|index| {
            let begin = index * chunk;
            let end = if index == count - 1 {
                len
            } else {
                (index + 1) * chunk
            };
            Partition::new(index, begin, end)
        })
        .collect();

    Ok(partitions)
}
