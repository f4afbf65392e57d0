//! Minimum/maximum pair produced by a single range scan.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum and maximum of a non-empty range, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extrema {
    pub min: i32,
    pub max: i32,
}

impl Extrema {
    /// Size of the binary encoding used on the pipe transport.
    pub const WIRE_SIZE: usize = 8;

    /// Create a pair, returning `None` if `min > max`.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Option<Self> {
        if min > max {
            None
        } else {
            Some(Self { min, max })
        }
    }

    /// Linear scan of a slice. Returns `None` for an empty slice.
    #[must_use]
    pub fn of(values: &[i32]) -> Option<Self> {
        let (&first, rest) = values.split_first()?;
        let mut acc = Self {
            min: first,
            max: first,
        };
        for &value in rest {
            acc.min = acc.min.min(value);
            acc.max = acc.max.max(value);
        }
        Some(acc)
    }

    /// Fold another pair into this one.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Encode as two little-endian `i32` values.
    #[must_use]
    pub fn to_le_bytes(self) -> [u8; Self::WIRE_SIZE] {
        let mut out = [0u8; Self::WIRE_SIZE];
        out[..4].copy_from_slice(&self.min.to_le_bytes());
        out[4..].copy_from_slice(&self.max.to_le_bytes());
        out
    }

    /// Decode two little-endian `i32` values. Rejects `min > max`.
    #[must_use]
    pub fn from_le_bytes(bytes: [u8; Self::WIRE_SIZE]) -> Option<Self> {
        let min = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let max = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Self::new(min, max)
    }

    /// Parse the `"<min> <max>"` text form used by the file transport.
    #[must_use]
    pub fn parse_text(text: &str) -> Option<Self> {
        let mut fields = text.split_whitespace();
        let min = fields.next()?.parse().ok()?;
        let max = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Self::new(min, max)
    }
}

impl fmt::Display for Extrema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.min, self.max)
    }
}
