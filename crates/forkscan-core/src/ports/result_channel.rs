//! Result channel port.
//!
//! One channel per dispatched partition, owned by the coordinator. The
//! concrete transport (byte pipe, text file) lives in the runtime crate.

use async_trait::async_trait;

use super::ChannelError;
use crate::Extrema;

/// Coordinator-side end of a worker's result transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultChannel: Send {
    /// Read the worker's `{min, max}` pair.
    ///
    /// Called once, after the worker has exited or been killed. Anything
    /// other than a complete valid pair is a [`ChannelError`].
    async fn receive(&mut self) -> Result<Extrema, ChannelError>;

    /// Short human-readable name for logs (e.g. `pipe #3`).
    fn describe(&self) -> String;
}
