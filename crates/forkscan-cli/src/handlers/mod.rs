//! Command handlers.
//!
//! - [`run`]: the coordinator (default command)
//! - [`worker`]: the hidden worker entry point, one per partition

pub mod run;
pub mod worker;
