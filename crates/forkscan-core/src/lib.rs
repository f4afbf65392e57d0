#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod aggregate;
pub mod config;
pub mod extrema;
pub mod generator;
pub mod partition;
pub mod paths;
pub mod ports;
pub mod report;

// Re-export commonly used types for convenience
pub use aggregate::{Aggregate, Aggregator};
pub use config::{
    ConfigError, DEFAULT_GRACE_PERIOD, DEFAULT_READ_TIMEOUT, RunConfig, TransportKind,
};
pub use extrema::Extrema;
pub use generator::generate_array;
pub use partition::{Partition, partition};
pub use paths::{PathError, ensure_output_dir, result_file_name, result_file_path, result_temp_path};
pub use ports::{ChannelError, CoreError, ResultChannel};
pub use report::{ExitKind, RunReport, WorkerOutcome};

