//! Worker-side entry point.
//!
//! A worker reads its partition from stdin as little-endian `i32` values,
//! computes the partition's extremes and delivers them through a
//! [`ResultSink`]. Failures surface as a non-zero exit status; the
//! coordinator then simply finds no result for that partition.

use std::io::Read;

use forkscan_core::Extrema;
use tracing::debug;

use crate::error::WorkerError;
use crate::transport::ResultSink;

const VALUE_SIZE: usize = size_of::<i32>();

/// Encode a partition slice for a worker's stdin.
pub fn encode_input(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Read a whole partition from `input` until EOF.
pub fn read_values(mut input: impl Read) -> Result<Vec<i32>, WorkerError> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes).map_err(WorkerError::Input)?;

    let chunks = bytes.chunks_exact(VALUE_SIZE);
    let stray = chunks.remainder().len();
    if stray != 0 {
        return Err(WorkerError::TrailingBytes(stray));
    }

    Ok(chunks
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Run one worker: read, reduce, deliver.
///
/// An empty partition delivers nothing and returns `Ok(None)`.
pub fn run_worker(input: impl Read, sink: &mut dyn ResultSink) -> Result<Option<Extrema>, WorkerError> {
    let values = read_values(input)?;
    let Some(extrema) = Extrema::of(&values) else {
        debug!("Empty partition, nothing to report");
        return Ok(None);
    };

    debug!(len = values.len(), min = extrema.min, max = extrema.max, "Partition reduced");
    sink.deliver(extrema).map_err(WorkerError::Deliver)?;
    Ok(Some(extrema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{FileSink, PipeSink};
    use forkscan_core::result_file_path;
    use std::io;

    struct FailingSink;

    impl ResultSink for FailingSink {
        fn deliver(&mut self, _extrema: Extrema) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_reduces_partition_to_pipe() {
        let input = encode_input(&[3, 1, 4, 1]);
        let mut sink = PipeSink::new(Vec::new());
        let result = run_worker(input.as_slice(), &mut sink).unwrap();

        assert_eq!(result, Extrema::new(1, 4));
        assert_eq!(sink.into_inner(), Extrema::new(1, 4).unwrap().to_le_bytes());
    }

    #[test]
    fn test_reduces_partition_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = result_file_path(dir.path(), 1);
        let input = encode_input(&[5, 9, 2, 6]);

        run_worker(input.as_slice(), &mut FileSink::new(&path)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2 9");
    }

    #[test]
    fn test_negative_values_survive_encoding() {
        let values = [i32::MIN, -1, 0, i32::MAX];
        assert_eq!(read_values(encode_input(&values).as_slice()).unwrap(), values);
    }

    #[test]
    fn test_empty_input_delivers_nothing() {
        let mut sink = PipeSink::new(Vec::new());
        assert_eq!(run_worker(&[][..], &mut sink).unwrap(), None);
        assert!(sink.into_inner().is_empty());
    }

    #[test]
    fn test_partial_value_is_rejected() {
        let mut input = encode_input(&[7]);
        input.push(0);
        assert!(matches!(
            read_values(input.as_slice()),
            Err(WorkerError::TrailingBytes(1))
        ));
    }

    #[test]
    fn test_delivery_failure_is_reported() {
        let input = encode_input(&[1]);
        assert!(matches!(
            run_worker(input.as_slice(), &mut FailingSink),
            Err(WorkerError::Deliver(_))
        ));
    }
}
