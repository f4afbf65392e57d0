//! Byte-pipe transport.
//!
//! The pipe is the worker's stdout, created before spawn. The child holds
//! only the write end and the coordinator only the read end. The worker
//! writes exactly [`Extrema::WIRE_SIZE`] bytes: `min` then `max`, both
//! little-endian `i32`.

use std::io::{self, Write};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use forkscan_core::{ChannelError, Extrema, Partition, ResultChannel, TransportKind};
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tokio::time::timeout;

use super::{ResultSink, Transport};
use crate::error::ProcessError;

/// Pipe transport; one pipe per worker.
#[derive(Debug, Clone)]
pub struct PipeTransport {
    read_timeout: Duration,
}

impl PipeTransport {
    pub const fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }
}

impl Transport for PipeTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Pipe
    }

    fn prepare(&self, _partition: &Partition, command: &mut Command) -> Result<(), ProcessError> {
        command.stdout(Stdio::piped());
        Ok(())
    }

    fn bind(
        &self,
        partition: &Partition,
        child: &mut Child,
    ) -> Result<Box<dyn ResultChannel>, ProcessError> {
        let stdout = child.stdout.take().ok_or_else(|| ProcessError::ChannelSetup {
            index: partition.index,
            reason: "worker stdout was not captured".to_string(),
        })?;
        Ok(Box::new(PipeChannel {
            index: partition.index,
            stdout,
            read_timeout: self.read_timeout,
        }))
    }

    fn cleanup(&self, _partition: &Partition) {}
}

/// Coordinator end of one worker's pipe.
pub struct PipeChannel {
    index: usize,
    stdout: ChildStdout,
    read_timeout: Duration,
}

impl PipeChannel {
    /// Read until the buffer is full or the writer closes; returns bytes read.
    async fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]).await? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}

#[async_trait]
impl ResultChannel for PipeChannel {
    async fn receive(&mut self) -> Result<Extrema, ChannelError> {
        let mut buf = [0u8; Extrema::WIRE_SIZE];
        let read_timeout = self.read_timeout;

        let outcome = timeout(read_timeout, self.fill(&mut buf)).await;
        let filled = match outcome {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                return Err(ChannelError::Io {
                    source_name: self.describe(),
                    reason: e.to_string(),
                });
            }
            Err(_) => return Err(ChannelError::TimedOut(self.describe())),
        };

        match filled {
            0 => Err(ChannelError::Empty(self.describe())),
            Extrema::WIRE_SIZE => {
                Extrema::from_le_bytes(buf).ok_or_else(|| ChannelError::Malformed {
                    source_name: self.describe(),
                    detail: "min is greater than max".to_string(),
                })
            }
            n => Err(ChannelError::Malformed {
                source_name: self.describe(),
                detail: format!("truncated result: {n} of {} bytes", Extrema::WIRE_SIZE),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("pipe #{}", self.index)
    }
}

/// Worker end of the pipe: any writer, normally stdout.
pub struct PipeSink<W: Write> {
    writer: W,
}

impl<W: Write> PipeSink<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for PipeSink<W> {
    fn deliver(&mut self, extrema: Extrema) -> io::Result<()> {
        self.writer.write_all(&extrema.to_le_bytes())?;
        self.writer.flush()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn spawn_writer(transport: &PipeTransport, script: &str) -> (Child, Box<dyn ResultChannel>) {
        let partition = Partition::new(0, 0, 1);
        let mut command = Command::new("sh");
        command.arg("-c").arg(script).stdin(Stdio::null());
        transport.prepare(&partition, &mut command).unwrap();
        let mut child = command.spawn().expect("failed to spawn sh");
        let channel = transport.bind(&partition, &mut child).unwrap();
        (child, channel)
    }

    #[tokio::test]
    async fn test_reads_binary_pair() {
        let transport = PipeTransport::new(Duration::from_secs(5));
        let (mut child, mut channel) =
            spawn_writer(&transport, r"printf '\001\000\000\000\004\000\000\000'");
        child.wait().await.unwrap();
        assert_eq!(channel.receive().await.unwrap(), Extrema::new(1, 4).unwrap());
    }

    #[tokio::test]
    async fn test_closed_pipe_without_data_is_empty() {
        let transport = PipeTransport::new(Duration::from_secs(5));
        let (mut child, mut channel) = spawn_writer(&transport, "exit 0");
        child.wait().await.unwrap();
        assert!(matches!(channel.receive().await, Err(ChannelError::Empty(_))));
    }

    #[tokio::test]
    async fn test_short_write_is_malformed() {
        let transport = PipeTransport::new(Duration::from_secs(5));
        let (mut child, mut channel) = spawn_writer(&transport, "printf 'abc'");
        child.wait().await.unwrap();
        assert!(matches!(
            channel.receive().await,
            Err(ChannelError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_silent_writer_times_out() {
        let transport = PipeTransport::new(Duration::from_millis(50));
        let (mut child, mut channel) = spawn_writer(&transport, "exec sleep 5");
        assert!(matches!(channel.receive().await, Err(ChannelError::TimedOut(_))));
        child.start_kill().unwrap();
        child.wait().await.unwrap();
    }

    #[test]
    fn test_sink_writes_wire_form() {
        let mut sink = PipeSink::new(Vec::new());
        sink.deliver(Extrema::new(-1, 2).unwrap()).unwrap();
        assert_eq!(sink.into_inner(), [255, 255, 255, 255, 2, 0, 0, 0]);
    }
}
