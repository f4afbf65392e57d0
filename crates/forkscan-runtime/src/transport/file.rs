//! Text-file transport.
//!
//! Format: one line
//! ```text
//! <min> <max>
//! ```
//!
//! Files are named `min_max_<index>.txt` inside the run's output directory.
//! Workers write through a temp file + rename, so the coordinator never sees
//! a half-written result.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use forkscan_core::{
    ChannelError, Extrema, Partition, ResultChannel, TransportKind, result_file_path,
    result_temp_path,
};
use tokio::process::{Child, Command};
use tracing::debug;

use super::{ResultSink, Transport};
use crate::error::ProcessError;

/// File transport rooted at one output directory.
#[derive(Debug, Clone)]
pub struct FileTransport {
    dir: PathBuf,
}

impl FileTransport {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Delete a file (idempotent - no error if missing).
fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

impl Transport for FileTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::File
    }

    fn prepare(&self, partition: &Partition, command: &mut Command) -> Result<(), ProcessError> {
        let path = result_file_path(&self.dir, partition.index);

        // A stale file from an earlier run must never be mistaken for this worker's result.
        for stale in [&path, &result_temp_path(&self.dir, partition.index)] {
            remove_if_exists(stale).map_err(|e| ProcessError::ChannelSetup {
                index: partition.index,
                reason: format!("cannot clear {}: {e}", stale.display()),
            })?;
        }

        command.stdout(Stdio::null()).arg("--output").arg(&path);
        Ok(())
    }

    fn bind(
        &self,
        partition: &Partition,
        _child: &mut Child,
    ) -> Result<Box<dyn ResultChannel>, ProcessError> {
        Ok(Box::new(FileChannel::new(result_file_path(
            &self.dir,
            partition.index,
        ))))
    }

    fn cleanup(&self, partition: &Partition) {
        for path in [
            result_file_path(&self.dir, partition.index),
            result_temp_path(&self.dir, partition.index),
        ] {
            if let Err(e) = remove_if_exists(&path) {
                debug!(path = %path.display(), error = %e, "Failed to remove result file");
            }
        }
    }
}

/// Coordinator end of one worker's result file.
#[derive(Debug)]
pub struct FileChannel {
    path: PathBuf,
}

impl FileChannel {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ResultChannel for FileChannel {
    async fn receive(&mut self) -> Result<Extrema, ChannelError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ChannelError::Empty(self.describe()));
            }
            Err(e) => {
                return Err(ChannelError::Io {
                    source_name: self.describe(),
                    reason: e.to_string(),
                });
            }
        };

        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            debug!(path = %self.path.display(), error = %e, "Failed to delete result file");
        }

        Extrema::parse_text(&content).ok_or_else(|| ChannelError::Malformed {
            source_name: self.describe(),
            detail: format!("expected '<min> <max>', got {:?}", content.trim()),
        })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Write a result file atomically using temp file + rename.
///
/// 1. Write to `<path>.tmp`
/// 2. Rename to `<path>` (atomic on Unix)
pub fn write_result_file(path: &Path, extrema: Extrema) -> io::Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, extrema.to_string())?;
    fs::rename(&temp, path)
}

/// Worker end of the file transport.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultSink for FileSink {
    fn deliver(&mut self, extrema: Extrema) -> io::Result<()> {
        write_result_file(&self.path, extrema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_then_deletes_result() {
        let dir = tempdir().unwrap();
        let path = result_file_path(dir.path(), 2);
        FileSink::new(&path)
            .deliver(Extrema::new(-5, 17).unwrap())
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "-5 17");

        let mut channel = FileChannel::new(path.clone());
        assert_eq!(channel.receive().await.unwrap(), Extrema::new(-5, 17).unwrap());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let mut channel = FileChannel::new(result_file_path(dir.path(), 0));
        assert!(matches!(channel.receive().await, Err(ChannelError::Empty(_))));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed_and_removed() {
        let dir = tempdir().unwrap();
        let path = result_file_path(dir.path(), 1);
        fs::write(&path, "not numbers").unwrap();
        let mut channel = FileChannel::new(path.clone());
        assert!(matches!(
            channel.receive().await,
            Err(ChannelError::Malformed { .. })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_prepare_clears_stale_files_and_passes_path() {
        let dir = tempdir().unwrap();
        let transport = FileTransport::new(dir.path());
        let partition = Partition::new(4, 0, 10);
        let stale = result_file_path(dir.path(), 4);
        fs::write(&stale, "1 2").unwrap();
        fs::write(result_temp_path(dir.path(), 4), "1").unwrap();

        let mut command = Command::new("true");
        transport.prepare(&partition, &mut command).unwrap();

        assert!(!stale.exists());
        assert!(!result_temp_path(dir.path(), 4).exists());
        let args: Vec<_> = command.as_std().get_args().collect();
        assert_eq!(args[0], "--output");
        assert_eq!(args[1], stale.as_os_str());
    }

    #[test]
    fn test_cleanup_removes_leftovers() {
        let dir = tempdir().unwrap();
        let transport = FileTransport::new(dir.path());
        let partition = Partition::new(0, 0, 1);
        fs::write(result_file_path(dir.path(), 0), "3 4").unwrap();
        fs::write(result_temp_path(dir.path(), 0), "3").unwrap();

        transport.cleanup(&partition);
        transport.cleanup(&partition);

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
