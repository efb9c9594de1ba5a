//! Shard-directory assignment for process log files.

use std::io;
use std::path::PathBuf;

use execd_core::LogsSettings;

/// Distributes per-process log files across a fixed set of shard
/// subdirectories.
///
/// The mapping is `pid % shard_count`, so repeated lookups for the same pid
/// always land in the same shard; no other component tracks the assignment.
#[derive(Debug, Clone)]
pub struct LogsDistributor {
    base_dir: PathBuf,
    shard_count: u64,
}

impl LogsDistributor {
    pub fn new(settings: &LogsSettings) -> Self {
        Self {
            base_dir: settings.logs_dir.clone(),
            shard_count: settings.shard_count.max(1),
        }
    }

    /// Directory holding the given pid's log file, created if absent.
    ///
    /// Fails if the shard path exists and is not a directory.
    pub fn dir_for_pid(&self, pid: u64) -> io::Result<PathBuf> {
        let shard = self.base_dir.join((pid % self.shard_count).to_string());
        match std::fs::metadata(&shard) {
            Ok(meta) if meta.is_dir() => Ok(shard),
            Ok(_) => Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' exists and is not a directory", shard.display()),
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                std::fs::create_dir_all(&shard)?;
                Ok(shard)
            }
            Err(e) => Err(e),
        }
    }

    /// Full log file path for a pid.
    pub fn file_for_pid(&self, pid: u64) -> io::Result<PathBuf> {
        Ok(self.dir_for_pid(pid)?.join(pid.to_string()))
    }
}
