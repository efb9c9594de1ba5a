//! Settings for process log storage.
//!
//! Pure domain types with no infrastructure dependencies; the application
//! root deserializes these from its configuration source and hands them to
//! the runtime.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default number of shard subdirectories log files are distributed across.
pub const DEFAULT_SHARD_COUNT: u64 = 16;

/// Default buffered bytes before a log store flushes to disk.
///
/// The threshold trades durability against write amplification: flushing
/// every line would make disk I/O the bottleneck of the pumping path, while
/// unbounded buffering risks losing output on a crash.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 8192;

/// Log storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogsSettings {
    /// Base directory for per-process log files.
    pub logs_dir: PathBuf,
    /// Number of shard subdirectories under `logs_dir`.
    pub shard_count: u64,
    /// Buffered bytes before appended entries are flushed to disk.
    pub flush_threshold: usize,
}

impl LogsSettings {
    /// Settings with defaults, rooted at the given directory.
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            shard_count: DEFAULT_SHARD_COUNT,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

impl Default for LogsSettings {
    /// Logs under `./logs` relative to the working directory.
    fn default() -> Self {
        let base = std::env::current_dir().map_or_else(|_| PathBuf::from("logs"), |d| d.join("logs"));
        Self::new(base)
    }
}
