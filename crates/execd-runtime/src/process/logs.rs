//! Buffered append-only log persistence with time-range replay.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use execd_core::ports::{LogError, OutputConsumer};
use execd_core::{LogEntry, LogKind};
use tracing::warn;

/// File-backed store for one process's output log.
///
/// Entries are serialized into an in-memory buffer and flushed when the
/// buffer crosses the flush threshold, on close, and before every read. The
/// on-disk format is a stream of JSON objects, one per line, each
/// independently decodable in file order.
pub struct FileLogStore {
    path: PathBuf,
    flush_threshold: usize,
    buffer: Mutex<Vec<u8>>,
}

impl FileLogStore {
    /// Create the store, truncating any previous file at `path`.
    ///
    /// The parent directory must already exist; creating it is the logs
    /// distributor's responsibility.
    pub fn create(path: impl Into<PathBuf>, flush_threshold: usize) -> Result<Self, LogError> {
        let path = path.into();
        File::create(&path)?;
        Ok(Self {
            path,
            flush_threshold,
            buffer: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, kind: LogKind, line: &str, time: DateTime<Utc>) {
        let entry = LogEntry::new(kind, time, line);
        let mut buffer = self.buffer.lock().unwrap();
        if let Err(e) = serde_json::to_writer(&mut *buffer, &entry) {
            warn!(path = %self.path.display(), error = %e, "dropping unserializable log entry");
            return;
        }
        buffer.push(b'\n');
        if buffer.len() > self.flush_threshold {
            if let Err(e) = Self::flush_buffer(&self.path, &mut buffer) {
                warn!(path = %self.path.display(), error = %e, "threshold log flush failed");
            }
        }
    }

    /// Append buffered bytes to the log file and clear the buffer.
    ///
    /// Idempotent on an empty buffer; safe to call concurrently with writers.
    pub fn flush(&self) -> Result<(), LogError> {
        let mut buffer = self.buffer.lock().unwrap();
        Self::flush_buffer(&self.path, &mut buffer)
    }

    fn flush_buffer(path: &Path, buffer: &mut Vec<u8>) -> Result<(), LogError> {
        if buffer.is_empty() {
            return Ok(());
        }
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        file.write_all(buffer)?;
        buffer.clear();
        Ok(())
    }

    /// Flush, then decode every entry within `[from, till]` in file order.
    ///
    /// `None` bounds mean "from the beginning of the file" and "up to now".
    /// A decode failure mid-stream fails the read as a whole; no partial
    /// result is returned.
    pub fn read_range(
        &self,
        from: Option<DateTime<Utc>>,
        till: Option<DateTime<Utc>>,
    ) -> Result<Vec<LogEntry>, LogError> {
        self.flush()?;
        let reader = BufReader::new(File::open(&self.path)?);
        let till = till.unwrap_or_else(Utc::now);

        let mut entries = Vec::new();
        for decoded in serde_json::Deserializer::from_reader(reader).into_iter::<LogEntry>() {
            let entry = decoded?;
            if from.is_some_and(|from| entry.time < from) {
                continue;
            }
            if entry.time > till {
                break;
            }
            entries.push(entry);
        }
        Ok(entries)
    }
}

impl OutputConsumer for FileLogStore {
    fn on_stdout(&self, line: &str, time: DateTime<Utc>) {
        self.append(LogKind::Stdout, line, time);
    }

    fn on_stderr(&self, line: &str, time: DateTime<Utc>) {
        self.append(LogKind::Stderr, line, time);
    }

    fn on_close(&self) {
        if let Err(e) = self.flush() {
            warn!(path = %self.path.display(), error = %e, "final log flush failed");
        }
    }
}
