//! Persisted process output records.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Which stream a log entry was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    Stdout,
    Stderr,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("STDOUT"),
            Self::Stderr => f.write_str("STDERR"),
        }
    }
}

/// One captured output line, newline stripped.
///
/// Entries are written once and never mutated. Ordering within a log file is
/// arrival order at write time; interleaving of the two streams follows the
/// arrival timestamps, not a separate sequence counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub time: DateTime<Utc>,
    pub text: String,
}

impl LogEntry {
    pub fn new(kind: LogKind, time: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            kind,
            time,
            text: text.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    /// Human-readable rendering used by text log responses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} \t {}",
            self.kind,
            self.time.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.text
        )
    }
}
