//! Consumer port for pumped output lines.

use chrono::{DateTime, Utc};

/// Port for receiving line-split process output from the stream pumper.
///
/// Implementations must be thread-safe: stdout and stderr lines arrive from
/// two concurrent reader tasks. Lines of one stream arrive in read order and
/// a consumer is called for the next line only after every consumer has seen
/// the current one, so a slow consumer stalls delivery for that stream.
pub trait OutputConsumer: Send + Sync {
    /// Called for each complete stdout line, newline stripped.
    fn on_stdout(&self, line: &str, time: DateTime<Utc>);

    /// Called for each complete stderr line, newline stripped.
    fn on_stderr(&self, line: &str, time: DateTime<Utc>);

    /// Called exactly once after both streams are drained.
    fn on_close(&self);
}
