//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define what the core expects from infrastructure: a delivery
//! channel for live events (owned by the transport layer) and a consumer
//! interface for pumped output lines. They contain no transport or OS
//! implementation details.

mod event_channel;
mod output_consumer;

pub use event_channel::{EventChannelPort, NoopChannel};
pub use output_consumer::OutputConsumer;

use thiserror::Error;

/// Errors surfaced by process lifecycle and subscription operations.
///
/// Validation and not-found variants are rejected before any side effect;
/// OS failures carry the original error untouched.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The start command failed validation; nothing was launched.
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// A pid string could not be parsed into a virtual pid.
    #[error("pid must be a positive integer, got '{0}'")]
    InvalidPid(String),

    /// A timestamp string was not valid RFC 3339.
    #[error("bad timestamp: {0}")]
    InvalidTime(String),

    /// No process with the given virtual pid exists in the registry.
    #[error("no process with id '{0}'")]
    NotFound(u64),

    /// The process is dead; live subscriptions are refused.
    #[error("process with id '{0}' is not alive")]
    NotAlive(u64),

    /// A subscriber with the same channel identity is already registered.
    #[error("channel '{0}' is already subscribed")]
    AlreadySubscribed(String),

    /// The OS failed to spawn the command.
    #[error("failed to spawn process")]
    Spawn(#[source] std::io::Error),

    /// Signalling the process group failed while the process exists.
    #[error("failed to kill process group of '{pid}'")]
    Kill {
        pid: u64,
        #[source]
        source: std::io::Error,
    },

    /// The process log could not be written or read.
    #[error(transparent)]
    Logs(#[from] LogError),
}

/// Errors reading or writing a process log file.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log file i/o failed")]
    Io(#[from] std::io::Error),

    /// The log stream is corrupt. The read fails as a whole; entries decoded
    /// before the corruption are discarded.
    #[error("log file decode failed")]
    Decode(#[from] serde_json::Error),
}
