//! Core domain types and port definitions for execd.
//!
//! This crate holds the pure domain model of the process-supervision agent:
//! commands, process snapshots, log entries, the published event taxonomy,
//! subscriber event masks, error types and settings. Ports define what the
//! core expects from the outside world (delivery channels, output consumers)
//! without pulling transport or OS concerns into signatures.

pub mod domain;
pub mod events;
pub mod ports;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{Command, EventKinds, LogEntry, LogKind, ProcessInfo};
pub use events::ProcessEvent;
pub use ports::{EventChannelPort, LogError, NoopChannel, OutputConsumer, ProcessError};
pub use settings::{DEFAULT_FLUSH_THRESHOLD, DEFAULT_SHARD_COUNT, LogsSettings};
pub use utils::{parse_pid, parse_time_or};
