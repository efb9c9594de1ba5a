//! Process supervision runtime for execd.
//!
//! Launches OS processes on behalf of remote clients, captures their
//! stdout/stderr in real time, persists output to durable per-process log
//! files, and fans live output/status events out to dynamically
//! (un)subscribing delivery channels.

pub mod process;

// Re-export the runtime surface
pub use process::{
    FileLogStore, LogsDistributor, MachineProcess, ProcessRegistry, StreamPumper, Subscriber,
};
