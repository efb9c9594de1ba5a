//! Process lifecycle, output capture and event fan-out.
//!
//! # Structure
//!
//! - `ProcessRegistry` - spawning, virtual pid assignment, lookup, kill
//! - `MachineProcess` - one supervised process with its subscriber list
//! - `StreamPumper` - concurrent stdout/stderr line pumping
//! - `FileLogStore` - buffered append-only log persistence with replay
//! - `LogsDistributor` - shard-directory assignment for log files

mod distributor;
mod logs;
mod machine;
mod pumper;
mod registry;
mod shutdown;
mod subscribers;

pub use distributor::LogsDistributor;
pub use logs::FileLogStore;
pub use machine::MachineProcess;
pub use pumper::StreamPumper;
pub use registry::ProcessRegistry;
pub use subscribers::Subscriber;
