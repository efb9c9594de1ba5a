//! Shared helpers.

mod params;

pub use params::{parse_pid, parse_time_or};
