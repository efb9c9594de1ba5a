//! Process snapshots returned to callers.

use serde::{Deserialize, Serialize};

/// Point-in-time view of a supervised process.
///
/// `pid` is the registry's own monotonically assigned identifier and is never
/// reused. `native_pid` is the OS pid; it is only meaningful while `alive` is
/// true, the OS may recycle it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub pid: u64,
    pub name: String,
    pub command_line: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    pub alive: bool,
    pub native_pid: i32,
}
