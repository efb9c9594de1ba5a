//! Process lifecycle and output events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{EventKinds, ProcessInfo};

/// Events published for a supervised process.
///
/// Every variant carries the event time and the process's virtual pid; status
/// events add the command metadata, output events carry one captured line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessEvent {
    /// The process was launched; published before pumping begins.
    ProcessStarted {
        time: DateTime<Utc>,
        pid: u64,
        #[serde(rename = "nativePid")]
        native_pid: i32,
        name: String,
        #[serde(rename = "commandLine")]
        command_line: String,
    },

    /// Both output streams closed; the process is dead.
    ProcessDied {
        time: DateTime<Utc>,
        pid: u64,
        #[serde(rename = "nativePid")]
        native_pid: i32,
        name: String,
        #[serde(rename = "commandLine")]
        command_line: String,
    },

    /// One captured stdout line.
    Stdout {
        time: DateTime<Utc>,
        pid: u64,
        text: String,
    },

    /// One captured stderr line.
    Stderr {
        time: DateTime<Utc>,
        pid: u64,
        text: String,
    },
}

impl ProcessEvent {
    /// `process_started` for a freshly launched process.
    #[must_use]
    pub fn started(info: &ProcessInfo) -> Self {
        Self::ProcessStarted {
            time: Utc::now(),
            pid: info.pid,
            native_pid: info.native_pid,
            name: info.name.clone(),
            command_line: info.command_line.clone(),
        }
    }

    /// `process_died` after both output streams drained.
    #[must_use]
    pub fn died(info: &ProcessInfo) -> Self {
        Self::ProcessDied {
            time: Utc::now(),
            pid: info.pid,
            native_pid: info.native_pid,
            name: info.name.clone(),
            command_line: info.command_line.clone(),
        }
    }

    /// A captured stdout line.
    pub fn stdout(pid: u64, text: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self::Stdout {
            time,
            pid,
            text: text.into(),
        }
    }

    /// A captured stderr line.
    pub fn stderr(pid: u64, text: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self::Stderr {
            time,
            pid,
            text: text.into(),
        }
    }

    /// The mask bit this event matches.
    #[must_use]
    pub fn kinds(&self) -> EventKinds {
        match self {
            Self::ProcessStarted { .. } | Self::ProcessDied { .. } => EventKinds::PROCESS_STATUS,
            Self::Stdout { .. } => EventKinds::STDOUT,
            Self::Stderr { .. } => EventKinds::STDERR,
        }
    }

    /// The process the event belongs to.
    #[must_use]
    pub const fn pid(&self) -> u64 {
        match self {
            Self::ProcessStarted { pid, .. }
            | Self::ProcessDied { pid, .. }
            | Self::Stdout { pid, .. }
            | Self::Stderr { pid, .. } => *pid,
        }
    }

    /// When the event happened.
    #[must_use]
    pub const fn time(&self) -> DateTime<Utc> {
        match self {
            Self::ProcessStarted { time, .. }
            | Self::ProcessDied { time, .. }
            | Self::Stdout { time, .. }
            | Self::Stderr { time, .. } => *time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ProcessInfo {
        ProcessInfo {
            pid: 3,
            name: "build".into(),
            command_line: "make all".into(),
            type_tag: String::new(),
            alive: true,
            native_pid: 1200,
        }
    }

    #[test]
    fn started_event_serialization() {
        let json = serde_json::to_string(&ProcessEvent::started(&info())).unwrap();
        assert!(json.contains("\"type\":\"process_started\""));
        assert!(json.contains("\"pid\":3"));
        assert!(json.contains("\"nativePid\":1200"));
        assert!(json.contains("\"commandLine\":\"make all\""));
    }

    #[test]
    fn output_event_serialization() {
        let event = ProcessEvent::stdout(3, "hi", Utc::now());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"stdout\""));
        assert!(json.contains("\"text\":\"hi\""));
    }

    #[test]
    fn events_map_to_mask_bits() {
        assert_eq!(
            ProcessEvent::started(&info()).kinds(),
            EventKinds::PROCESS_STATUS
        );
        assert_eq!(
            ProcessEvent::died(&info()).kinds(),
            EventKinds::PROCESS_STATUS
        );
        assert_eq!(
            ProcessEvent::stdout(1, "x", Utc::now()).kinds(),
            EventKinds::STDOUT
        );
        assert_eq!(
            ProcessEvent::stderr(1, "x", Utc::now()).kinds(),
            EventKinds::STDERR
        );
    }
}
