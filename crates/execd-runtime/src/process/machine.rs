//! A single supervised process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use execd_core::events::ProcessEvent;
use execd_core::ports::{OutputConsumer, ProcessError};
use execd_core::{Command, LogEntry, ProcessInfo};

use super::logs::FileLogStore;
use super::shutdown::kill_group;
use super::subscribers::Subscriber;

/// One supervised OS process.
///
/// Owned by the registry for its full lifetime: a dead process stays
/// registered so its logs remain readable. The process owns its log store;
/// subscribers are referenced only, the transport layer owns the actual
/// delivery channels.
pub struct MachineProcess {
    pid: u64,
    name: String,
    command_line: String,
    type_tag: String,
    native_pid: i32,
    alive: AtomicBool,
    log_store: Arc<FileLogStore>,
    pub(super) subscribers: RwLock<Vec<Subscriber>>,
}

impl MachineProcess {
    pub(super) fn new(
        pid: u64,
        command: &Command,
        native_pid: i32,
        log_store: Arc<FileLogStore>,
        first_subscriber: Option<Subscriber>,
    ) -> Self {
        Self {
            pid,
            name: command.name.clone(),
            command_line: command.command_line.clone(),
            type_tag: command.type_tag.clone(),
            native_pid,
            alive: AtomicBool::new(true),
            log_store,
            subscribers: RwLock::new(first_subscriber.into_iter().collect()),
        }
    }

    /// The registry-assigned virtual pid.
    pub fn pid(&self) -> u64 {
        self.pid
    }

    /// Whether both output streams are still open.
    pub fn alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Point-in-time snapshot for callers.
    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            name: self.name.clone(),
            command_line: self.command_line.clone(),
            type_tag: self.type_tag.clone(),
            alive: self.alive(),
            native_pid: self.native_pid,
        }
    }

    /// Kill the whole process tree by signalling the process group.
    ///
    /// The alive flag is left untouched: pumping observes the resulting
    /// stream closure and completes the lifecycle transition itself.
    pub fn kill(&self) -> Result<(), ProcessError> {
        kill_group(self.native_pid).map_err(|source| ProcessError::Kill {
            pid: self.pid,
            source,
        })
    }

    /// Persisted log entries within `[from, till]`.
    pub fn read_logs(
        &self,
        from: Option<DateTime<Utc>>,
        till: Option<DateTime<Utc>>,
    ) -> Result<Vec<LogEntry>, ProcessError> {
        Ok(self.log_store.read_range(from, till)?)
    }

    pub(super) fn set_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub(super) fn log_store(&self) -> &Arc<FileLogStore> {
        &self.log_store
    }
}

impl OutputConsumer for MachineProcess {
    fn on_stdout(&self, line: &str, time: DateTime<Utc>) {
        self.publish(&ProcessEvent::stdout(self.pid, line, time));
    }

    fn on_stderr(&self, line: &str, time: DateTime<Utc>) {
        self.publish(&ProcessEvent::stderr(self.pid, line, time));
    }

    fn on_close(&self) {
        // Both streams drained: the process is dead exactly once.
        self.set_dead();
        self.publish(&ProcessEvent::died(&self.info()));
    }
}
