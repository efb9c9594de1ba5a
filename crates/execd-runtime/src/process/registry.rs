//! Process registry: spawning, lookup and lifecycle tracking.

use std::collections::HashMap;
use std::io;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use execd_core::events::ProcessEvent;
use execd_core::ports::{LogError, OutputConsumer, ProcessError};
use execd_core::{Command, LogEntry, LogsSettings, ProcessInfo};
use tracing::{debug, warn};

use super::distributor::LogsDistributor;
use super::logs::FileLogStore;
use super::machine::MachineProcess;
use super::pumper::StreamPumper;
use super::shutdown::kill_group;
use super::subscribers::Subscriber;

/// Registry of every process started by this agent.
///
/// Explicitly constructed and shared by handle; nothing here is global, so
/// tests can run isolated instances side by side. Virtual pids are assigned
/// from a per-registry counter starting at 1 and are never reused. Dead
/// processes stay registered so their logs remain readable.
pub struct ProcessRegistry {
    next_pid: AtomicU64,
    items: RwLock<HashMap<u64, Arc<MachineProcess>>>,
    distributor: LogsDistributor,
    flush_threshold: usize,
}

impl ProcessRegistry {
    pub fn new(settings: &LogsSettings) -> Self {
        Self {
            next_pid: AtomicU64::new(0),
            items: RwLock::new(HashMap::new()),
            distributor: LogsDistributor::new(settings),
            flush_threshold: settings.flush_threshold,
        }
    }

    /// Spawn `command` in its own process group and register it.
    ///
    /// `first_subscriber`, when given, is registered before the
    /// `process_started` event is published, so a caller-supplied channel
    /// cannot miss it. Nothing is registered unless both the spawn and the
    /// log store creation succeed; on a late failure the just-spawned group
    /// is killed again.
    pub async fn start(
        &self,
        command: Command,
        first_subscriber: Option<Subscriber>,
    ) -> Result<Arc<MachineProcess>, ProcessError> {
        command.validate()?;

        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c")
            .arg(&command.command_line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(ProcessError::Spawn)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ProcessError::Spawn(io::Error::other("child stdout pipe missing")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ProcessError::Spawn(io::Error::other("child stderr pipe missing")))?;
        let native_pid = child
            .id()
            .and_then(|raw| i32::try_from(raw).ok())
            .ok_or_else(|| ProcessError::Spawn(io::Error::other("spawned child has no pid")))?;

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst) + 1;

        let store = match self.create_store(pid) {
            Ok(store) => store,
            Err(e) => {
                // The child is already running; don't leak the group when
                // its log store cannot be created.
                if let Err(kill_err) = kill_group(native_pid) {
                    warn!(pid, native_pid, error = %kill_err, "failed to kill process after log store failure");
                }
                return Err(e.into());
            }
        };

        let process = Arc::new(MachineProcess::new(
            pid,
            &command,
            native_pid,
            Arc::clone(&store),
            first_subscriber,
        ));

        self.items
            .write()
            .unwrap()
            .insert(pid, Arc::clone(&process));

        let mut pumper = StreamPumper::new(stdout, stderr);
        pumper.add_consumer(store);
        pumper.add_consumer(Arc::clone(&process) as Arc<dyn OutputConsumer>);

        // Published synchronously before pumping starts: no subscriber
        // registered at this point can miss it.
        process.publish(&ProcessEvent::started(&process.info()));

        debug!(pid, native_pid, name = %command.name, "process started");

        tokio::spawn(async move {
            // Blocks until both streams close; the close hooks mark the
            // process dead and publish `process_died`.
            pumper.pump().await;
            match child.wait().await {
                Ok(status) => debug!(pid, %status, "process reaped"),
                Err(e) => warn!(pid, error = %e, "failed to reap process"),
            }
        });

        Ok(process)
    }

    fn create_store(&self, pid: u64) -> Result<Arc<FileLogStore>, LogError> {
        let path = self.distributor.file_for_pid(pid)?;
        Ok(Arc::new(FileLogStore::create(path, self.flush_threshold)?))
    }

    /// Look up a process by virtual pid.
    pub fn get(&self, pid: u64) -> Option<Arc<MachineProcess>> {
        self.items.read().unwrap().get(&pid).cloned()
    }

    /// Snapshot of registered processes.
    ///
    /// `include_dead` keeps finished processes in the listing. Order is
    /// unspecified and not stable across calls; callers requiring
    /// determinism must sort.
    pub fn list(&self, include_dead: bool) -> Vec<ProcessInfo> {
        self.items
            .read()
            .unwrap()
            .values()
            .filter(|p| include_dead || p.alive())
            .map(|p| p.info())
            .collect()
    }

    /// SIGKILL the process group of `pid`.
    ///
    /// An unknown pid is a distinct error from a known process whose signal
    /// failed.
    pub fn kill(&self, pid: u64) -> Result<(), ProcessError> {
        self.get(pid).ok_or(ProcessError::NotFound(pid))?.kill()
    }

    /// Read a process's persisted log entries within `[from, till]`.
    pub fn read_logs(
        &self,
        pid: u64,
        from: Option<DateTime<Utc>>,
        till: Option<DateTime<Utc>>,
    ) -> Result<Vec<LogEntry>, ProcessError> {
        self.get(pid)
            .ok_or(ProcessError::NotFound(pid))?
            .read_logs(from, till)
    }
}
