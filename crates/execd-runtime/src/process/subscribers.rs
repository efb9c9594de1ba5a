//! Subscription and live event fan-out for a process.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use execd_core::EventKinds;
use execd_core::LogKind;
use execd_core::events::ProcessEvent;
use execd_core::ports::{EventChannelPort, ProcessError};
use tracing::debug;

use super::machine::MachineProcess;

/// A (mask, delivery channel) pair registered against one process.
#[derive(Clone)]
pub struct Subscriber {
    pub mask: EventKinds,
    pub channel: Arc<dyn EventChannelPort>,
}

impl Subscriber {
    pub fn new(mask: EventKinds, channel: Arc<dyn EventChannelPort>) -> Self {
        Self { mask, channel }
    }

    /// Identity of the underlying transport channel.
    pub fn id(&self) -> &str {
        self.channel.id()
    }
}

impl MachineProcess {
    /// Register a subscriber for live events.
    ///
    /// Refused when the channel identity is already subscribed, or when the
    /// process is dead and will never emit again.
    pub fn add_subscriber(&self, subscriber: Subscriber) -> Result<(), ProcessError> {
        let mut subs = self.subscribers.write().unwrap();
        if subs.iter().any(|s| s.id() == subscriber.id()) {
            return Err(ProcessError::AlreadySubscribed(subscriber.id().to_string()));
        }
        if !self.alive() {
            return Err(ProcessError::NotAlive(self.pid()));
        }
        subs.push(subscriber);
        Ok(())
    }

    /// Remove by channel identity; an absent id is a no-op.
    pub fn remove_subscriber(&self, id: &str) {
        self.subscribers.write().unwrap().retain(|s| s.id() != id);
    }

    /// Replace a subscriber's mask in place.
    ///
    /// A vanished subscriber is a benign race with concurrent removal, not
    /// an error.
    pub fn update_subscriber(&self, id: &str, mask: EventKinds) {
        let mut subs = self.subscribers.write().unwrap();
        if let Some(sub) = subs.iter_mut().find(|s| s.id() == id) {
            sub.mask = mask;
        }
    }

    /// Replay history after `after`, then register for live events.
    ///
    /// Replay bypasses the mask: history is delivered as the raw record,
    /// directly and synchronously to the subscriber's channel. Live
    /// registration happens only once the replay read (which snapshots up to
    /// now) has completed, so a live event can never arrive ahead of the
    /// history that precedes it. A process that died before or during replay
    /// still gets its history delivered; only live registration is skipped.
    pub fn restore_subscriber(
        &self,
        subscriber: Subscriber,
        after: DateTime<Utc>,
    ) -> Result<(), ProcessError> {
        let entries = self.read_logs(Some(after), None)?;
        for entry in entries {
            if entry.time == after {
                // The read range is inclusive; an entry stamped exactly
                // `after` was already seen by whoever supplied the timestamp.
                continue;
            }
            let event = match entry.kind {
                LogKind::Stdout => ProcessEvent::stdout(self.pid(), entry.text, entry.time),
                LogKind::Stderr => ProcessEvent::stderr(self.pid(), entry.text, entry.time),
            };
            if !subscriber.channel.try_send(event) {
                debug!(
                    pid = self.pid(),
                    channel = subscriber.id(),
                    "channel broke during replay"
                );
                return Ok(());
            }
        }
        if self.alive() {
            self.add_subscriber(subscriber)
        } else {
            Ok(())
        }
    }

    /// Publish an event to every subscriber whose mask matches its kind.
    ///
    /// Delivery failures never propagate to the publishing path: broken
    /// channels are collected while iterating a snapshot and evicted
    /// afterwards under the write lock, never mid-iteration.
    pub(super) fn publish(&self, event: &ProcessEvent) {
        let kind = event.kinds();
        let targets: Vec<Subscriber> = {
            let subs = self.subscribers.read().unwrap();
            subs.iter()
                .filter(|s| s.mask.contains(kind))
                .cloned()
                .collect()
        };

        let mut broken: Vec<String> = Vec::new();
        for subscriber in targets {
            if !subscriber.channel.try_send(event.clone()) {
                broken.push(subscriber.id().to_string());
            }
        }

        if !broken.is_empty() {
            self.subscribers
                .write()
                .unwrap()
                .retain(|s| !broken.iter().any(|id| id == s.id()));
            for id in broken {
                debug!(pid = self.pid(), channel = %id, "evicted broken subscriber");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use execd_core::{Command, DEFAULT_FLUSH_THRESHOLD, OutputConsumer};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::process::logs::FileLogStore;

    /// In-memory channel capturing everything sent through it; can be
    /// flipped into a broken state to exercise eviction.
    struct ChannelStub {
        id: String,
        sent: Mutex<Vec<ProcessEvent>>,
        healthy: AtomicBool,
    }

    impl ChannelStub {
        fn new(id: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                sent: Mutex::new(Vec::new()),
                healthy: AtomicBool::new(true),
            })
        }

        fn break_channel(&self) {
            self.healthy.store(false, Ordering::SeqCst);
        }

        fn sent(&self) -> Vec<ProcessEvent> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl EventChannelPort for ChannelStub {
        fn id(&self) -> &str {
            &self.id
        }

        fn try_send(&self, event: ProcessEvent) -> bool {
            if !self.healthy.load(Ordering::SeqCst) {
                return false;
            }
            self.sent.lock().unwrap().push(event);
            true
        }
    }

    fn process_at(dir: &std::path::Path) -> MachineProcess {
        let store = Arc::new(
            FileLogStore::create(dir.join("log"), DEFAULT_FLUSH_THRESHOLD).unwrap(),
        );
        MachineProcess::new(7, &Command::new("test", "true"), 12345, store, None)
    }

    fn subscriber(channel: &Arc<ChannelStub>, mask: EventKinds) -> Subscriber {
        Subscriber::new(mask, Arc::clone(channel) as Arc<dyn EventChannelPort>)
    }

    #[test]
    fn mask_filters_published_events() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let channel = ChannelStub::new("c1");
        process
            .add_subscriber(subscriber(&channel, EventKinds::STDOUT))
            .unwrap();

        let now = Utc::now();
        process.publish(&ProcessEvent::stdout(7, "keep", now));
        process.publish(&ProcessEvent::stderr(7, "drop", now));
        process.publish(&ProcessEvent::started(&process.info()));

        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], ProcessEvent::Stdout { text, .. } if text == "keep"));
    }

    #[test]
    fn duplicate_channel_identity_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let channel = ChannelStub::new("c1");
        process
            .add_subscriber(subscriber(&channel, EventKinds::all()))
            .unwrap();

        let result = process.add_subscriber(subscriber(&channel, EventKinds::STDERR));
        assert!(matches!(result, Err(ProcessError::AlreadySubscribed(id)) if id == "c1"));
    }

    #[test]
    fn dead_process_refuses_new_subscribers() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        process.set_dead();

        let channel = ChannelStub::new("c1");
        let result = process.add_subscriber(subscriber(&channel, EventKinds::all()));
        assert!(matches!(result, Err(ProcessError::NotAlive(7))));
    }

    #[test]
    fn broken_channel_is_evicted_on_next_publish() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let channel = ChannelStub::new("c1");
        process
            .add_subscriber(subscriber(&channel, EventKinds::all()))
            .unwrap();

        channel.break_channel();
        process.publish(&ProcessEvent::stdout(7, "x", Utc::now()));

        // The subscriber is gone: updating it is a no-op and the identity is
        // free to subscribe again.
        process.update_subscriber("c1", EventKinds::STDERR);
        assert!(process.subscribers.read().unwrap().is_empty());
        let fresh = ChannelStub::new("c1");
        process
            .add_subscriber(subscriber(&fresh, EventKinds::all()))
            .unwrap();
    }

    #[test]
    fn remove_subscriber_is_noop_for_unknown_id() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        process.remove_subscriber("ghost");

        let channel = ChannelStub::new("c1");
        process
            .add_subscriber(subscriber(&channel, EventKinds::all()))
            .unwrap();
        process.remove_subscriber("c1");
        assert!(process.subscribers.read().unwrap().is_empty());
    }

    #[test]
    fn update_subscriber_replaces_the_mask() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let channel = ChannelStub::new("c1");
        process
            .add_subscriber(subscriber(&channel, EventKinds::STDOUT))
            .unwrap();

        process.update_subscriber("c1", EventKinds::STDERR);
        let now = Utc::now();
        process.publish(&ProcessEvent::stdout(7, "no", now));
        process.publish(&ProcessEvent::stderr(7, "yes", now));

        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], ProcessEvent::Stderr { text, .. } if text == "yes"));
    }

    #[test]
    fn restore_replays_history_then_registers() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let base = Utc::now() - Duration::seconds(60);

        let store = Arc::clone(process.log_store());
        store.on_stdout("old-1", base + Duration::seconds(1));
        store.on_stderr("old-2", base + Duration::seconds(2));

        let channel = ChannelStub::new("c1");
        process
            .restore_subscriber(subscriber(&channel, EventKinds::STDOUT), base)
            .unwrap();

        // Unfiltered replay: the stderr entry arrives despite the mask.
        let replayed = channel.sent();
        assert_eq!(replayed.len(), 2);
        assert!(matches!(&replayed[0], ProcessEvent::Stdout { text, .. } if text == "old-1"));
        assert!(matches!(&replayed[1], ProcessEvent::Stderr { text, .. } if text == "old-2"));

        // Mask-filtered live-forward after registration.
        process.publish(&ProcessEvent::stdout(7, "live", Utc::now()));
        process.publish(&ProcessEvent::stderr(7, "masked", Utc::now()));
        let sent = channel.sent();
        assert_eq!(sent.len(), 3);
        assert!(matches!(&sent[2], ProcessEvent::Stdout { text, .. } if text == "live"));
    }

    #[test]
    fn restore_skips_entries_at_the_boundary_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let base = Utc::now() - Duration::seconds(60);

        let store = Arc::clone(process.log_store());
        store.on_stdout("seen", base);
        store.on_stdout("new", base + Duration::seconds(1));

        let channel = ChannelStub::new("c1");
        process
            .restore_subscriber(subscriber(&channel, EventKinds::all()), base)
            .unwrap();

        let replayed = channel.sent();
        assert_eq!(replayed.len(), 1);
        assert!(matches!(&replayed[0], ProcessEvent::Stdout { text, .. } if text == "new"));
    }

    #[test]
    fn restore_on_dead_process_replays_without_registering() {
        let tmp = tempfile::tempdir().unwrap();
        let process = process_at(tmp.path());
        let base = Utc::now() - Duration::seconds(60);
        let store = Arc::clone(process.log_store());
        store.on_stdout("final-output", base + Duration::seconds(1));
        process.set_dead();

        let channel = ChannelStub::new("c1");
        process
            .restore_subscriber(subscriber(&channel, EventKinds::all()), base)
            .unwrap();

        assert_eq!(channel.sent().len(), 1);
        assert!(process.subscribers.read().unwrap().is_empty());
    }
}
