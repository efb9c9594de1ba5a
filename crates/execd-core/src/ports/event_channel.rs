//! Delivery channel port for live event fan-out.
//!
//! The transport layer owns the real channel (websocket connection, SSE
//! stream, test queue); the core only needs a stable identity and a send
//! primitive that fails instead of blocking forever or panicking.

use crate::events::ProcessEvent;

/// Port for delivering events to one remote consumer.
pub trait EventChannelPort: Send + Sync {
    /// Stable identity of the underlying transport channel.
    ///
    /// At most one subscriber per identity may be registered on a process.
    fn id(&self) -> &str;

    /// Attempt delivery of one event.
    ///
    /// Returns `false` when the channel is closed or broken; the publisher
    /// evicts the subscriber instead of propagating the failure.
    fn try_send(&self, event: ProcessEvent) -> bool;
}

/// A channel that discards every event.
///
/// For tests and contexts that start processes without an attached consumer.
#[derive(Debug, Clone, Default)]
pub struct NoopChannel {
    id: String,
}

impl NoopChannel {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl EventChannelPort for NoopChannel {
    fn id(&self) -> &str {
        &self.id
    }

    fn try_send(&self, _event: ProcessEvent) -> bool {
        true
    }
}
