//! Subscriber event-kind masks.

use bitflags::bitflags;

bitflags! {
    /// Event kinds a subscriber wants delivered.
    ///
    /// The bits correspond one-to-one to the published event taxonomy:
    /// output lines per stream plus lifecycle status events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct EventKinds: u32 {
        /// Captured stdout lines.
        const STDOUT         = 1;
        /// Captured stderr lines.
        const STDERR         = 1 << 1;
        /// Lifecycle status events (started/died).
        const PROCESS_STATUS = 1 << 2;
    }
}

impl EventKinds {
    /// Parse a comma-separated filter such as `"stdout,process_status"`.
    ///
    /// Matching is case-insensitive and whitespace-tolerant; unknown tokens
    /// are ignored. An empty filter yields the default mask (everything).
    #[must_use]
    pub fn from_types_str(types: &str) -> Self {
        if types.trim().is_empty() {
            return Self::all();
        }
        let mut mask = Self::empty();
        for token in types.split(',') {
            match token.trim().to_ascii_lowercase().as_str() {
                "stdout" => mask |= Self::STDOUT,
                "stderr" => mask |= Self::STDERR,
                "process_status" => mask |= Self::PROCESS_STATUS,
                _ => {}
            }
        }
        mask
    }
}

impl Default for EventKinds {
    /// Unfiltered: every event kind is delivered.
    fn default() -> Self {
        Self::all()
    }
}
