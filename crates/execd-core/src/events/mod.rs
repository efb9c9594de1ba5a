//! Canonical event union published by the process runtime.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag:
//!
//! ```json
//! { "type": "stdout", "time": "2024-05-01T12:30:45.000000001Z", "pid": 3, "text": "hi" }
//! ```

mod process;

pub use process::ProcessEvent;
