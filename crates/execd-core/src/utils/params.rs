//! Parameter parsing shared by transports.
//!
//! Every transport maps caller-supplied strings (path variables, query
//! parameters, call payloads) to typed inputs through these helpers, so
//! malformed input is rejected uniformly before the runtime is touched.

use chrono::{DateTime, Utc};

use crate::ports::ProcessError;

/// Parse a virtual pid from its string form.
///
/// Pids are strictly positive; zero, negative and non-numeric values are
/// validation errors.
pub fn parse_pid(raw: &str) -> Result<u64, ProcessError> {
    raw.parse::<u64>()
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or_else(|| ProcessError::InvalidPid(raw.to_string()))
}

/// Parse an RFC 3339 timestamp, returning `default` for an empty string.
pub fn parse_time_or(raw: &str, default: DateTime<Utc>) -> Result<DateTime<Utc>, ProcessError> {
    if raw.is_empty() {
        return Ok(default);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| ProcessError::InvalidTime(format!("'{raw}': {e}")))
}
