//! Identifiers for simulation runs and the requests they route.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Counter for short request IDs.
static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a UUID-based identifier, unique across processes.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short request ID based on a process-wide counter.
///
/// Format: `req-{counter}` with the counter zero-padded to 16 hex digits.
pub fn generate_short_request_id() -> String {
    let count = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{:016x}", count)
}

/// Request ID attached to each routed request in logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Create a new UUID request ID.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(generate_request_id())
    }

    /// Create a new counter-based request ID.
    pub fn short() -> Self {
        Self(generate_short_request_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
