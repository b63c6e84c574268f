//! Scan tracing support.
//!
//! When the `tracing` feature is enabled, this module provides structured
//! tracing spans and events for scan invocations. A hit is surfaced loudly
//! (`warn`), a clean scan and per-member denials are `debug` events.

#[cfg(feature = "tracing")]
pub(crate) mod internal {
    use tracing::{span, Level};

    /// Create a span covering one scan invocation.
    pub fn scan_span(root_type: &'static str, max_depth: usize) -> span::EnteredSpan {
        span!(Level::DEBUG, "leak_scan", root = root_type, max_depth).entered()
    }

    /// Log a reachable lifecycle-bound instance.
    pub fn log_match(type_name: &'static str, path: &str) {
        tracing::warn!(type_name, path, "lifecycle-bound instance reachable");
    }

    /// Log a completed scan with no match.
    pub fn log_clean(visited: usize, denied_fields: usize) {
        tracing::debug!(visited, denied_fields, "scan clean");
    }

    /// Log a member the enumerator could not read.
    pub fn log_denied(owner: &'static str, field: &str) {
        tracing::debug!(owner, field, "member unreadable, skipped");
    }
}

#[cfg(not(feature = "tracing"))]
pub(crate) mod internal {
    /// Stub when tracing is disabled.
    pub fn scan_span(_root_type: &'static str, _max_depth: usize) {}

    /// Stub when tracing is disabled.
    pub fn log_match(_type_name: &'static str, _path: &str) {}

    /// Stub when tracing is disabled.
    pub fn log_clean(_visited: usize, _denied_fields: usize) {}

    /// Stub when tracing is disabled.
    pub fn log_denied(_owner: &'static str, _field: &str) {}
}
