//! Scan failure taxonomy.

/// A fatal failure of a single scan invocation.
///
/// Hitting the depth bound is an expected, recoverable outcome for the
/// caller, so it is a typed error rather than a panic; it is never retried
/// internally, since retrying with the same bound would fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// The configured depth bound was reached while recursive values still
    /// awaited expansion, so the scan cannot prove the graph is leak-free.
    ///
    /// Signals a pathologically deep graph or a bound configured too low;
    /// the caller should investigate rather than silently ignore it.
    #[error("scan depth limit {max_depth} reached while `{type_name}` still awaited expansion")]
    DepthExceeded {
        /// The bound the scan was invoked with.
        max_depth: usize,
        /// Concrete type of the value that could not be expanded.
        type_name: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_exceeded_names_the_offending_type() {
        let error = ScanError::DepthExceeded {
            max_depth: 8,
            type_name: "my_app::Task",
        };
        let message = error.to_string();
        assert!(message.contains('8'));
        assert!(message.contains("my_app::Task"));
    }
}
