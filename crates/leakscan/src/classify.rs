//! Value classification: match, terminal, or recurse.
//!
//! The classifier is a pure function of a value's concrete type. It is
//! configured once, owned by the [`Scanner`](crate::Scanner), and immutable
//! for the lifetime of every scan issued through it.

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashSet;

use crate::inspect::Inspect;

/// What the traversal should do with a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Never descend into this value; it cannot pin a lifecycle-bound object.
    Terminal,
    /// The value itself is a lifecycle-bound instance; report immediately.
    Match,
    /// An ordinary object whose members must be enumerated and traversed.
    Recursive,
}

/// Immutable scan policy: the designated lifecycle-bound types, the terminal
/// exclusions, and the process-wide enable flag.
///
/// Built once at initialization and handed to
/// [`Scanner::new`](crate::Scanner::new); there is no ambient global.
///
/// # Examples
///
/// ```ignore
/// let config = ScanConfig::new()
///     .match_type::<ScreenContext>()
///     .terminal_type::<AudioSession>()
///     .trusted_prefix("my_app::search::");
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Types whose presence in the graph constitutes a leak (`Match`).
    match_types: HashSet<TypeId>,
    /// Types never descended into, regardless of their members.
    terminal_types: HashSet<TypeId>,
    /// Type-name prefixes of namespaces trusted not to retain matches.
    trusted_prefixes: Vec<Cow<'static, str>>,
    /// When false, every scan is a no-op returning "no match".
    enabled: bool,
}

impl ScanConfig {
    /// Create a configuration with scanning enabled.
    ///
    /// Every std leaf type the library provides an [`Inspect`] impl for
    /// (primitives, strings, times, paths, addresses, atomics, `NonZero*`)
    /// is pre-registered as terminal, so a leaf is a leaf even when it sits
    /// exactly at the depth bound. No namespace is trusted by default: std
    /// containers must stay traversable (a `Vec` can retain a match), so a
    /// blanket `std::` prefix would be unsound. Prefix rules exist to prune
    /// application namespaces known to be safe.
    #[must_use]
    pub fn new() -> Self {
        Self {
            match_types: HashSet::new(),
            terminal_types: crate::inspect::leaf_type_ids().collect(),
            trusted_prefixes: Vec::new(),
            enabled: true,
        }
    }

    /// Designate `T` as lifecycle-bound: finding an instance of it reachable
    /// from a scanned root is a leak.
    #[must_use]
    pub fn match_type<T: 'static>(mut self) -> Self {
        self.match_types.insert(TypeId::of::<T>());
        self
    }

    /// Declare `T` known safe: values of this exact type are never expanded,
    /// even if their members could reach a match type.
    #[must_use]
    pub fn terminal_type<T: 'static>(mut self) -> Self {
        self.terminal_types.insert(TypeId::of::<T>());
        self
    }

    /// Trust a namespace: any value whose type name starts with `prefix` is
    /// terminal. Match-type classification always takes precedence, so a
    /// designated type cannot be masked by an overly broad prefix.
    #[must_use]
    pub fn trusted_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.trusted_prefixes.push(prefix.into());
        self
    }

    /// Enable or disable scanning. A disabled scanner returns "no match"
    /// without traversing anything; the flag is expected to mirror the
    /// process-wide diagnostics toggle owned by the debug harness.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether scans issued under this configuration traverse at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Classify a value by its concrete runtime type.
    ///
    /// The match check runs first, before any terminal rule; namespace
    /// exclusions must not hide a designated type.
    #[must_use]
    pub fn classify(&self, value: &dyn Inspect) -> Disposition {
        let type_id = value.type_id();
        if self.match_types.contains(&type_id) {
            return Disposition::Match;
        }
        if self.terminal_types.contains(&type_id) {
            return Disposition::Terminal;
        }
        let type_name = value.type_name();
        if self
            .trusted_prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_ref()))
        {
            return Disposition::Terminal;
        }
        Disposition::Recursive
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::FieldSink;

    struct Screen;
    struct Task;

    impl Inspect for Screen {
        fn fields<'a>(&'a self, _sink: &mut FieldSink<'a>) {}
    }

    impl Inspect for Task {
        fn fields<'a>(&'a self, _sink: &mut FieldSink<'a>) {}
    }

    #[test]
    fn match_type_classifies_as_match() {
        let config = ScanConfig::new().match_type::<Screen>();
        assert_eq!(config.classify(&Screen), Disposition::Match);
        assert_eq!(config.classify(&Task), Disposition::Recursive);
    }

    #[test]
    fn terminal_type_classifies_as_terminal() {
        let config = ScanConfig::new().terminal_type::<Task>();
        assert_eq!(config.classify(&Task), Disposition::Terminal);
    }

    #[test]
    fn primitives_and_strings_are_terminal_by_default() {
        let config = ScanConfig::new();
        let number = 3u32;
        let text = "hi".to_string();
        assert_eq!(config.classify(&number), Disposition::Terminal);
        assert_eq!(config.classify(&text), Disposition::Terminal);
        assert_eq!(config.classify(&Task), Disposition::Recursive);
    }

    #[test]
    fn std_leaf_types_are_terminal_by_default() {
        let config = ScanConfig::new();
        let path = std::path::PathBuf::from("/tmp");
        let when = std::time::SystemTime::UNIX_EPOCH;
        let count = std::sync::atomic::AtomicI8::new(0);
        let port = std::num::NonZeroU16::new(443).unwrap();
        assert_eq!(config.classify(&path), Disposition::Terminal);
        assert_eq!(config.classify(&when), Disposition::Terminal);
        assert_eq!(config.classify(&count), Disposition::Terminal);
        assert_eq!(config.classify(&port), Disposition::Terminal);
    }

    #[test]
    fn trusted_prefix_classifies_as_terminal() {
        let config = ScanConfig::new().trusted_prefix("leakscan::classify::tests::");
        assert_eq!(config.classify(&Task), Disposition::Terminal);
    }

    #[test]
    fn match_takes_precedence_over_prefix() {
        // A prefix broad enough to cover the match type must not mask it.
        let config = ScanConfig::new()
            .match_type::<Screen>()
            .trusted_prefix("leakscan::");
        assert_eq!(config.classify(&Screen), Disposition::Match);
        assert_eq!(config.classify(&Task), Disposition::Terminal);
    }

    #[test]
    fn disabled_flag_round_trips() {
        let config = ScanConfig::new().enabled(false);
        assert!(!config.is_enabled());
        assert!(ScanConfig::new().is_enabled());
    }
}
