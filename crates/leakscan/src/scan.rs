//! Breadth-first traversal engine.
//!
//! The scanner walks the object graph level by level, pruning and matching
//! through the classifier and expanding nodes through [`Inspect::fields`].
//! Breadth-first order guarantees that when a match exists, the reported
//! retention path is the shortest one, which is the most actionable
//! diagnostic. The walk is bounded by a visited-identity set (cycle guard)
//! and a hard depth limit.

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashSet;

use crate::classify::{Disposition, ScanConfig};
use crate::error::ScanError;
use crate::inspect::{Field, FieldSink, FieldValue, Inspect};
use crate::tracing::internal as trace;

/// Default depth bound, generous enough for any sane object graph.
pub const DEFAULT_MAX_DEPTH: usize = 200;

// ============================================================================
// Object identity
// ============================================================================

/// Identity of a visited value: its address plus its concrete type.
///
/// Identity must be address-based, not value-based: two value-equal objects
/// are distinct nodes, and only one of them may be the leaking instance.
/// The `TypeId` component disambiguates a struct from its first member,
/// which share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ObjectId {
    addr: usize,
    type_id: TypeId,
}

impl ObjectId {
    fn of(value: &dyn Inspect) -> Self {
        Self {
            addr: std::ptr::from_ref(value).cast::<()>() as usize,
            type_id: value.type_id(),
        }
    }
}

// ============================================================================
// Scan results
// ============================================================================

/// A reachable lifecycle-bound instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchHit {
    /// Concrete type of the matched instance.
    pub type_name: &'static str,
    /// Shortest dotted member path from the root to the match.
    pub path: String,
}

/// Outcome of one scan invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// The first (shallowest) match found, if any.
    pub matched: Option<MatchHit>,
    /// Values classified during the scan.
    pub visited: usize,
    /// Members that could not be read and were skipped. When non-zero, a
    /// "no match" result is not a proof: an unreadable member might have
    /// retained a match.
    pub denied_fields: usize,
    /// Deepest breadth-first level that held at least one value.
    pub deepest_level: usize,
}

impl ScanReport {
    /// Whether a lifecycle-bound instance was reachable.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// One pending value in the breadth-first frontier.
struct Target<'a> {
    value: FieldValue<'a>,
    path: String,
}

/// The traversal engine. Owns an immutable [`ScanConfig`]; every scan call
/// is independent, with its own frontier and visited set.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Create a scanner over the given configuration.
    #[must_use]
    pub const fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// The configuration this scanner was built with.
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Does the graph rooted at `root` retain a lifecycle-bound instance?
    ///
    /// Returns `Ok(false)` immediately, without traversing, when the
    /// configuration is disabled.
    ///
    /// # Errors
    ///
    /// [`ScanError::DepthExceeded`] when `max_depth` is reached while
    /// recursive values still await expansion; the result is then unknown
    /// and the error is deliberately loud rather than a silent `false`.
    pub fn scan(&self, root: &dyn Inspect, max_depth: usize) -> Result<bool, ScanError> {
        self.scan_report(root, max_depth).map(|r| r.is_match())
    }

    /// Like [`Self::scan`], but returns the full report: the shortest
    /// retention path on a hit, plus visit and denied-member counts.
    ///
    /// # Errors
    ///
    /// [`ScanError::DepthExceeded`], as for [`Self::scan`].
    pub fn scan_report(
        &self,
        root: &dyn Inspect,
        max_depth: usize,
    ) -> Result<ScanReport, ScanError> {
        let mut report = ScanReport::default();
        if !self.config.is_enabled() {
            return Ok(report);
        }

        let _span = trace::scan_span(root.type_name(), max_depth);

        let mut visited = HashSet::new();
        visited.insert(ObjectId::of(root));
        let frontier = vec![Target {
            value: FieldValue::Ref(root),
            path: "root".to_owned(),
        }];

        let matched = self.expand_level(frontier, 0, max_depth, &mut visited, &mut report)?;
        report.matched = matched;

        match &report.matched {
            Some(hit) => trace::log_match(hit.type_name, &hit.path),
            None => trace::log_clean(report.visited, report.denied_fields),
        }
        Ok(report)
    }

    /// Expand one breadth-first level and recurse into the next.
    ///
    /// Recursion over levels (one frame per depth, capped by `max_depth`)
    /// keeps guard-carrying field values alive exactly as long as their
    /// descendants are pending: each level borrows from the one above it.
    fn expand_level<'a>(
        &self,
        level: Vec<Target<'a>>,
        depth: usize,
        max_depth: usize,
        visited: &mut HashSet<ObjectId>,
        report: &mut ScanReport,
    ) -> Result<Option<MatchHit>, ScanError> {
        if level.is_empty() {
            return Ok(None);
        }
        report.deepest_level = depth;

        let mut next = Vec::new();
        for target in &level {
            let Some(value) = target.value.get() else {
                continue;
            };
            report.visited += 1;

            // Re-classify the popped value itself; this covers the root and
            // costs nothing for values already vetted at discovery.
            match self.config.classify(value) {
                Disposition::Match => {
                    return Ok(Some(MatchHit {
                        type_name: value.type_name(),
                        path: target.path.clone(),
                    }));
                }
                Disposition::Terminal => continue,
                Disposition::Recursive => {}
            }

            // A recursive value sitting at the bound cannot be expanded, so
            // non-retention cannot be proven past this point.
            if depth >= max_depth {
                return Err(ScanError::DepthExceeded {
                    max_depth,
                    type_name: value.type_name(),
                });
            }

            let mut sink = FieldSink::new();
            value.fields(&mut sink);
            for Field { name, value: member } in sink.into_fields() {
                let Some(child) = member.get() else {
                    report.denied_fields += 1;
                    trace::log_denied(value.type_name(), &name);
                    continue;
                };
                match self.config.classify(child) {
                    Disposition::Match => {
                        return Ok(Some(MatchHit {
                            type_name: child.type_name(),
                            path: join_path(&target.path, &name),
                        }));
                    }
                    Disposition::Terminal => {}
                    Disposition::Recursive => {
                        if visited.insert(ObjectId::of(child)) {
                            let path = join_path(&target.path, &name);
                            next.push(Target {
                                value: member,
                                path,
                            });
                        }
                    }
                }
            }
        }

        self.expand_level(next, depth + 1, max_depth, visited, report)
    }
}

fn join_path(parent: &str, name: &Cow<'static, str>) -> String {
    if name.starts_with('[') {
        format!("{parent}{name}")
    } else {
        format!("{parent}.{name}")
    }
}
