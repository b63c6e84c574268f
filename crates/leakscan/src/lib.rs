//! A debug-time heap reachability scanner.
//!
//! `leakscan` answers one question about a live object graph: does this
//! object, directly or through nested members, retain an instance of a
//! designated set of *lifecycle-bound* types? The motivating failure mode is
//! a task handed to a long-lived background worker while holding a hard
//! reference to a short-lived foreground component; the component can never
//! be reclaimed after teardown.
//!
//! # How it works
//!
//! - Types opt in to inspection with `#[derive(Inspect)]`, which reports
//!   every member to the scanner; the library covers primitives and the
//!   common std containers out of the box.
//! - A [`ScanConfig`] designates the lifecycle-bound *match* types and the
//!   *terminal* exclusions (exact types and trusted namespace prefixes).
//! - [`Scanner::scan`] walks the graph breadth-first with a visited-identity
//!   cycle guard and a hard depth bound, returning on the first (and
//!   therefore shallowest) match.
//!
//! # Quick Start
//!
//! ```ignore
//! use leakscan::{Inspect, ScanConfig, Scanner, DEFAULT_MAX_DEPTH};
//!
//! struct ScreenContext { /* foreground state */ }
//!
//! #[derive(Inspect)]
//! struct DownloadTask {
//!     url: String,
//!     screen: std::rc::Rc<ScreenContext>, // oops
//! }
//!
//! let scanner = Scanner::new(ScanConfig::new().match_type::<ScreenContext>());
//! assert!(scanner.scan(&task, DEFAULT_MAX_DEPTH)?);
//! ```
//!
//! # Scope
//!
//! This is a development diagnostic, not a garbage collector and not a
//! static analyzer: it reads one live graph at one point in time and never
//! mutates it. Scans racing concurrent writers see best-effort snapshots;
//! members behind contended locks are skipped and counted in the
//! [`ScanReport`]. Construct the scanner with
//! [`ScanConfig::enabled`]`(false)` outside debug builds to make every scan
//! a no-op.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod classify;
mod error;
mod inspect;
mod scan;
mod tracing;

pub use classify::{Disposition, ScanConfig};
pub use error::ScanError;
pub use inspect::{Field, FieldSink, FieldValue, Inspect};
pub use scan::{MatchHit, ScanReport, Scanner, DEFAULT_MAX_DEPTH};

// Re-export derive macro when feature is enabled
#[cfg(feature = "derive")]
pub use leakscan_derive::Inspect;
