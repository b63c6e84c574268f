//! Core scan behavior: match detection at every depth, non-matches,
//! the depth bound, and the disabled no-op path.

use leakscan::{Inspect, ScanConfig, Scanner, DEFAULT_MAX_DEPTH};

/// Stand-in for a foreground component whose lifetime is screen-bound.
#[derive(Inspect)]
struct ScreenContext {
    id: u32,
}

impl ScreenContext {
    fn new() -> Self {
        Self { id: 7 }
    }
}

#[derive(Inspect)]
struct Task {
    name: String,
    screen: ScreenContext,
}

#[derive(Inspect)]
struct SafeTask {
    name: String,
    retries: u32,
}

fn scanner() -> Scanner {
    Scanner::new(ScanConfig::new().match_type::<ScreenContext>())
}

// ============================================================================
// Match at depth 0, 1, and k > 1
// ============================================================================

#[test]
fn test_root_itself_is_a_match() {
    let root = ScreenContext::new();
    assert_eq!(scanner().scan(&root, DEFAULT_MAX_DEPTH), Ok(true));
}

#[test]
fn test_direct_member_match() {
    let root = Task {
        name: "task".to_owned(),
        screen: ScreenContext::new(),
    };
    assert_eq!(scanner().scan(&root, 5), Ok(true));
}

#[test]
fn test_nested_member_match() {
    #[derive(Inspect)]
    struct Middle {
        task: Task,
    }

    #[derive(Inspect)]
    struct Outer {
        middle: Middle,
    }

    let root = Outer {
        middle: Middle {
            task: Task {
                name: "nested".to_owned(),
                screen: ScreenContext::new(),
            },
        },
    };
    assert_eq!(scanner().scan(&root, DEFAULT_MAX_DEPTH), Ok(true));
}

#[test]
fn test_no_match_returns_false() {
    let root = SafeTask {
        name: "task".to_owned(),
        retries: 3,
    };
    assert_eq!(scanner().scan(&root, 5), Ok(false));
}

#[test]
fn test_string_member_is_not_a_match() {
    // A string member named like a reference is still just a string.
    #[derive(Inspect)]
    struct Holder {
        name: String,
        reference: String,
    }

    let root = Holder {
        name: "task".to_owned(),
        reference: "hello".to_owned(),
    };
    assert_eq!(scanner().scan(&root, 5), Ok(false));
}

#[test]
fn test_absent_root_is_a_vacuous_non_match() {
    let root: Option<ScreenContext> = None;
    assert_eq!(scanner().scan(&root, 5), Ok(false));
}

#[test]
fn test_present_optional_member_matches() {
    let root = Some(ScreenContext::new());
    assert_eq!(scanner().scan(&root, 5), Ok(true));
}

// ============================================================================
// Depth bound
// ============================================================================

#[derive(Inspect)]
struct LinkB {
    screen: ScreenContext,
}

#[derive(Inspect)]
struct LinkA {
    b: LinkB,
}

#[derive(Inspect)]
struct Chain {
    a: LinkA,
}

#[test]
fn test_match_past_bound_is_depth_exceeded() {
    // Match sits at depth 3; bound 2 must fail loudly, not report false.
    let root = Chain {
        a: LinkA {
            b: LinkB {
                screen: ScreenContext::new(),
            },
        },
    };
    let err = scanner().scan(&root, 2).unwrap_err();
    match err {
        leakscan::ScanError::DepthExceeded {
            max_depth,
            type_name,
        } => {
            assert_eq!(max_depth, 2);
            assert!(type_name.ends_with("LinkB"));
        }
    }
}

#[test]
fn test_match_exactly_at_bound_succeeds() {
    let root = Chain {
        a: LinkA {
            b: LinkB {
                screen: ScreenContext::new(),
            },
        },
    };
    assert_eq!(scanner().scan(&root, 3), Ok(true));
}

#[test]
fn test_matching_root_beats_zero_bound() {
    // Classification precedes the depth gate: a match at the bound is a hit.
    let root = ScreenContext::new();
    assert_eq!(scanner().scan(&root, 0), Ok(true));
}

#[test]
fn test_recursive_root_with_zero_bound_is_depth_exceeded() {
    let root = SafeTask {
        name: "task".to_owned(),
        retries: 0,
    };
    assert!(scanner().scan(&root, 0).is_err());
}

// ============================================================================
// Disabled scanner
// ============================================================================

#[test]
fn test_disabled_scanner_is_a_no_op() {
    let scanner = Scanner::new(
        ScanConfig::new()
            .match_type::<ScreenContext>()
            .enabled(false),
    );
    let root = Task {
        name: "leaky".to_owned(),
        screen: ScreenContext::new(),
    };
    assert_eq!(scanner.scan(&root, 5), Ok(false));

    let report = scanner.scan_report(&root, 5).unwrap();
    assert!(!report.is_match());
    assert_eq!(report.visited, 0);
}

// ============================================================================
// Containers and indirection
// ============================================================================

#[test]
fn test_match_behind_rc() {
    #[derive(Inspect)]
    struct Shared {
        screen: std::rc::Rc<ScreenContext>,
    }

    let root = Shared {
        screen: std::rc::Rc::new(ScreenContext::new()),
    };
    assert_eq!(scanner().scan(&root, DEFAULT_MAX_DEPTH), Ok(true));
}

#[test]
fn test_match_inside_vec() {
    let root: Vec<Task> = vec![Task {
        name: "queued".to_owned(),
        screen: ScreenContext::new(),
    }];
    assert_eq!(scanner().scan(&root, DEFAULT_MAX_DEPTH), Ok(true));
}

#[test]
fn test_empty_vec_is_clean() {
    let root: Vec<Task> = Vec::new();
    assert_eq!(scanner().scan(&root, DEFAULT_MAX_DEPTH), Ok(false));
}

#[test]
fn test_match_as_map_value() {
    let mut root = std::collections::HashMap::new();
    root.insert("current".to_owned(), ScreenContext::new());
    assert_eq!(scanner().scan(&root, DEFAULT_MAX_DEPTH), Ok(true));
}
