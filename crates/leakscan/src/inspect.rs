//! The `Inspect` trait and field enumeration for leak scanning.
//!
//! Rust has no runtime reflection, so participation is opt-in: a type that
//! wants to be scanned reports its members to a [`FieldSink`], normally via
//! `#[derive(Inspect)]`. The library provides impls for primitives and the
//! common std containers so that ordinary object graphs work out of the box.

use std::any::Any;
use std::borrow::Cow;
use std::cell::{Cell, Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::{MappedMutexGuard, MappedRwLockReadGuard, Mutex, MutexGuard, RwLock, RwLockReadGuard};

// ============================================================================
// Core Trait
// ============================================================================

/// A type whose members can be enumerated by the leak scanner.
///
/// Implementations report every member that can retain another object by
/// calling [`FieldSink::field`] (or one of its guard/snapshot variants) once
/// per member, in declaration order. A member that exists but cannot be read
/// right now (a `RefCell` already borrowed mutably, a contended lock) is
/// reported with [`FieldSink::denied`] instead of being silently dropped.
///
/// An implementation must be a pure, finite, side-effect-free read of the
/// current field values. It must never recurse into members itself; the
/// traversal is the scanner's job.
///
/// Prefer `#[derive(Inspect)]` over manual implementation. A member omitted
/// from `fields` is invisible to the scanner, which can only produce a false
/// negative, never unsoundness.
pub trait Inspect: Any {
    /// Report each member of this value to `sink`, in declaration order.
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>);

    /// The fully-qualified name of this value's concrete type.
    ///
    /// Used for trusted-namespace classification and diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

// ============================================================================
// FieldSink - member collection
// ============================================================================

/// A single enumerated member: a name and the value behind it.
pub struct Field<'a> {
    /// Member name as reported by the owner (`"[3]"` for container elements).
    pub name: Cow<'static, str>,
    /// The member's value, or [`FieldValue::Denied`] if it was unreadable.
    pub value: FieldValue<'a>,
}

/// The value side of an enumerated member.
///
/// Guard-carrying variants keep their borrow alive for as long as the
/// scanner holds the field, so values behind interior mutability stay
/// readable while their own members are expanded.
pub enum FieldValue<'a> {
    /// A plain borrow of the member.
    Ref(&'a dyn Inspect),
    /// A member behind a `RefCell`, with its read guard riding along.
    Cell(Ref<'a, dyn Inspect>),
    /// A member behind a `parking_lot::Mutex`.
    Locked(MappedMutexGuard<'a, dyn Inspect>),
    /// A member behind a `parking_lot::RwLock`.
    LockedRead(MappedRwLockReadGuard<'a, dyn Inspect>),
    /// A snapshot of a member that can only be observed by copy (`Cell`).
    Owned(Box<dyn Inspect>),
    /// The member exists but could not be read (borrowed cell, held lock).
    Denied,
}

impl FieldValue<'_> {
    /// Resolve the underlying value, or `None` for a denied member.
    #[must_use]
    pub fn get(&self) -> Option<&dyn Inspect> {
        match self {
            Self::Ref(value) => Some(*value),
            Self::Cell(guard) => Some(&**guard),
            Self::Locked(guard) => Some(&**guard),
            Self::LockedRead(guard) => Some(&**guard),
            Self::Owned(boxed) => Some(&**boxed),
            Self::Denied => None,
        }
    }
}

/// Collects the `(name, value)` pairs reported by one [`Inspect::fields`]
/// call. Insertion order is preserved; it determines traversal order.
#[derive(Default)]
pub struct FieldSink<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> FieldSink<'a> {
    /// Create an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Report an ordinary member.
    pub fn field(&mut self, name: impl Into<Cow<'static, str>>, value: &'a dyn Inspect) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Ref(value),
        });
    }

    /// Report a member read through a `RefCell` guard.
    pub fn guarded(&mut self, name: impl Into<Cow<'static, str>>, value: Ref<'a, dyn Inspect>) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Cell(value),
        });
    }

    /// Report a member read through a mutex guard.
    pub fn locked(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: MappedMutexGuard<'a, dyn Inspect>,
    ) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Locked(value),
        });
    }

    /// Report a member read through a read-write lock guard.
    pub fn locked_read(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        value: MappedRwLockReadGuard<'a, dyn Inspect>,
    ) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::LockedRead(value),
        });
    }

    /// Report a member observable only as a snapshot copy.
    pub fn owned(&mut self, name: impl Into<Cow<'static, str>>, value: Box<dyn Inspect>) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Owned(value),
        });
    }

    /// Report a member that exists but could not be read right now.
    pub fn denied(&mut self, name: impl Into<Cow<'static, str>>) {
        self.fields.push(Field {
            name: name.into(),
            value: FieldValue::Denied,
        });
    }

    /// Number of members reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no members have been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the sink, yielding the members in report order.
    #[must_use]
    pub fn into_fields(self) -> Vec<Field<'a>> {
        self.fields
    }
}

// ============================================================================
// Inspect implementations for leaf types
// ============================================================================

macro_rules! impl_inspect_leaf {
    ($($t:ty),* $(,)?) => {
        $(
            impl Inspect for $t {
                #[inline]
                fn fields<'a>(&'a self, _sink: &mut FieldSink<'a>) {}
            }
        )*

        /// Every concrete leaf type above.
        /// [`ScanConfig::new`](crate::ScanConfig::new) pre-registers these
        /// as terminal so a leaf sitting exactly at the depth bound reads
        /// as a leaf, not as an unexpandable recursive node.
        pub(crate) fn leaf_type_ids() -> impl Iterator<Item = std::any::TypeId> {
            [$(std::any::TypeId::of::<$t>()),*].into_iter()
        }
    };
}

impl_inspect_leaf! {
    // Signed integers
    i8, i16, i32, i64, i128, isize,
    // Unsigned integers
    u8, u16, u32, u64, u128, usize,
    // Floating point
    f32, f64,
    // Other primitives
    bool, char, (),
    // String types
    String,
    // Common std types that cannot retain application objects
    std::time::Duration,
    std::time::Instant,
    std::time::SystemTime,
    std::path::PathBuf,
    std::ffi::OsString,
    std::ffi::CString,
    std::net::IpAddr,
    std::net::Ipv4Addr,
    std::net::Ipv6Addr,
    std::net::SocketAddr,
    std::net::SocketAddrV4,
    std::net::SocketAddrV6,
    std::sync::atomic::AtomicBool,
    std::sync::atomic::AtomicI8,
    std::sync::atomic::AtomicI16,
    std::sync::atomic::AtomicI32,
    std::sync::atomic::AtomicI64,
    std::sync::atomic::AtomicIsize,
    std::sync::atomic::AtomicU8,
    std::sync::atomic::AtomicU16,
    std::sync::atomic::AtomicU32,
    std::sync::atomic::AtomicU64,
    std::sync::atomic::AtomicUsize,
    // NonZero wrappers
    std::num::NonZeroU8,
    std::num::NonZeroU16,
    std::num::NonZeroU32,
    std::num::NonZeroU64,
    std::num::NonZeroU128,
    std::num::NonZeroUsize,
    std::num::NonZeroI8,
    std::num::NonZeroI16,
    std::num::NonZeroI32,
    std::num::NonZeroI64,
    std::num::NonZeroI128,
    std::num::NonZeroIsize,
}

impl<T: ?Sized + 'static> Inspect for std::marker::PhantomData<T> {
    #[inline]
    fn fields<'a>(&'a self, _sink: &mut FieldSink<'a>) {}
}

// A weak reference never pins its target; it is a leaf even when alive.
impl<T: 'static> Inspect for std::rc::Weak<T> {
    #[inline]
    fn fields<'a>(&'a self, _sink: &mut FieldSink<'a>) {}
}

impl<T: 'static> Inspect for std::sync::Weak<T> {
    #[inline]
    fn fields<'a>(&'a self, _sink: &mut FieldSink<'a>) {}
}

// ============================================================================
// Inspect implementations for containers and indirection
// ============================================================================

impl<T: Inspect> Inspect for Box<T> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.field("*", &**self);
    }
}

impl Inspect for Box<dyn Inspect> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.field("*", &**self);
    }
}

impl<T: Inspect> Inspect for Rc<T> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.field("*", &**self);
    }
}

impl Inspect for Rc<dyn Inspect> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.field("*", &**self);
    }
}

impl<T: Inspect> Inspect for Arc<T> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.field("*", &**self);
    }
}

impl Inspect for Arc<dyn Inspect> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.field("*", &**self);
    }
}

// An absent value contributes no members, so `None` is never visited.
impl<T: Inspect> Inspect for Option<T> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        if let Some(value) = self {
            sink.field("some", value);
        }
    }
}

impl<T: Inspect, E: Inspect> Inspect for Result<T, E> {
    #[inline]
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        match self {
            Ok(value) => sink.field("ok", value),
            Err(error) => sink.field("err", error),
        }
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, item) in self.iter().enumerate() {
            sink.field(format!("[{i}]"), item);
        }
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, item) in self.iter().enumerate() {
            sink.field(format!("[{i}]"), item);
        }
    }
}

impl<T: Inspect> Inspect for LinkedList<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, item) in self.iter().enumerate() {
            sink.field(format!("[{i}]"), item);
        }
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, item) in self.iter().enumerate() {
            sink.field(format!("[{i}]"), item);
        }
    }
}

// Keys are inspected alongside values; a key type can retain objects too.
impl<K: Inspect, V: Inspect, S: BuildHasher + 'static> Inspect for HashMap<K, V, S> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, (key, value)) in self.iter().enumerate() {
            sink.field(format!("[{i}].key"), key);
            sink.field(format!("[{i}].value"), value);
        }
    }
}

impl<T: Inspect, S: BuildHasher + 'static> Inspect for HashSet<T, S> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, item) in self.iter().enumerate() {
            sink.field(format!("[{i}]"), item);
        }
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, (key, value)) in self.iter().enumerate() {
            sink.field(format!("[{i}].key"), key);
            sink.field(format!("[{i}].value"), value);
        }
    }
}

impl<T: Inspect> Inspect for BTreeSet<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        for (i, item) in self.iter().enumerate() {
            sink.field(format!("[{i}]"), item);
        }
    }
}

// ============================================================================
// Inspect implementations for interior mutability
// ============================================================================

// The scanner never blocks on application borrows or locks: a member it
// cannot acquire is reported denied and the scan carries on.

impl<T: Inspect> Inspect for RefCell<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        match self.try_borrow() {
            Ok(guard) => sink.guarded("value", Ref::map(guard, |value| value as &dyn Inspect)),
            Err(_) => sink.denied("value"),
        }
    }
}

impl<T: Inspect + Copy> Inspect for Cell<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        sink.owned("value", Box::new(self.get()));
    }
}

impl<T: Inspect> Inspect for Mutex<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        match self.try_lock() {
            Some(guard) => sink.locked(
                "value",
                MutexGuard::map(guard, |value| value as &mut dyn Inspect),
            ),
            None => sink.denied("value"),
        }
    }
}

impl<T: Inspect> Inspect for RwLock<T> {
    fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
        match self.try_read() {
            Some(guard) => sink.locked_read(
                "value",
                RwLockReadGuard::map(guard, |value| value as &dyn Inspect),
            ),
            None => sink.denied("value"),
        }
    }
}

// ============================================================================
// Inspect implementations for tuples
// ============================================================================

macro_rules! impl_inspect_for_tuples {
    ($( ( $($idx:tt $t:ident),+ ) )+) => {
        $(
            impl<$($t: Inspect),+> Inspect for ($($t,)+) {
                fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
                    $(sink.field(stringify!($idx), &self.$idx);)+
                }
            }
        )+
    };
}

impl_inspect_for_tuples! {
    (0 A)
    (0 A, 1 B)
    (0 A, 1 B, 2 C)
    (0 A, 1 B, 2 C, 3 D)
    (0 A, 1 B, 2 C, 3 D, 4 E)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K)
    (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: u32,
        right: String,
    }

    impl Inspect for Pair {
        fn fields<'a>(&'a self, sink: &mut FieldSink<'a>) {
            sink.field("left", &self.left);
            sink.field("right", &self.right);
        }
    }

    #[test]
    fn sink_preserves_declaration_order() {
        let pair = Pair {
            left: 1,
            right: "x".to_string(),
        };
        let mut sink = FieldSink::new();
        pair.fields(&mut sink);
        let names: Vec<_> = sink.into_fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, ["left", "right"]);
    }

    #[test]
    fn leaves_report_no_fields() {
        let number = 42u64;
        let text = "hello".to_string();
        let duration = std::time::Duration::from_secs(1);
        let mut sink = FieldSink::new();
        number.fields(&mut sink);
        text.fields(&mut sink);
        duration.fields(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn none_contributes_no_fields() {
        let value: Option<Pair> = None;
        let mut sink = FieldSink::new();
        value.fields(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn borrowed_refcell_reports_denied() {
        let cell = RefCell::new(7u32);
        let _hold = cell.borrow_mut();
        let mut sink = FieldSink::new();
        cell.fields(&mut sink);
        let fields = sink.into_fields();
        assert_eq!(fields.len(), 1);
        assert!(fields[0].value.get().is_none());
    }

    #[test]
    fn weak_reference_is_a_leaf() {
        let strong = Rc::new(Pair {
            left: 0,
            right: String::new(),
        });
        let weak = Rc::downgrade(&strong);
        let mut sink = FieldSink::new();
        weak.fields(&mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn type_name_reports_concrete_type() {
        let pair = Pair {
            left: 0,
            right: String::new(),
        };
        let dynamic: &dyn Inspect = &pair;
        assert!(dynamic.type_name().ends_with("Pair"));
    }
}
