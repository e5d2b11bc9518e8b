#![forbid(unsafe_code)]

//! Change-detection equality for selector dependencies.
//!
//! Two comparison strategies exist, chosen when a dependency is bound
//! (see [`Dep`](crate::selector::Dep)):
//!
//! - **Value equality**: structural `PartialEq`. Reference identity is
//!   never consulted.
//! - **Sequence equality**: for values carrying the [`Sequence`]
//!   capability, equal length and pairwise-equal elements in order.
//!
//! A dependency that has never been observed has no previous value; the
//! oracle treats that as unconditionally "changed" and never touches the
//! absent value ([`changed_since`]).

/// Ordered-sequence comparison capability.
///
/// A dependency value type implementing `Sequence` declares that change
/// detection should compare it element-by-element rather than relying on
/// whatever `PartialEq` the type happens to have.
pub trait Sequence {
    /// Element type.
    type Item: PartialEq;

    /// The elements, in order.
    fn items(&self) -> &[Self::Item];
}

impl<T: PartialEq> Sequence for Vec<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }
}

impl<T: PartialEq, const N: usize> Sequence for [T; N] {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }
}

impl<T: PartialEq> Sequence for Box<[T]> {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }
}

/// Element-wise sequence equality: equal length and pairwise-equal
/// elements, in order.
#[must_use]
pub fn sequence_eq<T: Sequence + ?Sized>(a: &T, b: &T) -> bool {
    let (a, b) = (a.items(), b.items());
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
}

/// Whether `next` differs from `previous` under the given comparison.
///
/// `previous` is `None` before the first observation of a dependency;
/// that case is unconditionally "changed" and `eq` is not called.
pub fn changed_since<T>(previous: Option<&T>, next: &T, eq: impl FnOnce(&T, &T) -> bool) -> bool {
    match previous {
        None => true,
        Some(prev) => !eq(prev, next),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
