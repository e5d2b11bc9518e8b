#![forbid(unsafe_code)]

//! Memoized state-to-view-state derivation.
//!
//! # Design
//!
//! A [`Selector<S, V>`] binds 0–3 dependency extractors (`Fn(&S) -> T`)
//! and a combiner producing the view state `V`. Each dependency occupies a
//! slot holding the extractor, the comparison strategy declared at binding
//! time ([`Dep`]), and the memoized previous value in a shared
//! `Rc<RefCell<Option<T>>>` cell. The combiner closure reads the same
//! cells, so [`view_state()`](Selector::view_state) always sees exactly
//! the values captured by the last [`has_changed()`](Selector::has_changed)
//! call.
//!
//! # Invariants
//!
//! 1. Every slot is evaluated on every `has_changed` call — no
//!    short-circuiting — so later dependencies capture their new values
//!    even when an earlier one already changed.
//! 2. Memo cells are replaced together within one `has_changed` call,
//!    never partially across dependencies.
//! 3. The first `has_changed` call returns true regardless of values.
//! 4. An arity-0 selector reports "changed" on every call.
//!
//! # Failure Modes
//!
//! - **Premature read**: `view_state()` before any `has_changed` call is a
//!   broken propagation contract upstream and panics rather than returning
//!   a default.

use std::cell::RefCell;
use std::rc::Rc;

use crate::equality::{Sequence, changed_since, sequence_eq};

/// A dependency declaration: how to extract the value from global state
/// and which comparison strategy decides whether it changed.
///
/// The strategy is fixed at binding time; a sequence-declared dependency
/// never falls back to value equality and vice versa.
pub struct Dep<S, T> {
    extract: Box<dyn Fn(&S) -> T>,
    compare: Box<dyn Fn(&T, &T) -> bool>,
}

impl<S: 'static, T: 'static> Dep<S, T> {
    /// Dependency compared by structural value equality.
    pub fn value(extract: impl Fn(&S) -> T + 'static) -> Self
    where
        T: PartialEq,
    {
        Self {
            extract: Box::new(extract),
            compare: Box::new(|a, b| a == b),
        }
    }

    /// Dependency compared element-wise via the [`Sequence`] capability.
    pub fn sequence(extract: impl Fn(&S) -> T + 'static) -> Self
    where
        T: Sequence,
    {
        Self {
            extract: Box::new(extract),
            compare: Box::new(|a, b| sequence_eq(a, b)),
        }
    }

    /// Low-level constructor with a caller-supplied comparator.
    ///
    /// For value types whose notion of "unchanged" is neither plain
    /// `PartialEq` nor element-wise sequence equality.
    pub fn with_compare(
        extract: impl Fn(&S) -> T + 'static,
        compare: impl Fn(&T, &T) -> bool + 'static,
    ) -> Self {
        Self {
            extract: Box::new(extract),
            compare: Box::new(compare),
        }
    }
}

/// A change-detection slot: extracts the new value, compares it against
/// the memo, stores it, and reports whether it changed.
type Slot<S> = Box<dyn FnMut(&S) -> bool>;

/// Turn a dependency declaration into a slot plus a handle to its memo
/// cell for the combiner side.
fn slot<S: 'static, T: 'static>(dep: Dep<S, T>) -> (Slot<S>, Rc<RefCell<Option<T>>>) {
    let Dep { extract, compare } = dep;
    let memo: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
    let cell = Rc::clone(&memo);
    let slot = Box::new(move |state: &S| {
        let next = (extract)(state);
        let changed = {
            let prev = cell.borrow();
            changed_since(prev.as_ref(), &next, &*compare)
        };
        *cell.borrow_mut() = Some(next);
        changed
    });
    (slot, memo)
}

/// Read a memo cell that must have been populated by `has_changed`.
fn memoized<T>(memo: &Option<T>) -> &T {
    memo.as_ref()
        .expect("dependency memo is populated after has_changed")
}

/// Memoized derivation from global state `S` to view state `V`.
///
/// Created once when its owning view is constructed; lives as long as the
/// view; dropped on view destruction.
pub struct Selector<S, V> {
    slots: Vec<Slot<S>>,
    combine: Box<dyn Fn(&S) -> V>,
    observed: bool,
}

impl<S, V> std::fmt::Debug for Selector<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("arity", &self.slots.len())
            .field("observed", &self.observed)
            .finish()
    }
}

impl<S: 'static, V: 'static> Selector<S, V> {
    /// Arity-0 selector: no dependencies, `has_changed` is always true.
    ///
    /// Every update pass redraws the owning view. Useful for views whose
    /// output has no meaningful memoization.
    pub fn new(combine: impl Fn(&S) -> V + 'static) -> Self {
        Self {
            slots: Vec::new(),
            combine: Box::new(combine),
            observed: false,
        }
    }

    /// Selector over one dependency.
    pub fn new1<A: 'static>(a: Dep<S, A>, combine: impl Fn(&A, &S) -> V + 'static) -> Self {
        let (slot_a, memo_a) = slot(a);
        let combine = Box::new(move |state: &S| {
            let a = memo_a.borrow();
            combine(memoized(&a), state)
        });
        Self {
            slots: vec![slot_a],
            combine,
            observed: false,
        }
    }

    /// Selector over two dependencies.
    pub fn new2<A: 'static, B: 'static>(
        a: Dep<S, A>,
        b: Dep<S, B>,
        combine: impl Fn(&A, &B, &S) -> V + 'static,
    ) -> Self {
        let (slot_a, memo_a) = slot(a);
        let (slot_b, memo_b) = slot(b);
        let combine = Box::new(move |state: &S| {
            let a = memo_a.borrow();
            let b = memo_b.borrow();
            combine(memoized(&a), memoized(&b), state)
        });
        Self {
            slots: vec![slot_a, slot_b],
            combine,
            observed: false,
        }
    }

    /// Selector over three dependencies.
    pub fn new3<A: 'static, B: 'static, C: 'static>(
        a: Dep<S, A>,
        b: Dep<S, B>,
        c: Dep<S, C>,
        combine: impl Fn(&A, &B, &C, &S) -> V + 'static,
    ) -> Self {
        let (slot_a, memo_a) = slot(a);
        let (slot_b, memo_b) = slot(b);
        let (slot_c, memo_c) = slot(c);
        let combine = Box::new(move |state: &S| {
            let a = memo_a.borrow();
            let b = memo_b.borrow();
            let c = memo_c.borrow();
            combine(memoized(&a), memoized(&b), memoized(&c), state)
        });
        Self {
            slots: vec![slot_a, slot_b, slot_c],
            combine,
            observed: false,
        }
    }

    /// Evaluate every dependency against `state`, refresh the memo cells,
    /// and report whether anything changed.
    ///
    /// Returns true iff at least one dependency changed or this is the
    /// first call. Arity-0 selectors return true on every call.
    pub fn has_changed(&mut self, state: &S) -> bool {
        let first = !self.observed;
        self.observed = true;
        if self.slots.is_empty() {
            return true;
        }
        let mut any_changed = false;
        // Every slot runs every call: a later dependency must still
        // capture its new value even when an earlier one already changed.
        for observe in &mut self.slots {
            if observe(state) {
                any_changed = true;
            }
        }
        any_changed || first
    }

    /// Compute the view state from the memoized dependency values plus
    /// `state`.
    ///
    /// # Panics
    ///
    /// Panics if called before any [`has_changed()`](Self::has_changed)
    /// call — that indicates a broken propagation contract upstream.
    #[must_use]
    pub fn view_state(&self, state: &S) -> V {
        assert!(
            self.observed,
            "view_state called before has_changed; no dependency values observed yet"
        );
        (self.combine)(state)
    }

    /// Number of bound dependencies (0–3).
    #[must_use]
    pub fn arity(&self) -> usize {
        self.slots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
