#![forbid(unsafe_code)]

//! Unidirectional state-to-view updates with memoized selectors.
//!
//! A single global state value is mutated only through commands dispatched
//! to a [`Store`]; a tree of [`View`] nodes re-renders incrementally by
//! re-reading only the slices of state it depends on:
//!
//! - [`Selector`]: a memoized pure derivation from global state to a
//!   per-view "view state", with 0–3 change-tracked dependencies.
//! - [`View`]: a tree node that redraws when its selector reports a change
//!   (or on first update) and cascades the update to its children.
//! - [`Store`]: the state singleton, its reducer, and the propagation-pass
//!   driver. The only writer of state.
//!
//! # Architecture
//!
//! `Store<S, C>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership, so any number of view callbacks can hold a cheap handle and
//! dispatch commands. Selector memo cells are likewise shared interior
//! state between the change-detection slots and the combiner.
//!
//! Control flow is strictly one-directional: commands flow view → store,
//! state flows store → root view → children, one synchronous pass at a
//! time. Commands dispatched mid-pass are queued and applied only after
//! the pass completes.
//!
//! # Invariants
//!
//! 1. Within one propagation pass every node observes the same state
//!    snapshot; state is never forked mid-pass.
//! 2. Children are visited in registration order, stably across passes.
//! 3. A selector's memoized dependency values are replaced together in the
//!    same `has_changed` call, never partially.
//! 4. The first `has_changed` call after construction reports "changed"
//!    regardless of dependency values.
//! 5. A view's first update redraws unconditionally; a view with no bound
//!    selector never redraws (diagnostic, not an error).

pub mod equality;
pub mod selector;
pub mod store;
pub mod view;

pub use equality::{Sequence, sequence_eq};
pub use selector::{Dep, Selector};
pub use store::Store;
pub use view::{Node, Render, View};
