#![forbid(unsafe_code)]

//! The state singleton, its reducer, and the propagation-pass driver.
//!
//! # Design
//!
//! [`Store<S, C>`] wraps the global state, a reducer `FnMut(&mut S, C)`,
//! and the mounted root node in shared, reference-counted storage.
//! Cloning a `Store` creates a new handle to the **same** interior, so
//! view callbacks can capture one cheaply and dispatch commands from
//! anywhere — fire and forget.
//!
//! A dispatch drains the command queue through the reducer, clones a
//! state snapshot, drops every interior borrow, and only then walks the
//! tree. That ordering lets render callbacks re-enter
//! [`dispatch()`](Store::dispatch) or [`with_state()`](Store::with_state)
//! mid-pass without tripping `RefCell`; re-entrant commands are queued
//! and applied after the in-flight pass completes, so no pass ever
//! observes a torn state.
//!
//! # Invariants
//!
//! 1. The store is the only writer of state, and it writes strictly
//!    between passes, never during one.
//! 2. Every node in one pass observes the same snapshot.
//! 3. Commands are applied in dispatch order.
//! 4. At most one pass is in flight at a time.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, debug_span};

use crate::view::Node;

/// Shared interior for [`Store<S, C>`].
struct StoreInner<S, C> {
    state: S,
    reducer: Box<dyn FnMut(&mut S, C)>,
    root: Option<Box<dyn Node<S>>>,
    queue: VecDeque<C>,
    in_pass: bool,
}

/// The global-state singleton and sole entry point for state changes.
///
/// Views read state only through the snapshot handed to them in a pass;
/// they request changes only by dispatching commands.
pub struct Store<S, C> {
    inner: Rc<RefCell<StoreInner<S, C>>>,
}

// Manual Clone: shares the same Rc.
impl<S, C> Clone for Store<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: Clone + 'static, C> Store<S, C> {
    /// Create a store from the initial state and a reducer.
    ///
    /// The reducer is the single state-transition function: it receives
    /// the current state and one command, and mutates the state in place.
    #[must_use]
    pub fn new(initial: S, reducer: impl FnMut(&mut S, C) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                state: initial,
                reducer: Box::new(reducer),
                root: None,
                queue: VecDeque::new(),
                in_pass: false,
            })),
        }
    }

    /// Mount the root of the view tree and run an initial pass, forcing
    /// every view's first render.
    ///
    /// A previously mounted root is destroyed first.
    pub fn mount(&self, root: impl Node<S> + 'static) {
        self.unmount();
        self.inner.borrow_mut().root = Some(Box::new(root));
        self.refresh();
    }

    /// Detach and destroy the mounted root, if any.
    pub fn unmount(&self) {
        let root = self.inner.borrow_mut().root.take();
        if let Some(mut root) = root {
            root.destroy();
        }
    }

    /// Dispatch a command.
    ///
    /// Applies the command through the reducer and runs one propagation
    /// pass over the mounted tree. If a pass is already in flight the
    /// command is queued and applied after that pass completes.
    pub fn dispatch(&self, command: C) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(command);
            if inner.in_pass {
                debug!("dispatch during pass; command queued");
                return;
            }
            inner.in_pass = true;
        }
        self.drain();
    }

    /// Run a propagation pass without applying any command.
    ///
    /// No-op while a pass is in flight (that pass already observes the
    /// current state).
    pub fn refresh(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.in_pass {
                return;
            }
            inner.in_pass = true;
        }
        self.drain();
    }

    /// Read the state through a closure without cloning.
    pub fn with_state<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow().state)
    }

    /// Clone of the current state.
    #[must_use]
    pub fn state(&self) -> S {
        self.inner.borrow().state.clone()
    }

    /// Apply all queued commands, then walk the tree with a fresh
    /// snapshot; repeat until the queue is empty.
    ///
    /// Caller must have set `in_pass`; it is cleared before returning.
    fn drain(&self) {
        loop {
            let (mut root, snapshot) = {
                let mut inner = self.inner.borrow_mut();
                let StoreInner {
                    state,
                    reducer,
                    queue,
                    ..
                } = &mut *inner;
                let applied = queue.len();
                while let Some(command) = queue.pop_front() {
                    (reducer)(state, command);
                }
                if applied > 0 {
                    debug!(commands = applied, "applied commands");
                }
                match inner.root.take() {
                    Some(root) => {
                        let snapshot = inner.state.clone();
                        (root, snapshot)
                    }
                    None => {
                        inner.in_pass = false;
                        return;
                    }
                }
            };

            {
                let _span = debug_span!("propagation_pass", root = root.name()).entered();
                root.update(&snapshot);
            }

            let mut inner = self.inner.borrow_mut();
            inner.root = Some(root);
            if inner.queue.is_empty() {
                inner.in_pass = false;
                return;
            }
            // Commands arrived during the pass: apply them and walk again.
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::{Dep, Selector};
    use crate::view::View;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct State {
        count: i32,
        label: String,
    }

    enum Command {
        Increment,
        SetLabel(String),
    }

    fn reduce(state: &mut State, command: Command) {
        match command {
            Command::Increment => state.count += 1,
            Command::SetLabel(label) => state.label = label,
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn count_view(log: &Log) -> View<State, i32> {
        let log = Rc::clone(log);
        View::with_selector(
            "count",
            Selector::new1(Dep::value(|s: &State| s.count), |c, _| *c),
            move |vs: &i32| log.borrow_mut().push(format!("count={vs}")),
        )
    }

    #[test]
    fn mount_runs_first_pass() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        store.mount(count_view(&log));

        assert_eq!(*log.borrow(), vec!["count=0"]);
    }

    #[test]
    fn dispatch_applies_and_repaints() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        store.mount(count_view(&log));

        store.dispatch(Command::Increment);
        store.dispatch(Command::Increment);

        assert_eq!(store.with_state(|s| s.count), 2);
        assert_eq!(*log.borrow(), vec!["count=0", "count=1", "count=2"]);
    }

    #[test]
    fn irrelevant_command_does_not_redraw() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        store.mount(count_view(&log));

        store.dispatch(Command::SetLabel("hello".into()));

        // A pass ran, but the count view's dependency did not change.
        assert_eq!(store.with_state(|s| s.label.clone()), "hello");
        assert_eq!(*log.borrow(), vec!["count=0"]);
    }

    #[test]
    fn refresh_without_command() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        store.mount(count_view(&log));

        store.refresh();
        // Nothing changed, so no redraw beyond the first render.
        assert_eq!(*log.borrow(), vec!["count=0"]);
    }

    #[test]
    fn reentrant_dispatch_is_deferred() {
        // A render callback dispatching mid-pass must not see its command
        // applied until the pass completes; the follow-up pass picks it up.
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);

        let render_log = Rc::clone(&log);
        let store_handle = store.clone();
        let view = View::with_selector(
            "count",
            Selector::new1(Dep::value(|s: &State| s.count), |c, _| *c),
            move |vs: &i32| {
                render_log.borrow_mut().push(format!("count={vs}"));
                if *vs == 1 {
                    // Re-enter: queued, applied after this pass.
                    store_handle.dispatch(Command::Increment);
                }
            },
        );
        store.mount(view);

        store.dispatch(Command::Increment);

        // Pass 1 renders count=1 and queues another increment; the store
        // then runs a second pass rendering count=2.
        assert_eq!(*log.borrow(), vec!["count=0", "count=1", "count=2"]);
        assert_eq!(store.with_state(|s| s.count), 2);
    }

    #[test]
    fn commands_applied_in_dispatch_order() {
        let store = Store::new(State::default(), |state: &mut State, command: Command| {
            if let Command::SetLabel(label) = command {
                state.label.push_str(&label);
            }
        });

        store.dispatch(Command::SetLabel("a".into()));
        store.dispatch(Command::SetLabel("b".into()));
        store.dispatch(Command::SetLabel("c".into()));

        assert_eq!(store.state().label, "abc");
    }

    #[test]
    fn unmount_destroys_root() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        store.mount(count_view(&log));
        store.unmount();

        // No tree mounted: dispatch still applies state changes.
        store.dispatch(Command::Increment);
        assert_eq!(store.with_state(|s| s.count), 1);
        assert_eq!(*log.borrow(), vec!["count=0"]);
    }

    #[test]
    fn remount_replaces_root() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        store.mount(count_view(&log));
        store.mount(count_view(&log));

        // Second mount forces the new tree's first render.
        assert_eq!(*log.borrow(), vec!["count=0", "count=0"]);
    }

    #[test]
    fn clone_shares_interior() {
        let log: Log = Rc::default();
        let store = Store::new(State::default(), reduce);
        let handle = store.clone();
        store.mount(count_view(&log));

        handle.dispatch(Command::Increment);
        assert_eq!(store.with_state(|s| s.count), 1);
        assert_eq!(*log.borrow(), vec!["count=0", "count=1"]);
    }
}
