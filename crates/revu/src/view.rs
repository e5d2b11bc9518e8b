#![forbid(unsafe_code)]

//! The view tree: selector-gated redraws and update propagation.
//!
//! # Design
//!
//! [`View<S, V>`] is a node in a tree walked top-down by one synchronous
//! [`update()`](Node::update) pass. A node redraws when its selector
//! reports a change (or unconditionally on its first update), then
//! cascades the same state reference to every child in registration
//! order — a parent that did not redraw never suppresses its children,
//! because state relevant to a deep child can change independently of its
//! ancestors.
//!
//! Parents exclusively own their children (`Vec<Box<dyn Node<S>>>`); no
//! child holds a reference back to its parent, so teardown is a plain
//! depth-first walk with no cycle risk.
//!
//! # Failure Modes
//!
//! - **No selector bound**: a configuration error, not a crash. The view
//!   warns once, never redraws, and still propagates to children.
//! - **Update after destroy**: guarded defensively; warns and does
//!   nothing.

use tracing::warn;

use crate::selector::Selector;

/// The rendering seam: the only externally observable effect of a view.
///
/// Implementations should tolerate being called repeatedly with an equal
/// view state; the propagation pass already avoids redundant calls, but
/// callers are not required to uphold that.
pub trait Render<V> {
    /// Apply a freshly derived view state.
    fn redraw(&mut self, view_state: &V);
}

impl<V, F: FnMut(&V)> Render<V> for F {
    fn redraw(&mut self, view_state: &V) {
        self(view_state)
    }
}

/// Object-safe seam for heterogeneous view trees: every node updates
/// against the same state type `S` but derives its own view-state type.
pub trait Node<S> {
    /// One step of a propagation pass: decide whether to redraw, then
    /// cascade to children with the same `state` reference.
    fn update(&mut self, state: &S);

    /// Tear the node down: children first (depth-first, registration
    /// order), then owned resources. Idempotent.
    fn destroy(&mut self);

    /// Identity, used for diagnostics and child lookup.
    fn name(&self) -> &str;

    /// Whether `destroy` has run.
    fn is_destroyed(&self) -> bool;
}

/// A view: an identity, an optional selector, a render sink, and an
/// ordered list of exclusively owned children.
pub struct View<S, V> {
    name: String,
    selector: Option<Selector<S, V>>,
    render: Option<Box<dyn Render<V>>>,
    children: Vec<Box<dyn Node<S>>>,
    first_update: bool,
    destroyed: bool,
    missing_selector_reported: bool,
}

impl<S, V> std::fmt::Debug for View<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("selector", &self.selector.is_some())
            .field("children", &self.children.len())
            .field("first_update", &self.first_update)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl<S: 'static, V: 'static> View<S, V> {
    /// Create a view with no selector bound yet.
    ///
    /// Until [`bind_selector`](Self::bind_selector) is called, updates
    /// warn (once) and never redraw, but still propagate to children.
    pub fn new(name: impl Into<String>, render: impl Render<V> + 'static) -> Self {
        Self {
            name: name.into(),
            selector: None,
            render: Some(Box::new(render)),
            children: Vec::new(),
            first_update: true,
            destroyed: false,
            missing_selector_reported: false,
        }
    }

    /// Create a view with a selector already bound.
    pub fn with_selector(
        name: impl Into<String>,
        selector: Selector<S, V>,
        render: impl Render<V> + 'static,
    ) -> Self {
        let mut view = Self::new(name, render);
        view.selector = Some(selector);
        view
    }

    /// Bind (or replace) the selector.
    pub fn bind_selector(&mut self, selector: Selector<S, V>) {
        self.selector = Some(selector);
    }

    /// Append a child; children are updated in insertion order.
    pub fn add_child(&mut self, child: impl Node<S> + 'static) {
        self.children.push(Box::new(child));
    }

    /// Number of live children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Remove the first child with the given name and destroy it.
    ///
    /// The child leaves the list before its own teardown runs. Returns
    /// false if no child matched.
    pub fn remove_child(&mut self, name: &str) -> bool {
        match self.children.iter().position(|c| c.name() == name) {
            Some(index) => {
                let mut child = self.children.remove(index);
                child.destroy();
                true
            }
            None => false,
        }
    }
}

impl<S: 'static, V: 'static> Node<S> for View<S, V> {
    fn update(&mut self, state: &S) {
        if self.destroyed {
            warn!(view = %self.name, "update on a destroyed view ignored");
            return;
        }
        if let Some(selector) = self.selector.as_mut() {
            let changed = selector.has_changed(state) || self.first_update;
            if changed {
                let view_state = selector.view_state(state);
                if let Some(render) = self.render.as_mut() {
                    render.redraw(&view_state);
                }
            }
        } else if !self.missing_selector_reported {
            warn!(view = %self.name, "view has no bound selector and will never redraw");
            self.missing_selector_reported = true;
        }
        self.first_update = false;
        for child in &mut self.children {
            child.update(state);
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        // The child list is emptied before any teardown runs.
        let mut children = std::mem::take(&mut self.children);
        for child in &mut children {
            child.destroy();
        }
        self.selector = None;
        self.render = None;
        self.destroyed = true;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
