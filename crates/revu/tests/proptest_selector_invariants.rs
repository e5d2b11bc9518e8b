//! Property-based invariant tests for selector change detection.
//!
//! These tests verify invariants that must hold for **any** sequence of
//! observed states:
//!
//! 1. The first `has_changed` call returns true regardless of values.
//! 2. Two consecutive evaluations against equal dependency values return
//!    false on the second.
//! 3. Changing any single dependency makes `has_changed` return true.
//! 4. A fresh sequence instance with equal elements is "unchanged";
//!    differing in length or any element is "changed".
//! 5. After a `has_changed` call, `view_state` reflects exactly the
//!    values observed by that call.
//! 6. Arity-0 selectors report "changed" on every call.

use proptest::prelude::*;
use revu::{Dep, Selector};

#[derive(Clone, Debug)]
struct State {
    a: i32,
    b: bool,
    items: Vec<u8>,
}

fn states() -> impl Strategy<Value = State> {
    (
        any::<i32>(),
        any::<bool>(),
        proptest::collection::vec(any::<u8>(), 0..8),
    )
        .prop_map(|(a, b, items)| State { a, b, items })
}

fn two_dep_selector() -> Selector<State, (i32, bool)> {
    Selector::new2(
        Dep::value(|s: &State| s.a),
        Dep::value(|s: &State| s.b),
        |a, b, _| (*a, *b),
    )
}

proptest! {
    // 1. First call always reports a change.
    #[test]
    fn first_call_is_always_changed(s in states()) {
        let mut sel = two_dep_selector();
        prop_assert!(sel.has_changed(&s));
    }

    // 2. Equal dependency values on the next call: no change.
    #[test]
    fn unchanged_values_report_false(s in states()) {
        let mut sel = two_dep_selector();
        sel.has_changed(&s);
        prop_assert!(!sel.has_changed(&s.clone()));
    }

    // 3. Any single dependency change flips the result to true.
    #[test]
    fn single_dep_change_reports_true(s in states(), delta in 1i32..100) {
        let mut sel = two_dep_selector();
        sel.has_changed(&s);

        let mut changed_a = s.clone();
        changed_a.a = s.a.wrapping_add(delta);
        prop_assert!(sel.has_changed(&changed_a));

        // Memo now holds changed_a's values; flip only b.
        let mut changed_b = changed_a.clone();
        changed_b.b = !changed_a.b;
        prop_assert!(sel.has_changed(&changed_b));
    }

    // 4a. A fresh instance with equal elements is unchanged.
    #[test]
    fn equal_sequence_instances_unchanged(s in states()) {
        let mut sel = Selector::new1(
            Dep::sequence(|s: &State| s.items.clone()),
            |items, _| items.len(),
        );
        sel.has_changed(&s);
        prop_assert!(!sel.has_changed(&s.clone()));
    }

    // 4b. Dropping an element or mutating one is a change.
    #[test]
    fn sequence_mutation_is_changed(s in states(), idx in 0usize..8) {
        let mut sel = Selector::new1(
            Dep::sequence(|s: &State| s.items.clone()),
            |items, _| items.len(),
        );
        sel.has_changed(&s);

        let mut shorter = s.clone();
        if shorter.items.pop().is_some() {
            prop_assert!(sel.has_changed(&shorter));
            sel.has_changed(&s); // Restore the memo.
        }

        let mut mutated = s.clone();
        if !mutated.items.is_empty() {
            let i = idx % mutated.items.len();
            mutated.items[i] = mutated.items[i].wrapping_add(1);
            prop_assert!(sel.has_changed(&mutated));
        }
    }

    // 5. view_state reflects the values observed by the last has_changed.
    #[test]
    fn view_state_matches_last_observation(s1 in states(), s2 in states()) {
        let mut sel = two_dep_selector();

        sel.has_changed(&s1);
        prop_assert_eq!(sel.view_state(&s1), (s1.a, s1.b));

        sel.has_changed(&s2);
        prop_assert_eq!(sel.view_state(&s2), (s2.a, s2.b));
    }

    // 6. Arity 0: every call is a change.
    #[test]
    fn arity0_every_call_changed(s in states(), calls in 1usize..10) {
        let mut sel = Selector::new(|s: &State| s.a);
        for _ in 0..calls {
            prop_assert!(sel.has_changed(&s));
        }
    }
}
