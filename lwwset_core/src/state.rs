use crate::merge::Merge;
use crate::timestamp::Timestamp;
use std::collections::{hash_map::Entry, HashMap, HashSet};
use std::hash::Hash;

/// The state of an LWW-Element-Set: the latest addition and removal seen for
/// every element. This is the plain value that replicas exchange. It is not
/// synchronised; `LwwElementSet` wraps it for shared use.
///
/// Records are never dropped except by `clear`, so removals stay around as
/// tombstones for as long as the state lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LwwState<T: Eq + Hash> {
    pub(crate) additions: HashMap<T, Timestamp>,
    pub(crate) removals: HashMap<T, Timestamp>,
}

impl<T: Eq + Hash> LwwState<T> {
    /// Create an empty state.
    pub fn new() -> Self {
        Self {
            additions: HashMap::new(),
            removals: HashMap::new(),
        }
    }

    /// Record an addition. Replaces an existing addition for the same element
    /// only if `timestamp` is strictly greater. Returns whether the record was
    /// taken.
    pub fn add(&mut self, element: T, timestamp: Timestamp) -> bool {
        let accepted = upsert(&mut self.additions, element, timestamp);
        tracing::trace!(accepted, "add");
        accepted
    }

    /// Record a removal, with the same policy as `add`. Elements that were
    /// never added can still be removed; the tombstone hides any addition that
    /// arrives later with a timestamp that doesn't beat it.
    pub fn remove(&mut self, element: T, timestamp: Timestamp) -> bool {
        let accepted = upsert(&mut self.removals, element, timestamp);
        tracing::trace!(accepted, "remove");
        accepted
    }

    /// Returns true if the element was added and its addition beats any
    /// removal. An addition and removal that tie count as removed.
    pub fn contains(&self, element: &T) -> bool {
        match (self.additions.get(element), self.removals.get(element)) {
            (Some(added), Some(removed)) => added > removed,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// An iterator over the visible elements, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.additions
            .keys()
            .filter(move |element| self.contains(element))
    }

    /// The number of visible elements.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no element is visible. Tombstones may remain.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// The latest addition recorded for every element, visible or not.
    pub fn additions(&self) -> &HashMap<T, Timestamp> {
        &self.additions
    }

    /// The latest removal recorded for every element.
    pub fn removals(&self) -> &HashMap<T, Timestamp> {
        &self.removals
    }

    /// Forget every addition and removal.
    pub fn clear(&mut self) {
        tracing::debug!(
            additions = self.additions.len(),
            removals = self.removals.len(),
            "clearing"
        );
        self.additions.clear();
        self.removals.clear();
    }

    /// Fold another state into this one, keeping the greater timestamp per
    /// element in each map.
    pub fn merge_from(&mut self, other: Self) {
        let mut accepted = 0usize;
        let mut seen = 0usize;

        for (element, timestamp) in other.additions {
            seen += 1;
            accepted += usize::from(upsert(&mut self.additions, element, timestamp));
        }
        for (element, timestamp) in other.removals {
            seen += 1;
            accepted += usize::from(upsert(&mut self.removals, element, timestamp));
        }

        tracing::debug!(seen, accepted, "merged state");
    }
}

impl<T: Eq + Hash + Clone> LwwState<T> {
    /// Copy out every visible element.
    pub fn elements(&self) -> HashSet<T> {
        self.iter().cloned().collect()
    }
}

/// Insert `timestamp` for `element` unless the map already holds one that
/// isn't beaten by it.
fn upsert<T: Eq + Hash>(map: &mut HashMap<T, Timestamp>, element: T, timestamp: Timestamp) -> bool {
    match map.entry(element) {
        Entry::Occupied(mut entry) => {
            if timestamp > *entry.get() {
                entry.insert(timestamp);
                true
            } else {
                false
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(timestamp);
            true
        }
    }
}

impl<T: Eq + Hash> Merge for LwwState<T> {
    fn merge(mut self, other: Self) -> Self {
        self.merge_from(other);
        self
    }
}

impl<T: Eq + Hash> Default for LwwState<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    mod add {
        use super::*;

        #[test]
        fn added_elements_are_contained() {
            let mut state = LwwState::new();
            state.add(1, Timestamp::new("A", 1));

            assert!(state.contains(&1));
            assert!(!state.contains(&2));
        }

        #[test]
        fn keeps_the_newer_addition() {
            let newer = Timestamp::new_at("A", 2, at(0));
            let mut state = LwwState::new();

            assert!(state.add("x", newer.clone()));
            assert!(!state.add("x", Timestamp::new_at("A", 1, at(1))));

            assert_eq!(state.additions().get("x"), Some(&newer));
        }

        #[test]
        fn ties_keep_the_existing_record() {
            let first = Timestamp::new_at("A", 1, at(0));
            let tied = Timestamp::new_at("A", 1, at(0));
            let mut state = LwwState::new();

            state.add("x", first.clone());
            assert!(!state.add("x", tied));

            assert_eq!(state.additions().get("x"), Some(&first));
        }
    }

    mod remove {
        use super::*;

        #[test]
        fn newer_removal_hides_the_element() {
            let mut state = LwwState::new();
            state.add(1, Timestamp::new("A", 1));
            state.remove(1, Timestamp::new("A", 2));

            assert!(!state.contains(&1));
        }

        #[test]
        fn older_removal_leaves_the_element() {
            let mut state = LwwState::new();
            state.add(1, Timestamp::new("A", 2));
            state.remove(1, Timestamp::new("A", 1));

            assert!(state.contains(&1));
        }

        #[test]
        fn removing_first_leaves_a_tombstone() {
            let mut state = LwwState::new();
            state.remove("ghost", Timestamp::new_at("A", 5, at(5)));
            state.add("ghost", Timestamp::new_at("B", 1, at(2)));

            assert!(!state.contains(&"ghost"));
            assert_eq!(state.removals().len(), 1);
        }

        #[test]
        fn a_later_add_beats_a_tombstone() {
            let mut state = LwwState::new();
            state.remove("ghost", Timestamp::new_at("A", 5, at(2)));
            state.add("ghost", Timestamp::new_at("B", 1, at(5)));

            assert!(state.contains(&"ghost"));
        }
    }

    mod ties {
        use super::*;

        #[test]
        fn identical_add_and_remove_resolve_to_removed() {
            let timestamp = Timestamp::new("A", 1);
            let mut state = LwwState::new();
            state.add(1, timestamp.clone());
            state.remove(1, timestamp);

            assert!(!state.contains(&1));
            assert!(state.elements().is_empty(), "elements agrees with contains");
        }

        #[test]
        fn rule_ties_resolve_to_removed() {
            let mut state = LwwState::new();
            state.add(1, Timestamp::new_at("A", 1, at(0)));
            state.remove(1, Timestamp::new_at("B", 9, at(0)));

            assert!(!state.contains(&1));
            assert!(!state.elements().contains(&1));
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn lists_only_visible_elements() {
            let mut state = LwwState::new();
            state.add("a", Timestamp::new_at("A", 1, at(0)));
            state.add("b", Timestamp::new_at("A", 2, at(0)));
            state.remove("b", Timestamp::new_at("A", 3, at(0)));
            state.remove("c", Timestamp::new_at("A", 4, at(0)));

            assert_eq!(state.elements(), HashSet::from(["a"]));
            assert_eq!(state.len(), 1);
            assert!(!state.is_empty());
        }

        proptest! {
            #[test]
            fn agrees_with_contains(states in crate::test::states(1)) {
                let state = &states[0];
                let elements = state.elements();

                for element in 0..5u8 {
                    prop_assert_eq!(elements.contains(&element), state.contains(&element));
                }
            }
        }
    }

    #[test]
    fn clear_forgets_everything() {
        let mut state = LwwState::new();
        state.add(1, Timestamp::new("A", 1));
        state.remove(2, Timestamp::new("A", 2));
        state.clear();

        assert!(state.additions().is_empty());
        assert!(state.removals().is_empty());
        assert!(state.is_empty());
    }

    mod merge {
        use super::*;

        #[test]
        fn merge_nothing() {
            let merged = LwwState::<u8>::new().merge(LwwState::new());

            assert!(merged.is_empty());
        }

        #[test]
        fn takes_the_union() {
            let mut a = LwwState::new();
            a.add(1, Timestamp::new("A", 1));
            let mut b = LwwState::new();
            b.add(2, Timestamp::new("B", 1));

            let merged = a.merge(b);

            assert_eq!(merged.elements(), HashSet::from([1, 2]));
        }

        #[test]
        fn carries_removals_across() {
            let mut a = LwwState::new();
            a.add("x", Timestamp::new_at("A", 1, at(0)));
            let mut b = LwwState::new();
            b.remove("x", Timestamp::new_at("B", 1, at(1)));

            assert!(!a.merge(b).contains(&"x"));
        }

        #[test]
        fn keeps_the_greater_timestamp_per_element() {
            let older = Timestamp::new_at("A", 1, at(0));
            let newer = Timestamp::new_at("B", 1, at(1));
            let mut a = LwwState::new();
            a.add("x", newer.clone());
            let mut b = LwwState::new();
            b.add("x", older);

            let merged = a.merge(b);

            assert_eq!(merged.additions().get("x"), Some(&newer));
        }

        proptest! {
            #[test]
            fn merge_idempotent(states in crate::test::states(1)) {
                let [a]: [LwwState<u8>; 1] = states.try_into().unwrap();
                crate::merge::test_idempotent(a);
            }

            #[test]
            fn merge_commutative(states in crate::test::states(2)) {
                let [a, b]: [LwwState<u8>; 2] = states.try_into().unwrap();
                crate::merge::test_commutative(a, b);
            }

            #[test]
            fn merge_associative(states in crate::test::states(3)) {
                let [a, b, c]: [LwwState<u8>; 3] = states.try_into().unwrap();
                crate::merge::test_associative(a, b, c);
            }

            #[test]
            fn merge_never_downgrades(states in crate::test::states(2)) {
                let [a, b]: [LwwState<u8>; 2] = states.try_into().unwrap();
                let merged = a.clone().merge(b);

                for (element, timestamp) in a.additions() {
                    let kept = merged.additions().get(element).unwrap();
                    prop_assert!(kept >= timestamp);
                }
            }
        }
    }

    #[test]
    fn chained_adds_use_latest_counter() {
        let mut state = LwwState::new();
        let base = at(0);
        for counter in 1..=5 {
            state.add("x", Timestamp::new_at("A", counter, base - Duration::seconds(10)));
        }

        assert_eq!(state.additions().get("x").map(Timestamp::counter), Some(5));
    }
}
