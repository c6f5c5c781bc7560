use crate::merge::Merge;
use crate::state::LwwState;
use crate::timestamp::Timestamp;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::ptr;

/// A Last-Writer-Wins Element Set (LWW-Element-Set) that can be shared between
/// threads. Each replica owns one; replicas converge by merging each other's
/// full state.
///
/// Writers (`add`, `remove`, `merge`, `clear`) hold the lock exclusively and
/// readers share it, so a reader sees the state from before or after a write
/// and never half of a merge.
pub struct LwwElementSet<T: Eq + Hash> {
    state: RwLock<LwwState<T>>,
}

impl<T: Eq + Hash> LwwElementSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::from(LwwState::new())
    }

    /// Record an addition of `element`. An existing addition is only replaced
    /// by a strictly greater timestamp.
    pub fn add(&self, element: T, timestamp: Timestamp) {
        self.state.write().add(element, timestamp);
    }

    /// Record a removal of `element`, with the same policy as `add`. Removing
    /// something that was never added is fine and leaves a tombstone.
    pub fn remove(&self, element: T, timestamp: Timestamp) {
        self.state.write().remove(element, timestamp);
    }

    /// Returns true if `element` was added and the addition beats any removal.
    /// An addition and removal with equal timestamps count as removed.
    pub fn contains(&self, element: &T) -> bool {
        self.state.read().contains(element)
    }

    /// The number of visible elements.
    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    /// Returns true if no element is visible.
    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Forget every addition and removal, tombstones included.
    pub fn clear(&self) {
        self.state.write().clear();
    }

    /// Take the state out of the lock.
    pub fn into_state(self) -> LwwState<T> {
        self.state.into_inner()
    }
}

impl<T: Eq + Hash + Clone> LwwElementSet<T> {
    /// Copy out every visible element. Uses the same rule as `contains`.
    pub fn elements(&self) -> HashSet<T> {
        self.state.read().elements()
    }

    /// Call `f` with each visible element. Works on a copy, so `f` is free to
    /// modify this set.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        for element in &self.elements() {
            f(element);
        }
    }

    /// Merge `other`'s full state into this set, keeping the greater timestamp
    /// per element in both the additions and the removals.
    ///
    /// `other` is copied under its own read lock before this set's write lock
    /// is taken, so two sets merging from each other at the same time can't
    /// deadlock.
    pub fn merge(&self, other: &Self) {
        if ptr::eq(self, other) {
            return;
        }

        let incoming = other.snapshot();
        self.state.write().merge_from(incoming);
    }

    /// Like `merge`, but gives you a new set instead of mutating this one.
    #[must_use]
    pub fn merged_with(&self, other: &Self) -> Self {
        Self::from(self.snapshot().merge(other.snapshot()))
    }

    /// Copy the current state, for example to send it to a peer.
    pub fn snapshot(&self) -> LwwState<T> {
        self.state.read().clone()
    }
}

impl<T: Eq + Hash> From<LwwState<T>> for LwwElementSet<T> {
    fn from(state: LwwState<T>) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl<T: Eq + Hash> Default for LwwElementSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> Clone for LwwElementSet<T> {
    fn clone(&self) -> Self {
        Self::from(self.snapshot())
    }
}

impl<T: Eq + Hash + fmt::Debug> fmt::Debug for LwwElementSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LwwElementSet")
            .field("state", &*self.state.read())
            .finish()
    }
}
