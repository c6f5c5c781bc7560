use crate::lww_element_set::LwwElementSet;
use crate::replica_id::ReplicaId;
use crate::timestamp::Timestamp;
use chrono::{DateTime, Utc};
use std::hash::Hash;

/// One participant in replication: a set together with the ID and counter it
/// stamps its own operations with.
#[derive(Debug)]
pub struct Replica<T: Eq + Hash> {
    id: ReplicaId,

    // for bookkeeping
    counter: u64,

    set: LwwElementSet<T>,
}

impl<T: Eq + Hash> Replica<T> {
    /// Create a replica with an empty set.
    pub fn new(id: impl Into<ReplicaId>) -> Self {
        Self {
            id: id.into(),
            counter: 0,
            set: LwwElementSet::new(),
        }
    }

    /// Get this replica's ID.
    pub fn id(&self) -> &ReplicaId {
        &self.id
    }

    /// Get the counter of the last timestamp this replica issued.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Get the set this replica owns. Peers merge from it.
    pub fn set(&self) -> &LwwElementSet<T> {
        &self.set
    }

    fn next_timestamp_at(&mut self, now: DateTime<Utc>) -> Timestamp {
        self.counter += 1;
        Timestamp::new_at(self.id.clone(), self.counter, now)
    }

    /// Add an element, stamped with this replica's next counter.
    pub fn add(&mut self, element: T) -> Timestamp {
        self.add_at(element, Utc::now())
    }

    /// Like `add`, but as if the wall clock read `now`.
    pub fn add_at(&mut self, element: T, now: DateTime<Utc>) -> Timestamp {
        let timestamp = self.next_timestamp_at(now);
        tracing::debug!(replica = %self.id, %timestamp, "add");
        self.set.add(element, timestamp.clone());
        timestamp
    }

    /// Remove an element, stamped with this replica's next counter.
    pub fn remove(&mut self, element: T) -> Timestamp {
        self.remove_at(element, Utc::now())
    }

    /// Like `remove`, but as if the wall clock read `now`.
    pub fn remove_at(&mut self, element: T, now: DateTime<Utc>) -> Timestamp {
        let timestamp = self.next_timestamp_at(now);
        tracing::debug!(replica = %self.id, %timestamp, "remove");
        self.set.remove(element, timestamp.clone());
        timestamp
    }
}

impl<T: Eq + Hash + Clone> Replica<T> {
    /// Merge a peer's full state into this replica's set.
    pub fn receive(&self, peer: &LwwElementSet<T>) {
        tracing::debug!(replica = %self.id, "receiving peer state");
        self.set.merge(peer);
    }
}
