use crate::replica_id::ReplicaId;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt::{self, Display};
use uuid::Uuid;

/// The tag attached to every add and remove. When two operations on the same
/// element conflict, the one with the greater timestamp wins.
///
/// Timestamps from the same replica are ordered by their counter. Timestamps
/// from different replicas fall back to the wall clock captured when they were
/// created. That fallback is the usual weak point of a simple LWW set: skewed
/// or identical clocks on two replicas can order operations differently from
/// how they really happened, and the ordering is not guaranteed to be
/// transitive across a mix of replicas. Nothing here tracks causality to paper
/// over that.
///
/// The unique ID only takes part in equality. Two timestamps that the ordering
/// rule considers equal but that differ in any attribute are incomparable, so
/// `<` and `>` are both false for them.
#[derive(Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub struct Timestamp {
    /// The replica that issued this timestamp.
    replica: ReplicaId,

    /// Monotonically increasing per replica. Supplied by the caller.
    counter: u64,

    /// Minted at construction so no two timestamps are ever equal by accident.
    unique_id: Uuid,

    /// When this timestamp was created. Breaks ties between replicas.
    wall_clock: DateTime<Utc>,
}

impl Timestamp {
    /// Create a new timestamp at the current wall-clock time.
    pub fn new(replica: impl Into<ReplicaId>, counter: u64) -> Self {
        Self::new_at(replica, counter, Utc::now())
    }

    /// Create a new timestamp as if the wall clock read `now`. Useful for
    /// deterministic tests and for drivers that keep their own clock.
    pub fn new_at(replica: impl Into<ReplicaId>, counter: u64, now: DateTime<Utc>) -> Self {
        Self::from_parts(replica, counter, Uuid::new_v4(), now)
    }

    /// Rebuild a timestamp from every one of its attributes. Only for testing
    /// and decoding state received from elsewhere; otherwise use `new` or
    /// `new_at` so the unique ID is freshly minted.
    pub fn from_parts(
        replica: impl Into<ReplicaId>,
        counter: u64,
        unique_id: Uuid,
        wall_clock: DateTime<Utc>,
    ) -> Self {
        Self {
            replica: replica.into(),
            counter,
            unique_id,
            wall_clock,
        }
    }

    /// Order two timestamps: by counter when they come from the same replica,
    /// by wall clock otherwise.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.replica == other.replica {
            self.counter.cmp(&other.counter)
        } else {
            self.wall_clock.cmp(&other.wall_clock)
        }
    }

    /// Get the replica that issued this timestamp.
    pub fn replica(&self) -> &ReplicaId {
        &self.replica
    }

    /// Get the counter of this timestamp.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Get the unique ID minted for this timestamp.
    pub fn unique_id(&self) -> Uuid {
        self.unique_id
    }

    /// Get the wall-clock time this timestamp was created at.
    pub fn wall_clock(&self) -> DateTime<Utc> {
        self.wall_clock
    }
}

/// Not transitive across a mix of replicas (counters within one, wall clocks
/// between them), so generic code that relies on `PartialOrd` transitivity,
/// like sorting, must not be given such timestamps.
impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.compare(other) {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.replica,
            self.counter,
            self.wall_clock.format("%M:%S")
        )
    }
}
