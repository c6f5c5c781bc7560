//! A Last-Writer-Wins Element Set (LWW-Element-Set): a state-based CRDT that
//! lets replicas add and remove elements independently and converge by merging
//! each other's full state.

/// Things that can go wrong when encoding or decoding state.
pub mod error;
pub use error::Error;

/// The thread-safe replicated set.
pub mod lww_element_set;
pub use lww_element_set::LwwElementSet;

/// The interface all CRDTs must implement to merge.
pub mod merge;
pub use merge::Merge;

/// A replica (that is, a set + replica ID + counter)
pub mod replica;
pub use replica::Replica;

/// A replica ID.
pub mod replica_id;
pub use replica_id::ReplicaId;

/// JSON encoding of replica state.
mod snapshot;

/// The additions and removals behind a set.
pub mod state;
pub use state::LwwState;

/// The tag that decides which operation wins.
pub mod timestamp;
pub use timestamp::Timestamp;
