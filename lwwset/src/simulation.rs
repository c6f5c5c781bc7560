use chrono::{DateTime, Utc};
use lwwset_core::{Replica, Timestamp};
use rand::Rng;
use rand_pcg::Pcg32;
use std::collections::BTreeSet;
use std::fmt::{self, Display};

/// Which replica acts on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

/// What a replica did on a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Added(String, Timestamp),
    Removed(String, Timestamp),
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added(element, timestamp) => write!(f, "added {element:?} at {timestamp}"),
            Self::Removed(element, timestamp) => write!(f, "removed {element:?} at {timestamp}"),
        }
    }
}

/// Two replicas that each own their set and counter, plus the generator
/// deciding what they do.
pub struct Simulation {
    a: Replica<String>,
    b: Replica<String>,
    rng: Pcg32,
    elements: u32,
    remove_chance: u32,
}

impl Simulation {
    /// Set up empty replicas "UserA" and "UserB". `elements` is raised to at
    /// least 1 and `remove_chance` capped at 100.
    pub fn new(seed: u64, elements: u32, remove_chance: u32) -> Self {
        Self {
            a: Replica::new("UserA"),
            b: Replica::new("UserB"),
            rng: Pcg32::new(seed, 0xa02_bdbf_7bb3_c0a7),
            elements: elements.max(1),
            remove_chance: remove_chance.min(100),
        }
    }

    /// Get one of the replicas.
    pub fn replica(&self, side: Side) -> &Replica<String> {
        match side {
            Side::A => &self.a,
            Side::B => &self.b,
        }
    }

    /// Have one replica add or remove a random element, then sync.
    pub fn step(&mut self, side: Side) -> Operation {
        self.step_at(side, Utc::now())
    }

    /// Like `step`, but as if the wall clock read `now`.
    pub fn step_at(&mut self, side: Side, now: DateTime<Utc>) -> Operation {
        let element = format!("Element {}", self.rng.gen_range(1..=self.elements));
        let remove = self.rng.gen_ratio(self.remove_chance, 100);

        let replica = match side {
            Side::A => &mut self.a,
            Side::B => &mut self.b,
        };
        let operation = if remove {
            let timestamp = replica.remove_at(element.clone(), now);
            Operation::Removed(element, timestamp)
        } else {
            let timestamp = replica.add_at(element.clone(), now);
            Operation::Added(element, timestamp)
        };

        self.sync();
        operation
    }

    /// Exchange full state in both directions.
    pub fn sync(&self) {
        self.a.receive(self.b.set());
        self.b.receive(self.a.set());
    }

    /// The elements replica A can see, sorted for display.
    pub fn visible(&self) -> BTreeSet<String> {
        self.a.set().elements().into_iter().collect()
    }
}
