use crate::error;
use crate::state::LwwState;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::Hash;

/// Both maps as entry lists. Elements don't have to be strings (or anything
/// else a JSON object key can be) this way.
#[derive(Serialize)]
struct EntriesRef<'a, T> {
    additions: Vec<(&'a T, &'a Timestamp)>,
    removals: Vec<(&'a T, &'a Timestamp)>,
}

#[derive(Deserialize)]
struct Entries<T> {
    additions: Vec<(T, Timestamp)>,
    removals: Vec<(T, Timestamp)>,
}

impl<T> Serialize for LwwState<T>
where
    T: Eq + Hash + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EntriesRef {
            additions: self.additions.iter().collect(),
            removals: self.removals.iter().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for LwwState<T>
where
    T: Eq + Hash + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Entries::<T>::deserialize(deserializer)?;

        // go through the usual upserts so repeated entries can't downgrade
        let mut state = Self::new();
        for (element, timestamp) in entries.additions {
            state.add(element, timestamp);
        }
        for (element, timestamp) in entries.removals {
            state.remove(element, timestamp);
        }

        Ok(state)
    }
}

impl<T> LwwState<T>
where
    T: Eq + Hash + Serialize,
{
    /// Encode the full state (every addition and removal) as JSON.
    pub fn to_json(&self) -> error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T> LwwState<T>
where
    T: Eq + Hash + for<'de> Deserialize<'de>,
{
    /// Decode state produced by `to_json`.
    pub fn from_json(json: &str) -> error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
