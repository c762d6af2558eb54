//! This module contains concurrent hashmap implementations.

mod coarse_map;
mod striped_map;

pub use coarse_map::CoarseMap;
pub use striped_map::StripedHashMap;

use std::hash::Hash;

/// Common functionalities for hash maps.
///
/// Values are handed out by clone; no reference into a map outlives the
/// call that produced it.
pub trait Map {
    /// Key type for a HashMap implementation.
    type Key: Hash + Eq;
    /// Value type for a HashMap implementation.
    type Val;

    /// Get a copy of the value associated with a key, if it exists.
    fn get(&self, key: &Self::Key) -> Option<Self::Val>;

    /// Check whether the map contains a value mapped to the given key.
    fn contains(&self, key: &Self::Key) -> bool;

    /// Emplaces a key-value pair into the map.
    ///
    /// If there were a key-value pair associated with this provided key,
    /// it will be overwritten.
    fn put(&self, key: Self::Key, value: Self::Val);

    /// Attempts to remove a key-value pair based on the provided key, returning
    /// whether a key-value pair was found and removed.
    fn remove(&self, key: &Self::Key) -> bool;

    /// Number of key-value pairs in the map.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key-value pair.
    fn clear(&self);
}
