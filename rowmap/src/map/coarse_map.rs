use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use parking_lot::Mutex;

use super::Map;

/// A concurrent hashmap implemented with coarse-grained locking.
///
/// Every operation serializes on one mutex. Useful as a baseline and as a
/// reference model when checking [`StripedHashMap`](super::StripedHashMap).
pub struct CoarseMap<K, V, S = RandomState>(Mutex<HashMap<K, V, S>>);

impl<K, V> Default for CoarseMap<K, V, RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CoarseMap<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S> CoarseMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self(Mutex::new(HashMap::with_hasher(hasher)))
    }
}

impl<K, V, S> Map for CoarseMap<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    type Key = K;
    type Val = V;

    fn get(&self, key: &K) -> Option<V> {
        self.0.lock().get(key).cloned()
    }

    fn contains(&self, key: &K) -> bool {
        self.0.lock().contains_key(key)
    }

    fn put(&self, key: K, value: V) {
        self.0.lock().insert(key, value);
    }

    fn remove(&self, key: &K) -> bool {
        self.0.lock().remove(key).is_some()
    }

    fn len(&self) -> usize {
        self.0.lock().len()
    }

    fn clear(&self) {
        self.0.lock().clear();
    }
}
