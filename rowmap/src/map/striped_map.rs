use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam::utils::CachePadded;
use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use super::Map;
use crate::chain::Chain;
use crate::config::DEFAULT_NUM_ROWS;
use crate::{Error, Result};

type Row<K, V> = CachePadded<RwLock<Chain<K, V>>>;

fn new_row<K, V>() -> Row<K, V> {
    CachePadded::new(RwLock::new(Chain::default()))
}

/// The rows of one table generation. Each row lock owns its chain, so the
/// number of rows and row locks can never drift apart.
///
/// A `Table` is only reachable through a guard of the table-wide lock, which
/// makes "table lock first, row lock second" the only possible order.
struct Table<K, V> {
    rows: Box<[Row<K, V>]>,
}

impl<K, V> Table<K, V> {
    /// Caller guarantees `num_rows > 0`.
    fn new(num_rows: usize) -> Self {
        Self {
            rows: (0..num_rows).map(|_| new_row()).collect(),
        }
    }

    fn try_new(num_rows: usize) -> Result<Self> {
        if num_rows == 0 {
            return Err(Error::ZeroRows);
        }
        let mut rows = Vec::new();
        rows.try_reserve_exact(num_rows)?;
        rows.extend((0..num_rows).map(|_| new_row()));
        Ok(Self {
            rows: rows.into_boxed_slice(),
        })
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }

    fn index(&self, hash: u64) -> usize {
        (hash % self.rows.len() as u64) as usize
    }

    fn row(&self, hash: u64) -> &RwLock<Chain<K, V>> {
        &self.rows[self.index(hash)]
    }

    /// Exclusive access to the whole table means no row lock can be held.
    fn row_mut(&mut self, hash: u64) -> &mut Chain<K, V> {
        let index = self.index(hash);
        self.rows[index].get_mut()
    }
}

/// A concurrent hashmap using separate chaining and row-striped locking.
///
/// Lookups take the table lock shared and their row lock shared; inserts and
/// removals take the table lock shared and their row lock exclusive, so work
/// on different rows runs in parallel. [`clear`](Self::clear) and
/// [`resize`](Self::resize) take the table lock exclusive and stop every
/// other operation until they finish.
///
/// ```
/// use rowmap::StripedHashMap;
///
/// let map = StripedHashMap::new();
/// map.put(1, "a");
/// map.put(1, "b");
/// assert_eq!(map.get(&1), Some("b"));
/// assert_eq!(map.len(), 1);
///
/// map.resize(64).unwrap();
/// assert_eq!(map.get(&1), Some("b"));
/// ```
pub struct StripedHashMap<K, V, S = RandomState> {
    table: RwLock<Table<K, V>>,
    len: CachePadded<AtomicUsize>,
    max_avg_row_len: Option<usize>,
    state: S,
}

impl<K, V> Default for StripedHashMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> StripedHashMap<K, V, RandomState>
where
    K: Hash + Eq,
{
    pub fn new() -> Self {
        StripedHashMap::with_hasher(RandomState::default())
    }

    pub fn with_num_rows(num_rows: usize) -> Result<Self> {
        StripedHashMap::build(num_rows, None, RandomState::default())
    }
}

impl<K, V, S> StripedHashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        StripedHashMap::from_table(Table::new(DEFAULT_NUM_ROWS), None, hasher)
    }

    pub(crate) fn build(
        num_rows: usize,
        max_avg_row_len: Option<usize>,
        hasher: S,
    ) -> Result<Self> {
        let table = Table::try_new(num_rows)?;
        Ok(StripedHashMap::from_table(table, max_avg_row_len, hasher))
    }

    fn from_table(table: Table<K, V>, max_avg_row_len: Option<usize>, hasher: S) -> Self {
        trace!(rows = table.num_rows(), ?max_avg_row_len, "created map");
        StripedHashMap {
            table: RwLock::new(table),
            len: CachePadded::new(AtomicUsize::new(0)),
            max_avg_row_len,
            state: hasher,
        }
    }

    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        let mut hasher = self.state.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    /// Returns a copy of the value mapped to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let hash = self.hash(key);
        let table = self.table.read();
        let row = table.row(hash).read();
        row.get(key).cloned()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let table = self.table.read();
        let row = table.row(hash).read();
        row.get(key).is_some()
    }

    /// Inserts `key`, or overwrites its value in place if already present.
    pub fn put(&self, key: K, value: V) {
        let hash = self.hash(&key);
        let observed_rows = {
            let table = self.table.read();
            let mut row = table.row(hash).write();
            if row.upsert(key, value).is_some() {
                return;
            }
            let len = self.len.fetch_add(1, Ordering::Relaxed) + 1;
            match self.max_avg_row_len {
                Some(limit) if len >= limit.saturating_mul(table.num_rows()) => table.num_rows(),
                _ => return,
            }
        };
        // both locks are released here; growing takes the table lock exclusive.
        self.grow(observed_rows);
    }

    /// Removes `key`, returning whether it was present.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash(key);
        let table = self.table.read();
        let mut row = table.row(hash).write();
        if row.remove(key).is_none() {
            return false;
        }
        self.len.fetch_sub(1, Ordering::Relaxed);
        true
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_rows(&self) -> usize {
        self.table.read().num_rows()
    }

    /// Drops every entry and replaces every row lock, keeping the row count.
    pub fn clear(&self) {
        let mut table = self.table.write();
        for row in table.rows.iter_mut() {
            *row = new_row();
        }
        let dropped = self.len.swap(0, Ordering::Relaxed);
        debug!(rows = table.num_rows(), dropped, "cleared map");
    }

    /// Rehashes every entry into `num_rows` fresh rows.
    ///
    /// Blocks all other operations for its whole duration, so nobody can see
    /// a partially rehashed table. Fails without touching the map if
    /// `num_rows` is 0 or the new rows cannot be allocated.
    pub fn resize(&self, num_rows: usize) -> Result<()> {
        let fresh = Table::try_new(num_rows)?;
        let mut table = self.table.write();
        self.rehash(&mut table, fresh)
    }

    fn grow(&self, observed_rows: usize) {
        if self.num_rows() != observed_rows {
            // another put already grew the table
            return;
        }
        let doubled = observed_rows.saturating_mul(2);
        let fresh = match Table::try_new(doubled) {
            Ok(fresh) => fresh,
            Err(err) => {
                warn!(rows = observed_rows, to = doubled, %err, "could not grow map");
                return;
            }
        };
        let mut table = self.table.write();
        if table.num_rows() != observed_rows {
            // someone else resized first
            return;
        }
        if let Err(err) = self.rehash(&mut table, fresh) {
            warn!(rows = observed_rows, to = doubled, %err, "could not grow map");
        }
    }

    fn rehash(&self, table: &mut Table<K, V>, fresh: Table<K, V>) -> Result<()> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(self.len.load(Ordering::Relaxed))?;

        let old = mem::replace(table, fresh);
        let from = old.num_rows();
        for row in old.rows.into_vec() {
            row.into_inner().into_inner().drain_into(&mut entries);
        }

        // the counter is left alone until the re-insert is done so lock-free
        // readers of `len` never see the table as empty.
        let mut inserted = 0;
        for (key, value) in entries {
            let hash = self.hash(&key);
            if table.row_mut(hash).upsert(key, value).is_none() {
                inserted += 1;
            }
        }
        self.len.store(inserted, Ordering::Relaxed);

        debug!(from, to = table.num_rows(), entries = inserted, "resized map");
        Ok(())
    }
}

impl<K, V, S> Map for StripedHashMap<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    type Key = K;
    type Val = V;

    fn get(&self, key: &K) -> Option<V> {
        StripedHashMap::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        StripedHashMap::contains(self, key)
    }

    fn put(&self, key: K, value: V) {
        StripedHashMap::put(self, key, value)
    }

    fn remove(&self, key: &K) -> bool {
        StripedHashMap::remove(self, key)
    }

    fn len(&self) -> usize {
        StripedHashMap::len(self)
    }

    fn clear(&self) {
        StripedHashMap::clear(self)
    }
}
