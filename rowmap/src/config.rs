use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};

use crate::map::StripedHashMap;
use crate::Result;

pub(crate) const DEFAULT_NUM_ROWS: usize = 10;

/// Configures a [`StripedHashMap`] before it is built.
///
/// ```
/// use rowmap::Builder;
///
/// let map = Builder::new()
///     .num_rows(64)
///     .max_avg_row_len(8)
///     .build::<u32, String>()
///     .unwrap();
/// assert_eq!(map.num_rows(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct Builder<S = RandomState> {
    num_rows: usize,
    max_avg_row_len: Option<usize>,
    hasher: S,
}

impl Default for Builder<RandomState> {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder<RandomState> {
    pub fn new() -> Self {
        Self {
            num_rows: DEFAULT_NUM_ROWS,
            max_avg_row_len: None,
            hasher: RandomState::new(),
        }
    }
}

impl<S> Builder<S> {
    /// Initial number of rows. Must be at least 1.
    pub fn num_rows(mut self, num_rows: usize) -> Self {
        self.num_rows = num_rows;
        self
    }

    /// Double the row count whenever an insert brings the average chain
    /// length up to `limit`. Off unless set; a limit of 0 also disables it.
    pub fn max_avg_row_len(mut self, limit: usize) -> Self {
        self.max_avg_row_len = (limit > 0).then_some(limit);
        self
    }

    /// Hash keys with `hasher` instead of the default `RandomState`.
    pub fn hasher<T>(self, hasher: T) -> Builder<T> {
        Builder {
            num_rows: self.num_rows,
            max_avg_row_len: self.max_avg_row_len,
            hasher,
        }
    }

    pub fn build<K, V>(self) -> Result<StripedHashMap<K, V, S>>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        StripedHashMap::build(self.num_rows, self.max_avg_row_len, self.hasher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::BuildHasherDefault;

    #[test]
    fn defaults() {
        let map = Builder::new().build::<u8, u8>().unwrap();
        assert_eq!(map.num_rows(), DEFAULT_NUM_ROWS);
        assert!(map.is_empty());
    }

    #[test]
    fn zero_rows_rejected() {
        let err = Builder::new().num_rows(0).build::<u8, u8>().err();
        assert!(matches!(err, Some(Error::ZeroRows)));
    }

    #[test]
    fn custom_hasher() {
        let map = Builder::new()
            .num_rows(3)
            .hasher(BuildHasherDefault::<DefaultHasher>::default())
            .build()
            .unwrap();
        map.put("key", 1);
        assert_eq!(map.get("key"), Some(1));
        assert_eq!(map.num_rows(), 3);
    }

    #[test]
    fn zero_limit_disables_growth() {
        let map = Builder::new()
            .num_rows(1)
            .max_avg_row_len(0)
            .build()
            .unwrap();
        for i in 0..50 {
            map.put(i, i);
        }
        assert_eq!(map.num_rows(), 1);
    }
}
