//! Singly linked bucket chains.
//!
//! A [`Chain`] holds every entry whose key hashed to one row of the table.
//! Entries keep the order in which their keys first arrived; a new key is
//! linked at the point where the scan for it stopped, which is the tail.

use std::borrow::Borrow;
use std::mem;

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

impl<K, V> Entry<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            next: None,
        }
    }
}

pub(crate) struct Chain<K, V> {
    head: Link<K, V>,
}

impl<K, V> Default for Chain<K, V> {
    fn default() -> Self {
        Self { head: None }
    }
}

impl<K: Eq, V> Chain<K, V> {
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.iter()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &entry.value)
    }

    /// Overwrites the value of `key` in place, or links a new entry at the
    /// tail. Returns the replaced value, if any.
    pub(crate) fn upsert(&mut self, key: K, value: V) -> Option<V> {
        let mut link = &mut self.head;
        while let Some(entry) = link {
            if entry.key == key {
                return Some(mem::replace(&mut entry.value, value));
            }
            link = &mut entry.next;
        }
        *link = Some(Box::new(Entry::new(key, value)));
        None
    }

    /// Unlinks the entry for `key`, re-pointing its predecessor (or the
    /// head) at its successor.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let mut link = &mut self.head;
        loop {
            match link {
                None => return None,
                Some(entry) if entry.key.borrow() == key => break,
                Some(entry) => link = &mut entry.next,
            }
        }
        let mut removed = link.take()?;
        *link = removed.next.take();
        Some(removed.value)
    }
}

impl<K, V> Chain<K, V> {
    fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.iter().count()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Moves every entry out of the chain, head first.
    pub(crate) fn drain_into(&mut self, out: &mut Vec<(K, V)>) {
        let mut link = self.head.take();
        while let Some(mut entry) = link {
            link = entry.next.take();
            out.push((entry.key, entry.value));
        }
    }
}

impl<K, V> Drop for Chain<K, V> {
    fn drop(&mut self) {
        // unlink node by node; a recursive Box drop would blow the stack on
        // long chains.
        let mut link = self.head.take();
        while let Some(mut entry) = link {
            link = entry.next.take();
        }
    }
}

struct Iter<'a, K, V> {
    next: Option<&'a Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|entry| {
            self.next = entry.next.as_deref();
            entry
        })
    }
}
