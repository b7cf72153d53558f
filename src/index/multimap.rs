//! Ordered Multimap - the sorted container behind every index
//!
//! The indexes only need four things from their container: ordered insert,
//! equal-range lookup, ascending iteration over distinct keys, and
//! ascending iteration between two key bounds. That contract is captured by
//! [`OrderedMultimap`] so the backing container stays swappable; the
//! default implementation rides on `std::collections::BTreeMap` rather
//! than a hand-rolled balanced tree.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

/// Sorted container mapping one key to many values
///
/// Values under the same key keep insertion order, which makes iteration
/// deterministic; equal-range correctness depends only on key equality.
/// Deletion is never needed: indexes are built once and read afterwards.
pub trait OrderedMultimap<K: Ord, V> {
    /// Insert one `(key, value)` entry
    fn insert(&mut self, key: K, value: V);

    /// All values stored under `key`, in insertion order
    ///
    /// A key with no entries yields an empty slice.
    fn equal_range(&self, key: &K) -> &[V];

    /// Iterate over all distinct keys in ascending order
    fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a [V])> + 'a
    where
        K: 'a,
        V: 'a;

    /// Iterate over distinct keys within `bounds`, ascending
    fn range<'a>(&'a self, bounds: impl RangeBounds<K>) -> impl Iterator<Item = (&'a K, &'a [V])> + 'a
    where
        K: 'a,
        V: 'a;

    /// Number of distinct keys
    fn key_count(&self) -> usize;

    /// Total number of `(key, value)` entries
    fn entry_count(&self) -> usize;

    /// Check if the multimap holds no entries
    fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

/// B-tree backed [`OrderedMultimap`]
#[derive(Debug, Default)]
pub struct BTreeMultimap<K, V> {
    map: BTreeMap<K, Vec<V>>,
    entries: usize,
}

impl<K: Ord, V> BTreeMultimap<K, V> {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            entries: 0,
        }
    }
}

impl<K: Ord, V> OrderedMultimap<K, V> for BTreeMultimap<K, V> {
    fn insert(&mut self, key: K, value: V) {
        self.map.entry(key).or_default().push(value);
        self.entries += 1;
    }

    fn equal_range(&self, key: &K) -> &[V] {
        self.map.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn iter<'a>(&'a self) -> impl Iterator<Item = (&'a K, &'a [V])> + 'a
    where
        K: 'a,
        V: 'a,
    {
        self.map.iter().map(|(k, v)| (k, v.as_slice()))
    }

    fn range<'a>(&'a self, bounds: impl RangeBounds<K>) -> impl Iterator<Item = (&'a K, &'a [V])> + 'a
    where
        K: 'a,
        V: 'a,
    {
        self.map.range(bounds).map(|(k, v)| (k, v.as_slice()))
    }

    fn key_count(&self) -> usize {
        self.map.len()
    }

    fn entry_count(&self) -> usize {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_range_insertion_order() {
        let mut map = BTreeMultimap::new();
        map.insert(7u32, 100u64);
        map.insert(3, 50);
        map.insert(7, 20);
        map.insert(7, 80);

        assert_eq!(map.equal_range(&7), &[100, 20, 80]);
        assert_eq!(map.equal_range(&3), &[50]);
        assert_eq!(map.equal_range(&99), &[] as &[u64]);
    }

    #[test]
    fn test_iter_ascending() {
        let mut map = BTreeMultimap::new();
        map.insert(9u32, 1u64);
        map.insert(1, 2);
        map.insert(5, 3);

        let keys: Vec<u32> = map.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 5, 9]);
    }

    #[test]
    fn test_range_scan() {
        let mut map = BTreeMultimap::new();
        map.insert((1u32, 10u32), 0u64);
        map.insert((1, 20), 1);
        map.insert((2, 5), 2);
        map.insert((2, 30), 3);

        let ads: Vec<u32> = map
            .range((2, u32::MIN)..=(2, u32::MAX))
            .map(|((_, ad), _)| *ad)
            .collect();
        assert_eq!(ads, vec![5, 30]);
    }

    #[test]
    fn test_counts() {
        let mut map = BTreeMultimap::new();
        assert!(map.is_empty());

        map.insert(1u32, 1u64);
        map.insert(1, 2);
        map.insert(2, 3);

        assert_eq!(map.key_count(), 2);
        assert_eq!(map.entry_count(), 3);
        assert!(!map.is_empty());
    }
}
