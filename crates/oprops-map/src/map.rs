//! The [`OrderedMap`] container.
//!
//! Insertion order is backed by an `IndexMap` (shift-removal keeps the
//! remaining keys in place). Comparator order is backed by a `BTreeMap`
//! whose keys carry the comparator, so lookups follow sorted-map semantics
//! rather than hash equality.

use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::comparator::KeyComparator;

/// A key ordered by the comparator it carries.
///
/// Every key in one map holds a clone of the same comparator.
#[derive(Clone)]
struct SortedKey {
    key: String,
    comparator: KeyComparator,
}

impl SortedKey {
    fn new(comparator: &KeyComparator, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            comparator: comparator.clone(),
        }
    }
}

impl PartialEq for SortedKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortedKey {}

impl PartialOrd for SortedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.comparator.compare(&self.key, &other.key)
    }
}

#[derive(Clone)]
enum Entries {
    Insertion(IndexMap<String, Option<String>>),
    Sorted {
        comparator: KeyComparator,
        entries: BTreeMap<SortedKey, Option<String>>,
    },
}

/// A string-keyed map with a well-defined iteration order.
#[derive(Clone)]
pub struct OrderedMap {
    entries: Entries,
}

impl OrderedMap {
    /// Create an empty map that iterates in insertion order.
    pub fn new() -> Self {
        Self {
            entries: Entries::Insertion(IndexMap::new()),
        }
    }

    /// Create an empty map that iterates in `comparator` order.
    pub fn with_comparator(comparator: KeyComparator) -> Self {
        Self {
            entries: Entries::Sorted {
                comparator,
                entries: BTreeMap::new(),
            },
        }
    }

    /// The comparator, or `None` for insertion order.
    pub fn comparator(&self) -> Option<&KeyComparator> {
        match &self.entries {
            Entries::Insertion(_) => None,
            Entries::Sorted { comparator, .. } => Some(comparator),
        }
    }

    /// Number of keys, including keys holding a null-like value.
    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Insertion(map) => map.len(),
            Entries::Sorted { entries, .. } => entries.len(),
        }
    }

    /// Returns `true` if the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is present, even with a null-like value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get_raw(key).is_some()
    }

    /// The value for `key`, or `None` if absent or null-like.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_raw(key).flatten()
    }

    /// Distinguishes a missing key (`None`) from a null-like value
    /// (`Some(None)`).
    pub fn get_raw(&self, key: &str) -> Option<Option<&str>> {
        match &self.entries {
            Entries::Insertion(map) => map.get(key).map(|v| v.as_deref()),
            Entries::Sorted {
                comparator,
                entries,
            } => entries
                .get(&SortedKey::new(comparator, key))
                .map(|v| v.as_deref()),
        }
    }

    /// Insert or overwrite `key`, returning the previous value.
    ///
    /// An existing key keeps its position (insertion order) or its original
    /// spelling (comparator order).
    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) -> Option<String> {
        let key = key.into();
        match &mut self.entries {
            Entries::Insertion(map) => map.insert(key, value).flatten(),
            Entries::Sorted {
                comparator,
                entries,
            } => entries.insert(SortedKey::new(comparator, key), value).flatten(),
        }
    }

    /// Remove `key`, returning its value. The remaining keys keep their order.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        match &mut self.entries {
            Entries::Insertion(map) => map.shift_remove(key).flatten(),
            Entries::Sorted {
                comparator,
                entries,
            } => entries.remove(&SortedKey::new(comparator, key)).flatten(),
        }
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        match &mut self.entries {
            Entries::Insertion(map) => map.clear(),
            Entries::Sorted { entries, .. } => entries.clear(),
        }
    }

    /// Iterate over `(key, value)` pairs in map order.
    pub fn iter(&self) -> Iter<'_> {
        let inner = match &self.entries {
            Entries::Insertion(map) => IterInner::Insertion(map.iter()),
            Entries::Sorted { entries, .. } => IterInner::Sorted(entries.iter()),
        };
        Iter { inner }
    }

    /// Iterate over keys in map order.
    pub fn keys(&self) -> Keys<'_> {
        Keys { inner: self.iter() }
    }
}

impl Default for OrderedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Order-sensitive: equal maps hold equal entries in the same order. The
/// ordering strategy itself is not compared.
impl PartialEq for OrderedMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for OrderedMap {}

impl Hash for OrderedMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for entry in self.iter() {
            entry.hash(state);
        }
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a str, Option<&'a str>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

enum IterInner<'a> {
    Insertion(indexmap::map::Iter<'a, String, Option<String>>),
    Sorted(btree_map::Iter<'a, SortedKey, Option<String>>),
}

/// Iterator over the entries of an [`OrderedMap`].
pub struct Iter<'a> {
    inner: IterInner<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Option<&'a str>);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            IterInner::Insertion(it) => it.next().map(|(k, v)| (k.as_str(), v.as_deref())),
            IterInner::Sorted(it) => it.next().map(|(k, v)| (k.key.as_str(), v.as_deref())),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            IterInner::Insertion(it) => it.size_hint(),
            IterInner::Sorted(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Iterator over the keys of an [`OrderedMap`].
pub struct Keys<'a> {
    inner: Iter<'a>,
}

impl<'a> Iterator for Keys<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys<'_> {}
