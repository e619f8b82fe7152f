//! Ordered map from unique keys to values.
//!
//! Entries are stored as `(K, V)` pairs and ordered by the key component
//! alone. The value is never compared.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

use crate::compare::{Compare, Natural, PairKey};
use crate::cursor::{self, Cursor, Range as EntryRange};
use crate::tree::{DuplicatePolicy, RbTree};
use crate::{Result, TreeError};

const POLICY: DuplicatePolicy = DuplicatePolicy::Reject;

/// A sorted map.
///
/// ```
/// use ordtree::{OrderedMap, TreeError};
///
/// let mut map = OrderedMap::from([(1, "x"), (2, "y")]);
/// assert_eq!(map.at(&3), Err(TreeError::KeyNotFound));
/// *map.get_or_insert_default(3) = "z";
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.values().copied().collect::<Vec<_>>(), ["x", "y", "z"]);
/// ```
pub struct OrderedMap<K, V, C = Natural> {
    pub(crate) tree: RbTree<(K, V), PairKey, C>,
}

impl<K: Ord, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, V, C: Compare<K>> OrderedMap<K, V, C> {
    pub fn with_comparator(compare: C) -> Self {
        Self {
            tree: RbTree::with_comparator(compare),
        }
    }

    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        Self {
            tree: RbTree::with_capacity_and_comparator(capacity, compare),
        }
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Inserts `key -> value` unless `key` is already mapped. An existing
    /// value is never overwritten; the flag reports whether the pair was
    /// stored.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        self.tree.insert((key, value), POLICY)
    }

    pub fn try_insert(&mut self, key: K, value: V) -> Result<(Cursor, bool)> {
        self.tree.try_insert((key, value), POLICY)
    }

    /// Inserts or overwrites. The flag is `true` when the key was new.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Cursor, bool) {
        match self.tree.find_node(&key) {
            Some(id) => {
                self.tree.entry_mut_by_id(id).1 = value;
                (Cursor::at(id, 0), false)
            }
            None => self.tree.insert((key, value), POLICY),
        }
    }

    pub fn emplace<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) -> Result<Vec<(Cursor, bool)>> {
        self.tree.emplace(pairs, POLICY)
    }

    pub fn try_extend<I: IntoIterator<Item = (K, V)>>(&mut self, pairs: I) -> Result<usize> {
        self.tree.try_extend(pairs, POLICY)
    }

    /// Value for `key`, inserting `V::default()` first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &mut V {
        let id = match self.tree.find_node(&key) {
            Some(id) => id,
            None => self.tree.insert_node((key, make()), POLICY),
        };
        &mut self.tree.entry_mut_by_id(id).1
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key).map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key).map(|(_, value)| value)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.tree.get(key).map(|(key, value)| (key, value))
    }

    /// Checked lookup.
    pub fn at(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        self.get_mut(key).ok_or(TreeError::KeyNotFound)
    }

    pub fn find(&self, key: &K) -> Cursor {
        self.tree.find(key)
    }

    pub fn count(&self, key: &K) -> usize {
        self.tree.count(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Entry under the cursor.
    pub fn entry_at(&self, cursor: Cursor) -> Result<(&K, &V)> {
        let (key, value) = self.tree.entry(cursor)?;
        Ok((key, value))
    }

    pub fn value_at_mut(&mut self, cursor: Cursor) -> Result<&mut V> {
        Ok(&mut self.tree.entry_mut(cursor)?.1)
    }

    pub fn lower_bound(&self, key: &K) -> Cursor {
        self.tree.lower_bound(key)
    }

    pub fn upper_bound(&self, key: &K) -> Cursor {
        self.tree.upper_bound(key)
    }

    pub fn equal_range(&self, key: &K) -> (Cursor, Cursor) {
        self.tree.equal_range(key)
    }

    pub fn begin(&self) -> Cursor {
        self.tree.begin()
    }

    pub fn end(&self) -> Cursor {
        self.tree.end()
    }

    pub fn last_cursor(&self) -> Cursor {
        self.tree.last_cursor()
    }

    pub fn cursor_next(&self, cursor: Cursor) -> Result<Cursor> {
        self.tree.cursor_next(cursor)
    }

    pub fn cursor_prev(&self, cursor: Cursor) -> Result<Cursor> {
        self.tree.cursor_prev(cursor)
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.iter().next_back()
    }

    // -------------------------------------------------------------------------
    // Removal
    // -------------------------------------------------------------------------

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.tree.remove_entry(key).map(|(pair, _)| pair)
    }

    pub fn erase(&mut self, cursor: Cursor) -> Result<Cursor> {
        self.tree.erase(cursor)
    }

    /// `1` if `key` was mapped, `0` otherwise.
    pub fn erase_key(&mut self, key: &K) -> usize {
        self.tree.erase_key(key)
    }

    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor> {
        self.tree.erase_range(first, last)
    }

    // -------------------------------------------------------------------------
    // Iteration and whole-map operations
    // -------------------------------------------------------------------------

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.tree.iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Entries in `[first, last)`.
    pub fn range(&self, first: Cursor, last: Cursor) -> Result<Range<'_, K, V>> {
        Ok(Range {
            inner: self.tree.range(first, last)?,
        })
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.tree.max_size()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Moves every entry of `other` whose key is not mapped in `self`.
    pub fn merge(&mut self, other: &mut Self) -> Result<usize> {
        self.tree.merge(&mut other.tree, POLICY)
    }

    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }
}

impl<K, V, C: Compare<K> + Default> Default for OrderedMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OrderedMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C: Compare<K>> fmt::Debug for OrderedMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C: Compare<K>> PartialEq for OrderedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C: Compare<K>> Eq for OrderedMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C: Compare<K>> PartialOrd for OrderedMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C: Compare<K>> Ord for OrderedMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, V: Hash, C: Compare<K>> Hash for OrderedMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for pair in self.iter() {
            pair.hash(state);
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for OrderedMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Keeps the first value seen for each key, like [`OrderedMap::insert`].
impl<K, V, C: Compare<K>> Extend<(K, V)> for OrderedMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, C: Compare<K>> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, C: Compare<K>> IntoIterator for OrderedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.tree.into_entries().into_iter(),
        }
    }
}

// =============================================================================
// Iterators
// =============================================================================

/// In-order iterator over `(&K, &V)`.
pub struct Iter<'a, K, V> {
    inner: cursor::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (key, value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Entries between two cursors.
pub struct Range<'a, K, V> {
    inner: EntryRange<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }
}

/// Owning iterator over `(K, V)` pairs in key order.
pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<((K, V), usize)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next().map(|(pair, _)| pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back().map(|(pair, _)| pair)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
