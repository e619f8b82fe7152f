//! Ordered set of unique keys.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::compare::{Compare, Identity, Natural};
use crate::cursor::{Cursor, Iter, Range};
use crate::tree::{DuplicatePolicy, RbTree};
use crate::Result;

const POLICY: DuplicatePolicy = DuplicatePolicy::Reject;

/// A sorted set. Inserting a key equivalent to a stored one is a no-op.
///
/// ```
/// use ordtree::OrderedSet;
///
/// let set: OrderedSet<i32> = [5, 3, 8, 1, 4, 7, 9].into_iter().collect();
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
/// assert!(set.contains(&4));
/// ```
pub struct OrderedSet<K, C = Natural> {
    pub(crate) tree: RbTree<K, Identity, C>,
}

impl<K: Ord> OrderedSet<K> {
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, C: Compare<K>> OrderedSet<K, C> {
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

    /// Inserts `key`. The flag is `false`, and the cursor names the stored
    /// key, when an equivalent key was already present.
    pub fn insert(&mut self, key: K) -> (Cursor, bool) {
        self.tree.insert(key, POLICY)
    }

    pub fn try_insert(&mut self, key: K) -> Result<(Cursor, bool)> {
        self.tree.try_insert(key, POLICY)
    }

    /// Inserts every key, reporting one `(cursor, inserted)` pair per key.
    pub fn emplace<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<Vec<(Cursor, bool)>> {
        self.tree.emplace(keys, POLICY)
    }

    /// Fallible [`Extend`]; returns the number of keys added.
    pub fn try_extend<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<usize> {
        self.tree.try_extend(keys, POLICY)
    }

    pub fn find(&self, key: &K) -> Cursor {
        self.tree.find(key)
    }

    /// `1` if `key` is present, `0` otherwise.
    pub fn count(&self, key: &K) -> usize {
        self.tree.count(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    /// Key under the cursor.
    pub fn get(&self, cursor: Cursor) -> Result<&K> {
        self.tree.entry(cursor)
    }

    /// Removes the key under `cursor` and returns the position after it.
    pub fn erase(&mut self, cursor: Cursor) -> Result<Cursor> {
        self.tree.erase(cursor)
    }

    pub fn erase_key(&mut self, key: &K) -> usize {
        self.tree.erase_key(key)
    }

    /// Removes `key` and returns the stored key, if any.
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.tree.remove_entry(key).map(|(key, _)| key)
    }

    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor> {
        self.tree.erase_range(first, last)
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

    pub fn first(&self) -> Option<&K> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&K> {
        self.iter().next_back()
    }

    pub fn iter(&self) -> Iter<'_, K> {
        self.tree.iter()
    }

    /// Keys in `[first, last)`.
    pub fn range(&self, first: Cursor, last: Cursor) -> Result<Range<'_, K>> {
        self.tree.range(first, last)
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

    /// Moves every key of `other` that is not already in `self`. Keys that
    /// collide stay behind in `other`.
    pub fn merge(&mut self, other: &mut Self) -> Result<usize> {
        self.tree.merge(&mut other.tree, POLICY)
    }

    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }
}

impl<K, C: Compare<K> + Default> Default for OrderedSet<K, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, C: Clone> Clone for OrderedSet<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, C: Compare<K>> fmt::Debug for OrderedSet<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, C: Compare<K>> PartialEq for OrderedSet<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C: Compare<K>> Eq for OrderedSet<K, C> {}

impl<K: PartialOrd, C: Compare<K>> PartialOrd for OrderedSet<K, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, C: Compare<K>> Ord for OrderedSet<K, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, C: Compare<K>> Hash for OrderedSet<K, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for key in self.iter() {
            key.hash(state);
        }
    }
}

impl<K, C: Compare<K> + Default> FromIterator<K> for OrderedSet<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::default();
        set.extend(iter);
        set
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for OrderedSet<K> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<K, C: Compare<K>> Extend<K> for OrderedSet<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K, C: Compare<K>> IntoIterator for &'a OrderedSet<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// Owning iterator over the keys of an [`OrderedSet`], in order.
pub struct IntoIter<K> {
    inner: std::vec::IntoIter<(K, usize)>,
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K, C: Compare<K>> IntoIterator for OrderedSet<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        IntoIter {
            inner: self.tree.into_entries().into_iter(),
        }
    }
}
