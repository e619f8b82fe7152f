//! Ordered multiset.
//!
//! Equivalent keys share one tree node whose multiplicity counts the copies,
//! so `len()` counts copies while the tree only grows with distinct keys.
//! When the comparator treats distinct values as equivalent, the node keeps
//! the first value inserted and every later one only bumps the count.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::compare::{Compare, Identity, Natural};
use crate::cursor::{Cursor, Iter, Range};
use crate::tree::{DuplicatePolicy, RbTree};
use crate::Result;

const POLICY: DuplicatePolicy = DuplicatePolicy::Fold;

/// A sorted multiset.
///
/// ```
/// use ordtree::OrderedMultiset;
///
/// let mut bag = OrderedMultiset::new();
/// bag.insert("a");
/// bag.insert("a");
/// bag.insert("b");
/// assert_eq!(bag.count(&"a"), 2);
/// assert_eq!(bag.len(), 3);
/// ```
pub struct OrderedMultiset<K, C = Natural> {
    pub(crate) tree: RbTree<K, Identity, C>,
}

impl<K: Ord> OrderedMultiset<K> {
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K, C: Compare<K>> OrderedMultiset<K, C> {
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

    /// Adds one copy of `key` and returns its position, which comes after
    /// every copy already stored.
    pub fn insert(&mut self, key: K) -> Cursor {
        self.tree.insert(key, POLICY).0
    }

    pub fn try_insert(&mut self, key: K) -> Result<Cursor> {
        Ok(self.tree.try_insert(key, POLICY)?.0)
    }

    pub fn emplace<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<Vec<Cursor>> {
        let results = self.tree.emplace(keys, POLICY)?;
        Ok(results.into_iter().map(|(cursor, _)| cursor).collect())
    }

    pub fn try_extend<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<usize> {
        self.tree.try_extend(keys, POLICY)
    }

    /// Position of the first copy of `key`, or end.
    pub fn find(&self, key: &K) -> Cursor {
        self.tree.find(key)
    }

    pub fn count(&self, key: &K) -> usize {
        self.tree.count(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    pub fn get(&self, cursor: Cursor) -> Result<&K> {
        self.tree.entry(cursor)
    }

    /// Removes one copy and returns the position after it.
    pub fn erase(&mut self, cursor: Cursor) -> Result<Cursor> {
        self.tree.erase(cursor)
    }

    /// Removes every copy of `key`; returns how many there were.
    pub fn erase_key(&mut self, key: &K) -> usize {
        self.tree.erase_key(key)
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

    /// Spans exactly `count(key)` positions.
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

    /// Every copy in order.
    pub fn iter(&self) -> Iter<'_, K> {
        self.tree.iter()
    }

    pub fn range(&self, first: Cursor, last: Cursor) -> Result<Range<'_, K>> {
        self.tree.range(first, last)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Number of distinct keys.
    pub fn distinct_len(&self) -> usize {
        self.tree.node_count()
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

    /// Moves every copy out of `other`, leaving it empty.
    pub fn merge(&mut self, other: &mut Self) -> Result<usize> {
        self.tree.merge(&mut other.tree, POLICY)
    }

    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }
}

impl<K, C: Compare<K> + Default> Default for OrderedMultiset<K, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Clone, C: Clone> Clone for OrderedMultiset<K, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<K: fmt::Debug, C: Compare<K>> fmt::Debug for OrderedMultiset<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, C: Compare<K>> PartialEq for OrderedMultiset<K, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C: Compare<K>> Eq for OrderedMultiset<K, C> {}

impl<K: PartialOrd, C: Compare<K>> PartialOrd for OrderedMultiset<K, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, C: Compare<K>> Ord for OrderedMultiset<K, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, C: Compare<K>> Hash for OrderedMultiset<K, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for key in self.iter() {
            key.hash(state);
        }
    }
}

impl<K, C: Compare<K> + Default> FromIterator<K> for OrderedMultiset<K, C> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut bag = Self::default();
        bag.extend(iter);
        bag
    }
}

impl<K: Ord, const N: usize> From<[K; N]> for OrderedMultiset<K> {
    fn from(keys: [K; N]) -> Self {
        keys.into_iter().collect()
    }
}

impl<K, C: Compare<K>> Extend<K> for OrderedMultiset<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K, C: Compare<K>> IntoIterator for &'a OrderedMultiset<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

/// Owning iterator over every copy of an [`OrderedMultiset`]. Extra copies
/// are clones of the stored key.
pub struct IntoIter<K> {
    inner: std::vec::IntoIter<(K, usize)>,
    front: Option<(K, usize)>,
    back: Option<(K, usize)>,
    remaining: usize,
}

impl<K: Clone> IntoIter<K> {
    /// Hands out one copy from `run`, cloning while more than one is left.
    fn take_copy(run: &mut Option<(K, usize)>) -> Option<K> {
        match run.take()? {
            (key, 1) => Some(key),
            (key, copies) => {
                let out = key.clone();
                *run = Some((key, copies - 1));
                Some(out)
            }
        }
    }
}

impl<K: Clone> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        if self.front.is_none() {
            // Once the middle is drained the back run is the last one left.
            self.front = self.inner.next().or_else(|| self.back.take());
        }
        let key = Self::take_copy(&mut self.front)?;
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone> DoubleEndedIterator for IntoIter<K> {
    fn next_back(&mut self) -> Option<K> {
        if self.back.is_none() {
            self.back = self.inner.next_back().or_else(|| self.front.take());
        }
        let key = Self::take_copy(&mut self.back)?;
        self.remaining -= 1;
        Some(key)
    }
}

impl<K: Clone> ExactSizeIterator for IntoIter<K> {}

impl<K: Clone, C: Compare<K>> IntoIterator for OrderedMultiset<K, C> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        let remaining = self.len();
        IntoIter {
            inner: self.tree.into_entries().into_iter(),
            front: None,
            back: None,
            remaining,
        }
    }
}
