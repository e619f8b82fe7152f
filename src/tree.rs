//! The red-black engine shared by every container facade.
//!
//! [`RbTree`] stores entries of type `E`, orders them by the key that the
//! [`KeyOf`] adapter `X` projects out of each entry, and compares keys with
//! the strict weak ordering `C`. Equivalent keys either collide
//! ([`DuplicatePolicy::Reject`]) or fold into the multiplicity of a single
//! node ([`DuplicatePolicy::Fold`]).
//!
//! Insert fixup is a loop of three ordered checks applied at a red cursor
//! node: a color flip when the parent has two red children, a rotation that
//! makes a right-leaning red link lean left, and a rotation that splits two
//! reds in a row. Structural deletion swaps a two-child node with its in-order
//! predecessor and then removes it from a position with at most one child,
//! followed by a black-height fixup.

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace, warn};

use crate::compare::{Compare, KeyOf};
use crate::cursor::{Cursor, Iter, Range};
use crate::node::{Color, Node, NodeArena, NodeId};
use crate::{Result, TreeError};

/// What an insert does when an equivalent key is already stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Leave the tree untouched and report the existing element.
    Reject,
    /// Count the new entry into the existing node's multiplicity.
    Fold,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Red-black tree over entries `E` keyed by `X` and ordered by `C`.
pub struct RbTree<E, X, C> {
    nodes: NodeArena<E>,
    root: Option<NodeId>,
    /// Minimum node, `begin()` in O(1).
    leftmost: Option<NodeId>,
    /// Sum of all node multiplicities.
    len: usize,
    compare: C,
    _key: PhantomData<fn() -> X>,
}

impl<E, X, C> RbTree<E, X, C>
where
    X: KeyOf<E>,
    C: Compare<X::Key>,
{
    pub fn with_comparator(compare: C) -> Self {
        Self {
            nodes: NodeArena::new(),
            root: None,
            leftmost: None,
            len: 0,
            compare,
            _key: PhantomData,
        }
    }

    /// Creates an empty tree with room for `capacity` nodes.
    pub fn with_capacity_and_comparator(capacity: usize, compare: C) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            ..Self::with_comparator(compare)
        }
    }

    /// Number of stored elements, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct keys (tree nodes).
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes the arena holds without reallocating.
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Upper bound on the number of nodes this tree could ever hold.
    pub fn max_size(&self) -> usize {
        NodeArena::<E>::max_len()
    }

    pub fn comparator(&self) -> &C {
        &self.compare
    }

    #[inline]
    fn key(&self, id: NodeId) -> &X::Key {
        X::key_of(&self.nodes[id].entry)
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Descends from `from` to the node holding a key equivalent to `key`, or
    /// to the node under which `key` would be attached.
    fn find_position(&self, from: NodeId, key: &X::Key) -> NodeId {
        let mut current = from;
        loop {
            let node = &self.nodes[current];
            let here = X::key_of(&node.entry);
            let next = if self.compare.less(here, key) {
                node.right
            } else if self.compare.less(key, here) {
                node.left
            } else {
                return current;
            };
            match next {
                Some(child) => current = child,
                None => return current,
            }
        }
    }

    pub(crate) fn find_node(&self, key: &X::Key) -> Option<NodeId> {
        let position = self.find_position(self.root?, key);
        self.compare
            .equivalent(self.key(position), key)
            .then_some(position)
    }

    /// Cursor on the first copy of `key`, or end.
    pub fn find(&self, key: &X::Key) -> Cursor {
        Cursor::first_of(self.find_node(key))
    }

    /// Number of stored copies of `key`.
    pub fn count(&self, key: &X::Key) -> usize {
        self.find_node(key)
            .map_or(0, |id| self.nodes[id].multiplicity)
    }

    pub fn contains(&self, key: &X::Key) -> bool {
        self.find_node(key).is_some()
    }

    pub fn get(&self, key: &X::Key) -> Option<&E> {
        self.find_node(key).map(|id| &self.nodes[id].entry)
    }

    pub(crate) fn get_mut(&mut self, key: &X::Key) -> Option<&mut E> {
        let id = self.find_node(key)?;
        Some(&mut self.nodes[id].entry)
    }

    /// First position whose key is not less than `key`.
    pub fn lower_bound(&self, key: &X::Key) -> Cursor {
        let Some(root) = self.root else {
            return Cursor::END;
        };
        let position = self.find_position(root, key);
        if self.compare.less(self.key(position), key) {
            Cursor::first_of(self.nodes.successor(position))
        } else {
            Cursor::at(position, 0)
        }
    }

    /// First position whose key is greater than `key`.
    pub fn upper_bound(&self, key: &X::Key) -> Cursor {
        let Some(root) = self.root else {
            return Cursor::END;
        };
        let position = self.find_position(root, key);
        if self.compare.less(key, self.key(position)) {
            Cursor::at(position, 0)
        } else {
            Cursor::first_of(self.nodes.successor(position))
        }
    }

    /// `(lower_bound(key), upper_bound(key))`.
    pub fn equal_range(&self, key: &X::Key) -> (Cursor, Cursor) {
        (self.lower_bound(key), self.upper_bound(key))
    }

    // -------------------------------------------------------------------------
    // Cursors and iteration
    // -------------------------------------------------------------------------

    #[inline]
    pub fn begin(&self) -> Cursor {
        Cursor::first_of(self.leftmost)
    }

    #[inline]
    pub fn end(&self) -> Cursor {
        Cursor::END
    }

    /// Cursor on the last element, or end for an empty tree.
    pub fn last_cursor(&self) -> Cursor {
        self.nodes.last_cursor(self.root)
    }

    pub fn cursor_next(&self, cursor: Cursor) -> Result<Cursor> {
        self.nodes.step_forward(cursor, self.leftmost)
    }

    pub fn cursor_prev(&self, cursor: Cursor) -> Result<Cursor> {
        self.nodes.step_backward(cursor, self.root)
    }

    /// Entry the cursor points at.
    pub fn entry(&self, cursor: Cursor) -> Result<&E> {
        let id = self.nodes.resolve(cursor)?;
        Ok(&self.nodes[id].entry)
    }

    /// Mutable entry access. Callers must not change the entry's key.
    pub(crate) fn entry_mut(&mut self, cursor: Cursor) -> Result<&mut E> {
        let id = self.nodes.resolve(cursor)?;
        Ok(&mut self.nodes[id].entry)
    }

    pub(crate) fn entry_mut_by_id(&mut self, id: NodeId) -> &mut E {
        &mut self.nodes[id].entry
    }

    pub fn iter(&self) -> Iter<'_, E> {
        Iter::new(&self.nodes, self.root, self.leftmost, self.len)
    }

    /// Iterates `[first, last)`.
    pub fn range(&self, first: Cursor, last: Cursor) -> Result<Range<'_, E>> {
        Range::new(&self.nodes, first, last)
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Inserts one entry. Returns the cursor of the affected element and
    /// whether the tree changed.
    pub fn insert(&mut self, entry: E, policy: DuplicatePolicy) -> (Cursor, bool) {
        let (id, offset, inserted) = self.insert_copies(entry, 1, policy);
        (Cursor::at(id, offset), inserted)
    }

    /// Inserts one entry and returns the handle of the node holding it.
    pub(crate) fn insert_node(&mut self, entry: E, policy: DuplicatePolicy) -> NodeId {
        self.insert_copies(entry, 1, policy).0
    }

    /// [`insert`](Self::insert) that fails instead of growing past an
    /// allocation failure. The tree is untouched on error.
    pub fn try_insert(&mut self, entry: E, policy: DuplicatePolicy) -> Result<(Cursor, bool)> {
        self.try_reserve(1)?;
        Ok(self.insert(entry, policy))
    }

    /// Inserts every entry, all or nothing with respect to allocation.
    ///
    /// Entries are staged before the tree is touched. Staging space for the
    /// iterator's lower size bound is reserved fallibly; entries past that
    /// bound grow the staging buffer the infallible way.
    pub fn emplace<I>(&mut self, entries: I, policy: DuplicatePolicy) -> Result<Vec<(Cursor, bool)>>
    where
        I: IntoIterator<Item = E>,
    {
        let source = entries.into_iter();
        let (hint, _) = source.size_hint();
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(hint)
            .map_err(|_| TreeError::AllocFailed { additional: hint })?;
        entries.extend(source);
        self.try_reserve(entries.len())?;
        let mut results = Vec::new();
        results
            .try_reserve_exact(entries.len())
            .map_err(|_| TreeError::AllocFailed {
                additional: entries.len(),
            })?;
        debug!(count = entries.len(), "emplacing entries");
        for entry in entries {
            results.push(self.insert(entry, policy));
        }
        Ok(results)
    }

    /// Like [`emplace`](Self::emplace) without per-entry results. Returns how
    /// many entries changed the tree.
    pub fn try_extend<I>(&mut self, entries: I, policy: DuplicatePolicy) -> Result<usize>
    where
        I: IntoIterator<Item = E>,
    {
        let results = self.emplace(entries, policy)?;
        Ok(results.iter().filter(|(_, inserted)| *inserted).count())
    }

    /// Reserves node storage for `additional` more distinct keys.
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.nodes.try_reserve(additional).inspect_err(|err| {
            warn!(additional, %err, "node reservation failed");
        })
    }

    /// Inserts `copies` equivalent entries at once. Returns the node, the
    /// offset of the first new copy (or of the existing element when
    /// rejected), and whether anything was stored.
    fn insert_copies(&mut self, entry: E, copies: usize, policy: DuplicatePolicy) -> (NodeId, usize, bool) {
        debug_assert!(copies >= 1);
        let Some(root) = self.root else {
            let id = self.nodes.alloc(Node::new(entry, Color::Black, copies, None));
            self.root = Some(id);
            self.leftmost = Some(id);
            self.len = copies;
            return (id, 0, true);
        };

        let position = self.find_position(root, X::key_of(&entry));
        let side = {
            let here = self.key(position);
            let key = X::key_of(&entry);
            if self.compare.less(here, key) {
                Some(Side::Right)
            } else if self.compare.less(key, here) {
                Some(Side::Left)
            } else {
                None
            }
        };

        let Some(side) = side else {
            return match policy {
                DuplicatePolicy::Reject => (position, 0, false),
                DuplicatePolicy::Fold => {
                    let node = &mut self.nodes[position];
                    let offset = node.multiplicity;
                    node.multiplicity += copies;
                    self.len += copies;
                    (position, offset, true)
                }
            };
        };

        let id = self
            .nodes
            .alloc(Node::new(entry, Color::Red, copies, Some(position)));
        match side {
            Side::Left => {
                self.nodes[position].left = Some(id);
                if self.leftmost == Some(position) {
                    self.leftmost = Some(id);
                }
            }
            Side::Right => self.nodes[position].right = Some(id),
        }
        self.len += copies;
        self.insert_fixup(id);
        (id, 0, true)
    }

    // -------------------------------------------------------------------------
    // Rotations
    // -------------------------------------------------------------------------

    fn is_left_child(&self, id: NodeId) -> bool {
        match self.nodes[id].parent {
            Some(parent) => self.nodes[parent].left == Some(id),
            None => false,
        }
    }

    /// Points `parent`'s link that currently holds `old` at `new`. A `None`
    /// parent is the sentinel, whose only link is the root.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = &mut self.nodes[parent];
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    debug_assert_eq!(node.right, Some(old));
                    node.right = new;
                }
            }
        }
    }

    /// Lifts `pivot.right` above `pivot`.
    fn rotate_left(&mut self, pivot: NodeId) {
        let Some(up) = self.nodes[pivot].right else {
            debug_assert!(false, "rotate_left without a right child");
            return;
        };
        trace!(?pivot, ?up, "rotate left");
        let inner = self.nodes[up].left;
        self.nodes[pivot].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(pivot);
        }
        let parent = self.nodes[pivot].parent;
        self.nodes[up].parent = parent;
        self.replace_child(parent, pivot, Some(up));
        self.nodes[up].left = Some(pivot);
        self.nodes[pivot].parent = Some(up);
    }

    /// Lifts `pivot.left` above `pivot`.
    fn rotate_right(&mut self, pivot: NodeId) {
        let Some(up) = self.nodes[pivot].left else {
            debug_assert!(false, "rotate_right without a left child");
            return;
        };
        trace!(?pivot, ?up, "rotate right");
        let inner = self.nodes[up].right;
        self.nodes[pivot].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(pivot);
        }
        let parent = self.nodes[pivot].parent;
        self.nodes[up].parent = parent;
        self.replace_child(parent, pivot, Some(up));
        self.nodes[up].right = Some(pivot);
        self.nodes[pivot].parent = Some(up);
    }

    // -------------------------------------------------------------------------
    // Insert fixup
    // -------------------------------------------------------------------------

    /// Restores the coloring invariant above the red node `node`.
    ///
    /// Loop invariant: `node` is red and its children are black, so the only
    /// possible violation is between `node` and its parent.
    fn insert_fixup(&mut self, mut node: NodeId) {
        loop {
            let Some(parent) = self.nodes[node].parent else {
                self.nodes[node].color = Color::Black;
                return;
            };

            // Color flip: a black parent with two red children.
            let (left, right) = (self.nodes[parent].left, self.nodes[parent].right);
            if self.nodes.is_red(left) && self.nodes.is_red(right) {
                trace!(?parent, "color flip");
                for child in [left, right].into_iter().flatten() {
                    self.nodes[child].color = Color::Black;
                }
                if self.nodes[parent].parent.is_none() {
                    return;
                }
                self.nodes[parent].color = Color::Red;
                node = parent;
                continue;
            }

            let parent_red = self.nodes.is_red(Some(parent));

            // Lean left: lift a right red child above its parent.
            if right == Some(node) && (!parent_red || self.is_left_child(parent)) {
                self.rotate_left(parent);
                self.nodes[node].color = self.nodes[parent].color;
                self.nodes[parent].color = Color::Red;
                node = parent;
                continue;
            }

            // Two reds in a row: lift the middle node above the grandparent.
            if parent_red {
                let Some(grand) = self.nodes[parent].parent else {
                    self.nodes[parent].color = Color::Black;
                    return;
                };
                let (top, low) = if self.nodes[grand].left == Some(parent) {
                    debug_assert_eq!(self.nodes[parent].left, Some(node));
                    self.rotate_right(grand);
                    (parent, node)
                } else if self.nodes[parent].left == Some(node) {
                    self.rotate_right(parent);
                    self.rotate_left(grand);
                    (node, parent)
                } else {
                    self.rotate_left(grand);
                    (parent, node)
                };
                trace!(?top, "split red pair");
                self.nodes[top].color = Color::Red;
                self.nodes[low].color = Color::Black;
                self.nodes[grand].color = Color::Black;
                node = top;
                continue;
            }

            return;
        }
    }

    // -------------------------------------------------------------------------
    // Deletion
    // -------------------------------------------------------------------------

    /// Puts `replacement` where `old` hangs.
    fn transplant(&mut self, old: NodeId, replacement: Option<NodeId>) {
        let parent = self.nodes[old].parent;
        self.replace_child(parent, old, replacement);
        if let Some(replacement) = replacement {
            self.nodes[replacement].parent = parent;
        }
    }

    /// Structurally removes `id` with all of its copies and returns the node.
    fn remove_node(&mut self, id: NodeId) -> Node<E> {
        if self.leftmost == Some(id) {
            self.leftmost = self.nodes.successor(id);
        }

        let (left, right) = (self.nodes[id].left, self.nodes[id].right);
        let (removed_color, child, child_parent) = match (left, right) {
            (Some(left), Some(right)) => {
                // The predecessor takes over `id`'s place and color; the
                // position it leaves behind has at most a left child.
                let pred = self.nodes.max_node(left);
                let removed_color = self.nodes[pred].color;
                let child = self.nodes[pred].left;
                let child_parent = if pred == left {
                    Some(pred)
                } else {
                    let pred_parent = self.nodes[pred].parent;
                    self.transplant(pred, child);
                    self.nodes[pred].left = Some(left);
                    self.nodes[left].parent = Some(pred);
                    pred_parent
                };
                self.transplant(id, Some(pred));
                self.nodes[pred].right = Some(right);
                self.nodes[right].parent = Some(pred);
                self.nodes[pred].color = self.nodes[id].color;
                (removed_color, child, child_parent)
            }
            (only, None) | (None, only) => {
                let parent = self.nodes[id].parent;
                self.transplant(id, only);
                (self.nodes[id].color, only, parent)
            }
        };

        if removed_color == Color::Black {
            self.erase_fixup(child, child_parent);
        }

        let node = self.nodes.free(id);
        self.len -= node.multiplicity;
        node
    }

    /// Restores black height after a black node left the path through
    /// `parent` towards `node` (which may be absent).
    fn erase_fixup(&mut self, mut node: Option<NodeId>, mut parent: Option<NodeId>) {
        while node != self.root && !self.nodes.is_red(node) {
            let Some(p) = parent else {
                break;
            };
            if self.nodes[p].left == node {
                let Some(mut sibling) = self.nodes[p].right else {
                    debug_assert!(false, "deficient side without a sibling");
                    break;
                };
                if self.nodes.is_red(Some(sibling)) {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_left(p);
                    let Some(next) = self.nodes[p].right else {
                        break;
                    };
                    sibling = next;
                }
                let (near, far) = (self.nodes[sibling].left, self.nodes[sibling].right);
                if !self.nodes.is_red(near) && !self.nodes.is_red(far) {
                    self.nodes[sibling].color = Color::Red;
                    node = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                }
                if !self.nodes.is_red(far) {
                    if let Some(near) = near {
                        self.nodes[near].color = Color::Black;
                    }
                    self.nodes[sibling].color = Color::Red;
                    self.rotate_right(sibling);
                    let Some(next) = self.nodes[p].right else {
                        break;
                    };
                    sibling = next;
                }
                self.nodes[sibling].color = self.nodes[p].color;
                self.nodes[p].color = Color::Black;
                if let Some(far) = self.nodes[sibling].right {
                    self.nodes[far].color = Color::Black;
                }
                self.rotate_left(p);
            } else {
                let Some(mut sibling) = self.nodes[p].left else {
                    debug_assert!(false, "deficient side without a sibling");
                    break;
                };
                if self.nodes.is_red(Some(sibling)) {
                    self.nodes[sibling].color = Color::Black;
                    self.nodes[p].color = Color::Red;
                    self.rotate_right(p);
                    let Some(next) = self.nodes[p].left else {
                        break;
                    };
                    sibling = next;
                }
                let (near, far) = (self.nodes[sibling].right, self.nodes[sibling].left);
                if !self.nodes.is_red(near) && !self.nodes.is_red(far) {
                    self.nodes[sibling].color = Color::Red;
                    node = Some(p);
                    parent = self.nodes[p].parent;
                    continue;
                }
                if !self.nodes.is_red(far) {
                    if let Some(near) = near {
                        self.nodes[near].color = Color::Black;
                    }
                    self.nodes[sibling].color = Color::Red;
                    self.rotate_left(sibling);
                    let Some(next) = self.nodes[p].left else {
                        break;
                    };
                    sibling = next;
                }
                self.nodes[sibling].color = self.nodes[p].color;
                self.nodes[p].color = Color::Black;
                if let Some(far) = self.nodes[sibling].left {
                    self.nodes[far].color = Color::Black;
                }
                self.rotate_right(p);
            }
            node = self.root;
            break;
        }
        if let Some(node) = node {
            self.nodes[node].color = Color::Black;
        }
    }

    /// Erases the element under `cursor` and returns the position after it.
    ///
    /// A node holding several copies only loses one; the node itself goes
    /// away with its last copy.
    pub fn erase(&mut self, cursor: Cursor) -> Result<Cursor> {
        let id = self.nodes.resolve(cursor)?;
        let multiplicity = self.nodes[id].multiplicity;
        if multiplicity > 1 {
            self.nodes[id].multiplicity -= 1;
            self.len -= 1;
            return Ok(if cursor.offset() < multiplicity - 1 {
                cursor
            } else {
                Cursor::first_of(self.nodes.successor(id))
            });
        }
        let next = self.nodes.successor(id);
        self.remove_node(id);
        Ok(Cursor::first_of(next))
    }

    /// Removes a node with every copy and returns its entry.
    pub(crate) fn remove_entry(&mut self, key: &X::Key) -> Option<(E, usize)> {
        let id = self.find_node(key)?;
        let node = self.remove_node(id);
        Some((node.entry, node.multiplicity))
    }

    /// Removes every copy of `key`; returns how many were removed.
    pub fn erase_key(&mut self, key: &X::Key) -> usize {
        self.remove_entry(key).map_or(0, |(_, copies)| copies)
    }

    /// Erases `[first, last)` and returns the cursor now naming the element
    /// `last` named.
    ///
    /// The range is measured before anything is removed: erasing copies of a
    /// folded node shifts the offsets after them, so `last` itself may no
    /// longer match once the loop gets there. Fails with `EndCursor` without
    /// touching the tree when `last` does not follow `first`.
    pub fn erase_range(&mut self, first: Cursor, last: Cursor) -> Result<Cursor> {
        if !last.is_end() {
            self.nodes.resolve(last)?;
        }
        let mut span = 0usize;
        let mut walk = first;
        while walk != last {
            if walk.is_end() {
                return Err(TreeError::EndCursor);
            }
            walk = self.cursor_next(walk)?;
            span += 1;
        }
        let mut current = first;
        for _ in 0..span {
            current = self.erase(current)?;
        }
        debug!(erased = span, "erased range");
        Ok(current)
    }

    // -------------------------------------------------------------------------
    // Whole-tree operations
    // -------------------------------------------------------------------------

    pub fn clear(&mut self) {
        debug!(len = self.len, "clearing tree");
        self.nodes.clear();
        self.root = None;
        self.leftmost = None;
        self.len = 0;
    }

    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Moves elements of `other` into `self`.
    ///
    /// Under [`DuplicatePolicy::Reject`] elements whose key is already present
    /// stay in `other`; under [`DuplicatePolicy::Fold`] everything moves and
    /// multiplicities add up. Storage for every candidate node is reserved up
    /// front, so on error neither tree has changed. Returns the number of
    /// elements moved.
    pub fn merge(&mut self, other: &mut Self, policy: DuplicatePolicy) -> Result<usize> {
        let mut candidates = Vec::new();
        candidates
            .try_reserve_exact(other.node_count())
            .map_err(|_| TreeError::AllocFailed {
                additional: other.node_count(),
            })?;
        let mut current = other.leftmost;
        while let Some(id) = current {
            let movable = match policy {
                DuplicatePolicy::Fold => true,
                DuplicatePolicy::Reject => !self.contains(other.key(id)),
            };
            if movable {
                candidates.push(id);
            }
            current = other.nodes.successor(id);
        }
        self.try_reserve(candidates.len())?;

        let mut moved = 0usize;
        for id in candidates {
            let node = other.remove_node(id);
            moved += node.multiplicity;
            self.insert_copies(node.entry, node.multiplicity, policy);
        }
        debug!(moved, left_behind = other.len, "merged trees");
        Ok(moved)
    }

    /// Consumes the tree and returns `(entry, multiplicity)` in key order.
    pub fn into_entries(mut self) -> Vec<(E, usize)> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut current = self.leftmost;
        while let Some(id) = current {
            ids.push(id);
            current = self.nodes.successor(id);
        }
        ids.into_iter()
            .map(|id| {
                let node = self.nodes.free(id);
                (node.entry, node.multiplicity)
            })
            .collect()
    }

    /// Walks the whole tree and panics on the first broken invariant.
    /// Returns the black height.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) -> usize {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0);
            assert_eq!(self.nodes.len(), 0);
            assert!(self.leftmost.is_none());
            return 0;
        };
        assert_eq!(self.nodes[root].parent, None, "root has a parent");
        assert_eq!(self.nodes[root].color, Color::Black, "root must be black");
        assert_eq!(self.leftmost, Some(self.nodes.min_node(root)), "stale leftmost cache");

        // (node, lower bound, upper bound, black nodes above)
        let mut stack: Vec<(NodeId, Option<NodeId>, Option<NodeId>, usize)> = vec![(root, None, None, 0)];
        let mut black_height = None;
        let mut total = 0usize;
        let mut reachable = 0usize;
        while let Some((id, low, high, blacks)) = stack.pop() {
            let node = &self.nodes[id];
            reachable += 1;
            total += node.multiplicity;
            assert!(node.multiplicity >= 1, "empty node left in the tree");
            if let Some(low) = low {
                assert!(self.compare.less(self.key(low), self.key(id)), "BST order violated");
            }
            if let Some(high) = high {
                assert!(self.compare.less(self.key(id), self.key(high)), "BST order violated");
            }
            let blacks = blacks + usize::from(node.color == Color::Black);
            for (child, child_low, child_high) in [(node.left, low, Some(id)), (node.right, Some(id), high)] {
                match child {
                    Some(child) => {
                        assert_eq!(self.nodes[child].parent, Some(id), "broken parent link");
                        if node.color == Color::Red {
                            assert_eq!(self.nodes[child].color, Color::Black, "red node with red child");
                        }
                        stack.push((child, child_low, child_high, blacks));
                    }
                    None => match black_height {
                        None => black_height = Some(blacks),
                        Some(expected) => assert_eq!(blacks, expected, "unequal black height"),
                    },
                }
            }
        }
        assert_eq!(reachable, self.nodes.len(), "unreachable nodes in the arena");
        assert_eq!(total, self.len, "len must equal the sum of multiplicities");
        black_height.unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn height(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.into_iter().map(|root| (root, 1)).collect();
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            for child in [self.nodes[id].left, self.nodes[id].right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        deepest
    }

    #[cfg(test)]
    pub(crate) fn root_entry(&self) -> Option<&E> {
        self.root.map(|root| &self.nodes[root].entry)
    }
}

impl<E, X, C> Default for RbTree<E, X, C>
where
    X: KeyOf<E>,
    C: Compare<X::Key> + Default,
{
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<E: Clone, X, C: Clone> Clone for RbTree<E, X, C> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            leftmost: self.leftmost,
            len: self.len,
            compare: self.compare.clone(),
            _key: PhantomData,
        }
    }
}

impl<E: fmt::Debug, X, C> fmt::Debug for RbTree<E, X, C>
where
    X: KeyOf<E>,
    C: Compare<X::Key>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
