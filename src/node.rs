//! Node storage and parent-link navigation.
//!
//! Nodes live in a [`Slab`] and refer to each other through [`NodeId`]
//! handles. Children are owned by the tree through the arena; `parent` is a
//! plain back-reference. `None` stands for the sentinel: it is the parent of
//! the root and the position one past the last element.
//!
//! The slab hands vacated keys out again, so every handle also carries the
//! generation stamped on the node when it was allocated. Stamps are never
//! reused, which keeps a handle kept across a structural removal (or a
//! `clear`) from resolving to whatever node took its key.

use std::mem;
use std::ops::{Index, IndexMut};

use slab::Slab;

use crate::error::{Result, TreeError};

/// Stable handle to a tree node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

#[derive(Clone, Debug)]
pub(crate) struct Node<E> {
    pub(crate) entry: E,
    pub(crate) color: Color,
    /// Number of equivalent entries folded into this node (always >= 1).
    pub(crate) multiplicity: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<E> Node<E> {
    pub(crate) fn new(entry: E, color: Color, multiplicity: usize, parent: Option<NodeId>) -> Self {
        debug_assert!(multiplicity >= 1);
        Self {
            entry,
            color,
            multiplicity,
            parent,
            left: None,
            right: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Stamped<E> {
    generation: u64,
    node: Node<E>,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeArena<E> {
    slots: Slab<Stamped<E>>,
    next_generation: u64,
}

impl<E> NodeArena<E> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Slab::new(),
            next_generation: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slab::with_capacity(capacity),
            next_generation: 0,
        }
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Largest node count the backing storage can be asked to hold. Each slab
    /// entry is budgeted a tag word on top of the node.
    pub(crate) fn max_len() -> usize {
        let entry = mem::size_of::<Stamped<E>>() + mem::size_of::<usize>();
        isize::MAX as usize / entry
    }

    /// Makes sure `additional` more nodes can be allocated without growing.
    ///
    /// Requests the storage could never address fail here, before anything
    /// is touched. A request that passes but cannot be met by the allocator
    /// aborts, the same way a growing `Vec` does.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<()> {
        if self.slots.capacity() - self.slots.len() >= additional {
            return Ok(());
        }
        match self.slots.len().checked_add(additional) {
            Some(total) if total <= Self::max_len() => {
                self.slots.reserve(additional);
                Ok(())
            }
            _ => Err(TreeError::AllocFailed { additional }),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<E>) -> NodeId {
        let generation = self.next_generation;
        self.next_generation += 1;
        let index = self.slots.insert(Stamped { generation, node });
        NodeId { index, generation }
    }

    /// Releases a live node and returns it.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<E> {
        if !self.contains(id) {
            panic!("free of stale node handle {id:?}");
        }
        self.slots.remove(id.index).node
    }

    /// Frees every node. Handles issued before the call stay detectably
    /// stale because generations keep counting up.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<E>> {
        match self.slots.get(id.index) {
            Some(slot) if slot.generation == id.generation => Some(&slot.node),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<E>> {
        match self.slots.get_mut(id.index) {
            Some(slot) if slot.generation == id.generation => Some(&mut slot.node),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[inline]
    pub(crate) fn is_red(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| self[id].color == Color::Red)
    }

    pub(crate) fn min_node(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self[id].left {
            id = left;
        }
        id
    }

    pub(crate) fn max_node(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self[id].right {
            id = right;
        }
        id
    }

    /// In-order successor (`ClosestRight`). `None` past the maximum.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self[id].right {
            return Some(self.min_node(right));
        }
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].right != Some(child) {
                break;
            }
            child = p;
            parent = self[p].parent;
        }
        parent
    }

    /// In-order predecessor (`ClosestLeft`). `None` before the minimum.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self[id].left {
            return Some(self.max_node(left));
        }
        let mut child = id;
        let mut parent = self[id].parent;
        while let Some(p) = parent {
            if self[p].left != Some(child) {
                break;
            }
            child = p;
            parent = self[p].parent;
        }
        parent
    }
}

impl<E> Index<NodeId> for NodeArena<E> {
    type Output = Node<E>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<E> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}

impl<E> IndexMut<NodeId> for NodeArena<E> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<E> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("stale node handle {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(arena: &mut NodeArena<u32>, value: u32) -> NodeId {
        arena.alloc(Node::new(value, Color::Black, 1, None))
    }

    #[test]
    fn test_free_reuses_slot_with_new_generation() {
        let mut arena = NodeArena::new();
        let a = leaf(&mut arena, 1);
        let _b = leaf(&mut arena, 2);
        assert_eq!(arena.len(), 2);

        assert_eq!(arena.free(a).entry, 1);
        assert!(!arena.contains(a));
        assert_eq!(arena.len(), 1);

        let c = leaf(&mut arena, 3);
        assert_eq!(c.index, a.index);
        assert_ne!(c.generation, a.generation);
        assert!(arena.get(a).is_none());
        assert_eq!(arena[c].entry, 3);
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut arena = NodeArena::new();
        let ids: Vec<_> = (0..8).map(|v| leaf(&mut arena, v)).collect();
        arena.clear();
        assert_eq!(arena.len(), 0);
        for &id in &ids {
            assert!(!arena.contains(id));
        }
        // Key 0 is handed out again, under a generation no old handle has.
        let fresh = leaf(&mut arena, 42);
        assert_eq!(fresh.index, ids[0].index);
        assert_ne!(fresh, ids[0]);
        assert!(!arena.contains(ids[0]));
        assert_eq!(arena[fresh].entry, 42);
    }

    #[test]
    fn test_try_reserve_counts_vacant_slots() {
        let mut arena = NodeArena::new();
        let ids: Vec<_> = (0..4).map(|v| leaf(&mut arena, v)).collect();
        for id in ids {
            arena.free(id);
        }
        let capacity = arena.capacity();
        arena.try_reserve(4).unwrap();
        assert_eq!(arena.capacity(), capacity);
        arena.try_reserve(64).unwrap();
        assert!(arena.capacity() >= 64);
    }

    #[test]
    fn test_try_reserve_rejects_unaddressable_requests() {
        let mut arena = NodeArena::new();
        leaf(&mut arena, 7);
        let capacity = arena.capacity();
        assert_eq!(
            arena.try_reserve(NodeArena::<u32>::max_len()),
            Err(TreeError::AllocFailed {
                additional: NodeArena::<u32>::max_len()
            })
        );
        assert!(matches!(arena.try_reserve(usize::MAX), Err(TreeError::AllocFailed { .. })));
        assert_eq!(arena.capacity(), capacity);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_successor_and_predecessor_follow_parent_links() {
        // Builds   2
        //         / \
        //        1   3
        let mut arena = NodeArena::new();
        let two = leaf(&mut arena, 2);
        let one = arena.alloc(Node::new(1, Color::Red, 1, Some(two)));
        let three = arena.alloc(Node::new(3, Color::Red, 1, Some(two)));
        arena[two].left = Some(one);
        arena[two].right = Some(three);

        assert_eq!(arena.successor(one), Some(two));
        assert_eq!(arena.successor(two), Some(three));
        assert_eq!(arena.successor(three), None);
        assert_eq!(arena.predecessor(three), Some(two));
        assert_eq!(arena.predecessor(two), Some(one));
        assert_eq!(arena.predecessor(one), None);
        assert_eq!(arena.min_node(two), one);
        assert_eq!(arena.max_node(two), three);
        assert!(arena.is_red(Some(one)));
        assert!(!arena.is_red(Some(two)));
        assert!(!arena.is_red(None));
    }
}
