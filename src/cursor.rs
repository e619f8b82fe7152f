//! Duplicate-aware cursors and iterators.
//!
//! A [`Cursor`] names one logical element: a node plus an offset into that
//! node's multiplicity. Stepping a cursor first walks the offset and only then
//! moves to the structural successor or predecessor. The end position sits on
//! the sentinel, which closes the sequence into a ring: stepping forward from
//! the last element reaches the end, and stepping forward again wraps to the
//! first element.

use crate::node::{NodeArena, NodeId};
use crate::{Result, TreeError};

/// Position of a single logical element, or the end position.
///
/// Cursors own nothing. A cursor stays valid until the node it names is
/// structurally removed, after which every operation taking it reports
/// [`TreeError::StaleCursor`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    node: Option<NodeId>,
    offset: usize,
}

impl Cursor {
    /// The end position.
    pub const END: Cursor = Cursor {
        node: None,
        offset: 0,
    };

    #[inline]
    pub(crate) fn at(node: NodeId, offset: usize) -> Self {
        Self {
            node: Some(node),
            offset,
        }
    }

    #[inline]
    pub(crate) fn first_of(node: Option<NodeId>) -> Self {
        Self { node, offset: 0 }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Handle of the node this cursor points into.
    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Which copy of the node's key this cursor names (0-based).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<E> NodeArena<E> {
    /// Resolves a cursor to its node, checking that it is live.
    pub(crate) fn resolve(&self, cursor: Cursor) -> Result<NodeId> {
        let id = cursor.node.ok_or(TreeError::EndCursor)?;
        match self.get(id) {
            Some(node) if cursor.offset < node.multiplicity => Ok(id),
            _ => Err(TreeError::StaleCursor),
        }
    }

    /// Cursor on the last copy of the maximum node, or end.
    pub(crate) fn last_cursor(&self, root: Option<NodeId>) -> Cursor {
        match root {
            Some(root) => {
                let last = self.max_node(root);
                Cursor::at(last, self[last].multiplicity - 1)
            }
            None => Cursor::END,
        }
    }

    /// Steps forward. `leftmost` is where the ring continues after end.
    pub(crate) fn step_forward(&self, cursor: Cursor, leftmost: Option<NodeId>) -> Result<Cursor> {
        if cursor.is_end() {
            return Ok(Cursor::first_of(leftmost));
        }
        let id = self.resolve(cursor)?;
        Ok(self.next_copy(id, cursor.offset))
    }

    /// Steps backward. `root` is used to find the last element from end.
    pub(crate) fn step_backward(&self, cursor: Cursor, root: Option<NodeId>) -> Result<Cursor> {
        if cursor.is_end() {
            return Ok(self.last_cursor(root));
        }
        let id = self.resolve(cursor)?;
        Ok(self.prev_copy(id, cursor.offset))
    }

    #[inline]
    fn next_copy(&self, id: NodeId, offset: usize) -> Cursor {
        if offset + 1 < self[id].multiplicity {
            Cursor::at(id, offset + 1)
        } else {
            Cursor::first_of(self.successor(id))
        }
    }

    #[inline]
    fn prev_copy(&self, id: NodeId, offset: usize) -> Cursor {
        if offset > 0 {
            Cursor::at(id, offset - 1)
        } else {
            match self.predecessor(id) {
                Some(prev) => Cursor::at(prev, self[prev].multiplicity - 1),
                None => Cursor::END,
            }
        }
    }
}

/// In-order iterator over every stored copy.
pub struct Iter<'a, E> {
    nodes: &'a NodeArena<E>,
    front: Cursor,
    back: Cursor,
    remaining: usize,
}

impl<'a, E> Iter<'a, E> {
    pub(crate) fn new(nodes: &'a NodeArena<E>, root: Option<NodeId>, leftmost: Option<NodeId>, len: usize) -> Self {
        Self {
            nodes,
            front: Cursor::first_of(leftmost),
            back: nodes.last_cursor(root),
            remaining: len,
        }
    }
}

impl<E> Clone for Iter<'_, E> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front.node?;
        self.remaining -= 1;
        self.front = self.nodes.next_copy(id, self.front.offset);
        Some(&self.nodes[id].entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, E> DoubleEndedIterator for Iter<'a, E> {
    fn next_back(&mut self) -> Option<&'a E> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back.node?;
        self.remaining -= 1;
        self.back = self.nodes.prev_copy(id, self.back.offset);
        Some(&self.nodes[id].entry)
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> std::iter::FusedIterator for Iter<'_, E> {}

/// Iterator over the half-open cursor range `[first, last)`.
///
/// Stops early at the end position if `last` is never reached.
pub struct Range<'a, E> {
    nodes: &'a NodeArena<E>,
    front: Cursor,
    stop: Cursor,
}

impl<'a, E> Range<'a, E> {
    pub(crate) fn new(nodes: &'a NodeArena<E>, first: Cursor, last: Cursor) -> Result<Self> {
        if !first.is_end() {
            nodes.resolve(first)?;
        }
        Ok(Self {
            nodes,
            front: first,
            stop: last,
        })
    }
}

impl<'a, E> Iterator for Range<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        if self.front == self.stop {
            return None;
        }
        let id = self.front.node?;
        let entry = &self.nodes.get(id)?.entry;
        self.front = self.nodes.next_copy(id, self.front.offset);
        Some(entry)
    }
}

impl<E> std::iter::FusedIterator for Range<'_, E> {}
