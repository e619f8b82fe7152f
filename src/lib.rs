//! # ordtree
//!
//! Ordered set, multiset and map containers built on one red-black tree
//! engine.
//!
//! [`RbTree`] does the work: search, insertion with rebalancing, deletion
//! with rebalancing and duplicate-aware cursors. The facades only pick how
//! entries are keyed and what an equivalent key means:
//!
//! | container            | entry    | duplicates                     |
//! |----------------------|----------|--------------------------------|
//! | [`OrderedSet`]       | `K`      | rejected                       |
//! | [`OrderedMultiset`]  | `K`      | folded into a multiplicity     |
//! | [`OrderedMap`]       | `(K, V)` | rejected, ordered by `K` only  |
//!
//! Ordering is pluggable through [`Compare`]: [`Natural`] uses [`Ord`],
//! [`Reversed`] inverts another ordering and [`FnCompare`] wraps a closure.
//!
//! ## Example
//!
//! ```rust
//! use ordtree::{OrderedMultiset, OrderedSet};
//!
//! let mut set = OrderedSet::new();
//! for k in [5, 3, 8, 1, 4, 7, 9] {
//!     set.insert(k);
//! }
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
//!
//! let cursor = set.lower_bound(&6);
//! assert_eq!(set.get(cursor), Ok(&7));
//!
//! let bag: OrderedMultiset<_> = ["a", "a", "b"].into_iter().collect();
//! assert_eq!(bag.count(&"a"), 2);
//! assert_eq!(bag.len(), 3);
//! ```
//!
//! ## Cursors
//!
//! Positions are plain [`Cursor`] values. A cursor names one copy of a key:
//! the node plus an offset into its multiplicity. The end position closes
//! the sequence into a ring, so stepping forward from end reaches the first
//! element and stepping backward from end reaches the last. A cursor whose
//! element has been removed is reported as [`TreeError::StaleCursor`] rather
//! than silently reading another element.

mod compare;
mod cursor;
mod error;
pub mod map;
pub mod multiset;
mod node;
pub mod set;
mod tree;

pub use compare::{Compare, FnCompare, Identity, KeyOf, Natural, PairKey, Reversed};
pub use cursor::{Cursor, Iter, Range};
pub use error::{Result, TreeError};
pub use map::OrderedMap;
pub use multiset::OrderedMultiset;
pub use node::NodeId;
pub use set::OrderedSet;
pub use tree::{DuplicatePolicy, RbTree};


#[cfg(test)]
mod proptests;
