//! Strict weak orderings and key projections.
//!
//! The engine never compares stored entries directly. It projects each entry
//! to its key with a [`KeyOf`] adapter and compares keys with a [`Compare`]
//! ordering. Sets store bare keys ([`Identity`]); maps store `(key, value)`
//! pairs and order them by the key component only ([`PairKey`]), so the mapped
//! value stays opaque to the tree.

use std::fmt;

/// A strict weak ordering over `K`.
///
/// Two keys are *equivalent* when neither is less than the other.
pub trait Compare<K: ?Sized> {
    /// Returns `true` if `a` is ordered strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    #[inline]
    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Ascending order by [`Ord`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

/// The inverse of another ordering, `Reversed<Natural>` sorts descending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reversed<C = Natural>(pub C);

impl<K: ?Sized, C: Compare<K>> Compare<K> for Reversed<C> {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self.0.less(b, a)
    }
}

/// An ordering backed by a `less-than` closure.
#[derive(Clone, Copy)]
pub struct FnCompare<F>(pub F);

impl<K: ?Sized, F: Fn(&K, &K) -> bool> Compare<K> for FnCompare<F> {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for FnCompare<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCompare(..)")
    }
}

/// Projects a stored entry to the key it is ordered by.
pub trait KeyOf<E> {
    type Key;

    fn key_of(entry: &E) -> &Self::Key;
}

/// The entry is its own key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<K> KeyOf<K> for Identity {
    type Key = K;

    #[inline]
    fn key_of(entry: &K) -> &K {
        entry
    }
}

/// The entry is a `(key, value)` pair ordered by its first component.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairKey;

impl<K, V> KeyOf<(K, V)> for PairKey {
    type Key = K;

    #[inline]
    fn key_of(entry: &(K, V)) -> &K {
        &entry.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_natural_and_reversed() {
        assert!(Natural.less(&1, &2));
        assert!(!Natural.less(&2, &2));
        assert!(Natural.equivalent(&2, &2));
        assert!(Reversed(Natural).less(&2, &1));
        assert!(!Reversed(Natural).less(&1, &2));
    }

    #[test]
    fn test_fn_compare_equivalence_classes() {
        // Orders strings by length only: "ab" and "cd" are equivalent.
        let by_len = FnCompare(|a: &String, b: &String| a.len() < b.len());
        assert!(by_len.less(&"a".to_string(), &"ab".to_string()));
        assert!(by_len.equivalent(&"ab".to_string(), &"cd".to_string()));
    }

    #[test]
    fn test_pair_key_ignores_value() {
        let a = (1, "zzz");
        let b = (1, "aaa");
        assert!(Natural.equivalent(PairKey::key_of(&a), PairKey::key_of(&b)));
    }
}
