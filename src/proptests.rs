use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound::{Excluded, Unbounded};

/// Checks the structural invariants and that cursor stepping agrees with the
/// iterator in both directions.
fn validate_tree<E: PartialEq + std::fmt::Debug, X, C>(t: &RbTree<E, X, C>)
where
    X: KeyOf<E>,
    C: Compare<X::Key>,
{
    t.assert_invariants();

    let forward: Vec<&E> = t.iter().collect();
    assert_eq!(forward.len(), t.len(), "iterator length must match len");

    let mut cursor = t.begin();
    let mut walked = Vec::with_capacity(t.len());
    while !cursor.is_end() {
        walked.push(t.entry(cursor).expect("live cursor"));
        cursor = t.cursor_next(cursor).expect("live cursor");
    }
    assert_eq!(walked, forward, "cursor walk must match iteration");

    let mut backward: Vec<&E> = t.iter().rev().collect();
    backward.reverse();
    assert_eq!(backward, forward, "reverse iteration must mirror forward");
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 8)]
    Insert(#[proptest(strategy = "0u16..256")] u16),
    #[proptest(weight = 3)]
    EraseKey(#[proptest(strategy = "0u16..256")] u16),
    #[proptest(weight = 3)]
    EraseAt(#[proptest(strategy = "0u16..256")] u16),
    #[proptest(weight = 2)]
    Bounds(#[proptest(strategy = "0u16..256")] u16),
    #[proptest(weight = 1)]
    Assign(#[proptest(strategy = "0u16..256")] u16),
    #[proptest(skip)]
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=1000)
}

fn ops_with_clear_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        99 => any::<Op>(),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1000)
}

fn first_at_or_after<K: Ord + Copy, V>(model: &BTreeMap<K, V>, key: K) -> Option<K> {
    model.range(key..).next().map(|(k, _)| *k)
}

fn first_after<K: Ord + Copy, V>(model: &BTreeMap<K, V>, key: K) -> Option<K> {
    model.range((Excluded(key), Unbounded)).next().map(|(k, _)| *k)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_set_equivalence(ops in ops_with_clear_strategy()) {
        let mut s: OrderedSet<u16> = OrderedSet::new();
        let mut m: BTreeSet<u16> = BTreeSet::new();

        for op in ops {
            match op {
                Op::Insert(key) | Op::Assign(key) => {
                    prop_assert_eq!(s.insert(key).1, m.insert(key));
                }
                Op::EraseKey(key) => {
                    prop_assert_eq!(s.erase_key(&key), usize::from(m.remove(&key)));
                }
                Op::EraseAt(key) => {
                    let cursor = s.lower_bound(&key);
                    let expected = m.range(key..).next().copied();
                    prop_assert_eq!(s.get(cursor).ok().copied(), expected);
                    if let Some(found) = expected {
                        let next = s.erase(cursor).unwrap();
                        m.remove(&found);
                        let after = m.range((Excluded(found), Unbounded)).next().copied();
                        prop_assert_eq!(s.get(next).ok().copied(), after);
                        prop_assert!(s.find(&found).is_end());
                    }
                }
                Op::Bounds(key) => {
                    let lower = m.range(key..).next().copied();
                    let upper = m.range((Excluded(key), Unbounded)).next().copied();
                    prop_assert_eq!(s.get(s.lower_bound(&key)).ok().copied(), lower);
                    prop_assert_eq!(s.get(s.upper_bound(&key)).ok().copied(), upper);
                    prop_assert_eq!(s.count(&key), usize::from(m.contains(&key)));
                }
                Op::Clear => {
                    s.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(s.len(), m.len());
        }

        validate_tree(&s.tree);
        let got: Vec<u16> = s.iter().copied().collect();
        let expected: Vec<u16> = m.iter().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_multiset_equivalence(ops in ops_strategy()) {
        let mut s: OrderedMultiset<u16> = OrderedMultiset::new();
        let mut m: BTreeMap<u16, usize> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key) | Op::Assign(key) => {
                    let cursor = s.insert(key);
                    let count = m.entry(key).or_insert(0);
                    prop_assert_eq!(cursor.offset(), *count);
                    *count += 1;
                }
                Op::EraseKey(key) => {
                    prop_assert_eq!(s.erase_key(&key), m.remove(&key).unwrap_or(0));
                }
                Op::EraseAt(key) => {
                    let cursor = s.lower_bound(&key);
                    let expected = first_at_or_after(&m, key);
                    prop_assert_eq!(s.get(cursor).ok().copied(), expected);
                    if let Some(found) = expected {
                        let next = s.erase(cursor).unwrap();
                        let remaining = match m.get_mut(&found) {
                            Some(count) => {
                                *count -= 1;
                                *count
                            }
                            None => 0,
                        };
                        if remaining == 0 {
                            m.remove(&found);
                            prop_assert_eq!(s.get(next).ok().copied(), first_after(&m, found));
                        } else {
                            prop_assert_eq!(s.get(next).ok().copied(), Some(found));
                        }
                    }
                }
                Op::Bounds(key) => {
                    let (lo, hi) = s.equal_range(&key);
                    let span = s.range(lo, hi).unwrap().count();
                    prop_assert_eq!(span, m.get(&key).copied().unwrap_or(0));
                    prop_assert_eq!(s.get(hi).ok().copied(), first_after(&m, key));
                }
                Op::Clear => {
                    s.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(s.len(), m.values().sum::<usize>());
        }

        validate_tree(&s.tree);
        let got: Vec<u16> = s.iter().copied().collect();
        let expected: Vec<u16> = m
            .iter()
            .flat_map(|(k, n)| std::iter::repeat(*k).take(*n))
            .collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_map_equivalence(ops in ops_strategy()) {
        let mut t: OrderedMap<u16, usize> = OrderedMap::new();
        let mut m: BTreeMap<u16, usize> = BTreeMap::new();

        for (step, op) in ops.into_iter().enumerate() {
            match op {
                Op::Insert(key) => {
                    let expected = !m.contains_key(&key);
                    m.entry(key).or_insert(step);
                    prop_assert_eq!(t.insert(key, step).1, expected);
                }
                Op::Assign(key) => {
                    let expected = m.insert(key, step).is_none();
                    prop_assert_eq!(t.insert_or_assign(key, step).1, expected);
                }
                Op::EraseKey(key) => {
                    prop_assert_eq!(t.remove(&key), m.remove(&key));
                }
                Op::EraseAt(key) => {
                    *t.get_or_insert_default(key) += 1;
                    *m.entry(key).or_default() += 1;
                }
                Op::Bounds(key) => {
                    prop_assert_eq!(t.get(&key), m.get(&key));
                    prop_assert_eq!(t.at(&key).ok(), m.get(&key));
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t.tree);
        let got: Vec<(u16, usize)> = t.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u16, usize)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_set_merge(
        a in prop::collection::vec(0u16..128, 0..200),
        b in prop::collection::vec(0u16..128, 0..200),
    ) {
        let mut sa: OrderedSet<u16> = a.iter().copied().collect();
        let mut sb: OrderedSet<u16> = b.iter().copied().collect();
        let ma: BTreeSet<u16> = a.into_iter().collect();
        let mb: BTreeSet<u16> = b.into_iter().collect();

        let moved = sa.merge(&mut sb).unwrap();
        prop_assert_eq!(moved, mb.difference(&ma).count());

        validate_tree(&sa.tree);
        validate_tree(&sb.tree);
        let union: Vec<u16> = ma.union(&mb).copied().collect();
        let common: Vec<u16> = ma.intersection(&mb).copied().collect();
        prop_assert_eq!(sa.iter().copied().collect::<Vec<_>>(), union);
        prop_assert_eq!(sb.iter().copied().collect::<Vec<_>>(), common);
    }

    #[test]
    fn prop_multiset_merge(
        a in prop::collection::vec(0u16..64, 0..200),
        b in prop::collection::vec(0u16..64, 0..200),
    ) {
        let mut sa: OrderedMultiset<u16> = a.iter().copied().collect();
        let mut sb: OrderedMultiset<u16> = b.iter().copied().collect();

        prop_assert_eq!(sa.merge(&mut sb).unwrap(), b.len());
        prop_assert!(sb.is_empty());
        validate_tree(&sa.tree);
        validate_tree(&sb.tree);

        let mut all: Vec<u16> = a.into_iter().chain(b).collect();
        all.sort_unstable();
        prop_assert_eq!(sa.iter().copied().collect::<Vec<_>>(), all);
    }

    #[test]
    fn prop_erase_range_matches_model(
        keys in prop::collection::vec(0u16..512, 0..300),
        lo in 0u16..512,
        width in 0u16..256,
    ) {
        let mut s: OrderedSet<u16> = keys.iter().copied().collect();
        let mut m: BTreeSet<u16> = keys.into_iter().collect();
        let hi = lo.saturating_add(width);

        let first = s.lower_bound(&lo);
        let last = s.lower_bound(&hi);
        let returned = s.erase_range(first, last).unwrap();
        m.retain(|k| *k < lo || *k >= hi);

        prop_assert_eq!(s.get(returned).ok().copied(), m.range(hi..).next().copied());
        validate_tree(&s.tree);
        prop_assert_eq!(s.iter().copied().collect::<Vec<_>>(), m.into_iter().collect::<Vec<_>>());
    }
}

/// Runs `f` on every ordering of `items`, generated in place by Heap's
/// algorithm (one swap between consecutive orderings).
fn for_each_ordering<T: Copy>(items: &[T], mut f: impl FnMut(&[T])) {
    let mut order = items.to_vec();
    let mut swaps = vec![0usize; order.len()];
    f(&order);

    let mut i = 1;
    while i < order.len() {
        if swaps[i] < i {
            let j = if i % 2 == 0 { 0 } else { swaps[i] };
            order.swap(j, i);
            f(&order);
            swaps[i] += 1;
            i = 1;
        } else {
            swaps[i] = 0;
            i += 1;
        }
    }
}

#[test]
fn orderings_are_complete_and_distinct() {
    let mut seen = BTreeSet::new();
    for_each_ordering(&[1u8, 2, 3, 4, 5], |order| {
        assert!(seen.insert(order.to_vec()));
    });
    assert_eq!(seen.len(), 120);

    let mut calls = 0;
    for_each_ordering::<u8>(&[], |order| {
        assert!(order.is_empty());
        calls += 1;
    });
    assert_eq!(calls, 1);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u8> = (1..=7).collect();

    for_each_ordering(&keys, |order| {
        let mut s: OrderedSet<u8> = OrderedSet::new();
        let mut m: BTreeSet<u8> = BTreeSet::new();

        for &k in order {
            assert_eq!(s.insert(k).1, m.insert(k));
            validate_tree(&s.tree);
        }
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), keys);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u8> = (1..=7).collect();

    // Insert in a fixed order, then remove in all permutations.
    let base: OrderedSet<u8> = keys.iter().copied().collect();
    let base_model: BTreeSet<u8> = keys.iter().copied().collect();

    for_each_ordering(&keys, |order| {
        let mut s = base.clone();
        let mut m = base_model.clone();

        for k in order {
            assert_eq!(s.erase_key(k), usize::from(m.remove(k)));
            assert_eq!(s.len(), m.len());
            validate_tree(&s.tree);
        }
        assert!(s.is_empty());
        assert!(s.begin().is_end());
    });
}

#[test]
fn exhaustive_remove_order_after_shuffled_build() {
    // Deletions, then inserts, then deletions again.
    let build = [4u8, 2, 6, 1, 3, 5, 7, 8];
    let base: OrderedSet<u8> = build.iter().copied().collect();

    for_each_ordering(&build[..6], |order| {
        let mut s = base.clone();
        for k in &order[..3] {
            s.erase_key(k);
            validate_tree(&s.tree);
        }
        for k in [9u8, 10, 0] {
            s.insert(k);
            validate_tree(&s.tree);
        }
        for k in &order[3..] {
            s.erase_key(k);
            validate_tree(&s.tree);
        }
        assert_eq!(s.len(), 5);
    });
}

#[test]
fn exhaustive_multiset_order_with_duplicates() {
    let keys: Vec<u8> = vec![1, 1, 2, 3, 3, 3];

    for_each_ordering(&keys, |order| {
        let mut s: OrderedMultiset<u8> = OrderedMultiset::new();
        for &k in order {
            s.insert(k);
            validate_tree(&s.tree);
        }
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), keys);

        for k in order {
            let cursor = s.find(k);
            s.erase(cursor).unwrap();
            validate_tree(&s.tree);
        }
        assert!(s.is_empty());
    });
}
