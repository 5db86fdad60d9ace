// HashTable property tests (public API).
//
// Property 1: toc round trip.
//  - Model: BTreeMap of the last value set per key.
//  - Invariant: sorted_toc() equals the model's keys; at(k) equals the
//    model's value; a full traversal yields len() distinct keys.
//
// Property 2: merge partitions the union.
//  - After a.merge(&mut b), `a` holds every key of the union, keys
//    originally in `a` keep their values, and `b` keeps only shared keys.
//
// Property 3: growth from any initial size preserves pairs.
use chain_hashtable::HashTable;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

proptest! {
    #[test]
    fn prop_toc_round_trip(
        cap in 0usize..64,
        pairs in proptest::collection::vec((any::<i16>(), any::<i32>()), 0..300)
    ) {
        let mut t: HashTable<i16, i32> = HashTable::with_capacity(cap);
        let mut model: BTreeMap<i16, i32> = BTreeMap::new();
        for (k, v) in pairs {
            let created = t.set(k, v);
            prop_assert_eq!(created, model.insert(k, v).is_none());
        }

        prop_assert_eq!(t.sorted_toc(), model.keys().copied().collect::<Vec<_>>());
        for (k, v) in &model {
            prop_assert_eq!(t.at(k), v);
        }
        let visited: Vec<i16> = t.iter().map(|(k, _)| *k).collect();
        let distinct: BTreeSet<i16> = visited.iter().copied().collect();
        prop_assert_eq!(visited.len(), t.len());
        prop_assert_eq!(distinct.len(), t.len());
        prop_assert!(t.capacity() == 0 || t.capacity().is_power_of_two());
    }
}

proptest! {
    #[test]
    fn prop_merge_partitions_union(
        a_keys in proptest::collection::btree_set(0u16..200, 0..60),
        b_keys in proptest::collection::btree_set(0u16..200, 0..60),
    ) {
        let mut a: HashTable<u16, u32> = a_keys.iter().map(|&k| (k, 1)).collect();
        let mut b: HashTable<u16, u32> = b_keys.iter().map(|&k| (k, 2)).collect();

        let moved = a.merge(&mut b);
        prop_assert_eq!(moved, b_keys.difference(&a_keys).count());

        let union: BTreeSet<u16> = a_keys.union(&b_keys).copied().collect();
        for k in &union {
            prop_assert!(a.contains(k));
        }
        for k in &a_keys {
            prop_assert_eq!(a.get(k), Some(&1));
        }
        let left: BTreeSet<u16> = b.keys().copied().collect();
        let both: BTreeSet<u16> = a_keys.intersection(&b_keys).copied().collect();
        prop_assert_eq!(left, both);
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_growth_preserves_pairs(initial in 0usize..40, n in 1u32..2000) {
        let mut t: HashTable<u32, u64> = HashTable::with_capacity(initial);
        for i in 0..n {
            prop_assert!(t.insert(i, u64::from(i) * 3));
        }
        prop_assert_eq!(t.len(), n as usize);
        for i in 0..n {
            prop_assert_eq!(t.get(&i), Some(&(u64::from(i) * 3)));
        }
    }
}
