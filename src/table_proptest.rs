#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check the
// chain structure directly after every operation.

use crate::table::{assert_consistent, HashTable};
use core::hash::BuildHasher;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hasher;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Set(usize, i32),
    Emplace(usize, i32),
    GetOrDefault(usize),
    Erase(usize),
    Contains(String),
    Mutate(usize, i32),
    Resize(usize),
    RetainEven,
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Set(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Emplace(i, v)),
            1 => idx.clone().prop_map(Op::GetOrDefault),
            2 => idx.clone().prop_map(Op::Erase),
            2 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (0usize..64).prop_map(Op::Resize),
            1 => Just(Op::RetainEven),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_scenario<S: BuildHasher>(
    mut sut: HashTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = key_from(pool, i);
                let absent = !model.contains_key(&k);
                prop_assert_eq!(sut.insert(k.clone(), v), absent);
                model.entry(k).or_insert(v);
            }
            Op::Set(i, v) => {
                let k = key_from(pool, i);
                let absent = model.insert(k.clone(), v).is_none();
                prop_assert_eq!(sut.set(k, v), absent, "set reports creation");
            }
            Op::Emplace(i, v) => {
                let k = key_from(pool, i);
                let absent = !model.contains_key(&k);
                let mut ran = false;
                let inserted = sut.emplace(k.clone(), || {
                    ran = true;
                    v
                });
                prop_assert_eq!(inserted, absent);
                prop_assert_eq!(ran, absent, "constructor runs only on insertion");
                model.entry(k).or_insert(v);
            }
            Op::GetOrDefault(i) => {
                let k = key_from(pool, i);
                let got = *sut.get_or_default(k.clone());
                let want = *model.entry(k).or_default();
                prop_assert_eq!(got, want);
            }
            Op::Erase(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(!sut.contains(&k));
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains(s.as_str()), has_model);
                prop_assert_eq!(sut.find(s.as_str()).good(), has_model);
                let model_value = model
                    .iter()
                    .find(|(k, _)| k.0 == s)
                    .map(|(_, v)| *v)
                    .unwrap_or(i32::MIN);
                prop_assert_eq!(sut.lookup(s.as_str(), i32::MIN), model_value);
            }
            Op::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(mv) = model.get_mut(&k) {
                    let v = sut.at_mut(&k);
                    *v = v.saturating_add(d);
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(sut.try_at_mut(&k).is_err());
                }
            }
            Op::Resize(n) => {
                let before = sut.capacity();
                sut.resize(n);
                if n == 0 && !model.is_empty() {
                    prop_assert_eq!(sut.capacity(), before);
                }
            }
            Op::RetainEven => {
                let removed = sut.retain(|_, v| *v % 2 == 0);
                let before = model.len();
                model.retain(|_, v| *v % 2 == 0);
                prop_assert_eq!(removed, before - model.len());
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Iterate => {
                let visited: Vec<Key> = sut.keys().cloned().collect();
                let s_keys: BTreeSet<_> = visited.iter().cloned().collect();
                prop_assert_eq!(visited.len(), s_keys.len(), "each entry visited once");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        // Post-conditions after each op
        assert_consistent(&sut);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
    Ok(())
}

// Property: state-machine equivalence against hashbrown::HashMap.
// Invariants exercised across random operation sequences:
// - insert/emplace reject duplicates; set overwrites and reports creation.
// - find/contains/lookup parity with the model for present and absent keys.
// - every entry is chained in the bucket its hash maps to, exactly once.
// - capacity stays a power of two across growth, resize and clear.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), cap in 0usize..32) {
        run_scenario(HashTable::with_capacity(cap), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants under worst-case collisions, where every entry
// shares one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(HashTable::with_capacity_and_hasher(2, ConstBuildHasher), &pool, ops)?;
    }
}
