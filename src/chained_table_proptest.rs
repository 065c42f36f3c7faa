#![cfg(test)]

// Property tests for ChainedTable kept inside the crate so they can reach
// crate-private positions used by cursors.

use crate::chained_table::ChainedTable;
use crate::config::TableConfig;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize),
    Remove(usize),
    Contains(String),
    Reserve(usize),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => idx.clone().prop_map(OpI::Insert),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (0usize..64).prop_map(OpI::Reserve),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn check_structure<S>(sut: &ChainedTable<String, S>, model: &HashSet<String>) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone + Default,
{
    prop_assert_eq!(sut.len(), model.len());
    prop_assert_eq!(sut.is_empty(), model.is_empty());
    prop_assert!(sut.load_factor() <= sut.max_load_factor());

    // Partition: every key in exactly one bucket, and in the right one.
    let mut flat = Vec::new();
    for (i, bucket) in sut.buckets().enumerate() {
        for k in bucket {
            prop_assert_eq!(sut.bucket_of(k.as_str()), i);
            flat.push(k.clone());
        }
    }
    prop_assert_eq!(flat.len(), model.len());
    let distinct: HashSet<String> = flat.iter().cloned().collect();
    prop_assert_eq!(&distinct, model);

    // Cursor stepping and `iter` agree with the bucket walk.
    let via_iter: Vec<String> = sut.iter().cloned().collect();
    prop_assert_eq!(&via_iter, &flat);
    let mut stepped = Vec::new();
    let mut pos = sut.first_position();
    while let Some(p) = pos {
        let (k, next) = sut.step(p).expect("live position");
        stepped.push(k.clone());
        pos = next;
    }
    prop_assert_eq!(&stepped, &flat);
    Ok(())
}

fn run_scenario<S>(
    mut sut: ChainedTable<String, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone + Default,
{
    let mut model: HashSet<String> = HashSet::new();
    for op in ops {
        match op {
            OpI::Insert(i) => {
                let k = pool[i].clone();
                let fresh = model.insert(k.clone());
                prop_assert_eq!(sut.insert(k), fresh, "insert reports freshness like the model");
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let was = model.remove(k);
                prop_assert_eq!(sut.remove(k.as_str()).is_some(), was);
                prop_assert!(!sut.contains(k.as_str()));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(s.as_str()), model.contains(&s));
            }
            OpI::Reserve(n) => {
                let before = sut.bucket_count();
                prop_assert!(sut.reserve(n).is_ok());
                prop_assert!(sut.bucket_count() >= before);
                prop_assert!((model.len() + n) as f32 <= sut.bucket_count() as f32 * sut.max_load_factor());
            }
            OpI::Clear => {
                let before = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), before);
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.iter().cloned().collect();
                let m_keys: BTreeSet<_> = model.iter().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }
        check_structure(&sut, &model)?;
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashSet.
// Invariants exercised across random operation sequences:
// - Duplicate inserts are no-ops; `insert` reports whether the key was new.
// - `remove` reports presence and always leaves the key absent.
// - Buckets partition the keys by `bucket_of`; `iter` and cursor stepping
//   walk the same bucket order.
// - Growth keeps the load factor within bounds; `clear` keeps bucket count.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainedTable::new(), pool, ops)?;
    }

    #[test]
    fn prop_state_machine_small_tables(
        (pool, ops) in arb_scenario(),
        initial in 1usize..4,
        load in prop_oneof![Just(0.25f32), Just(0.75f32), Just(1.0f32), Just(3.0f32)],
    ) {
        let config = TableConfig::new().initial_buckets(initial).max_load_factor(load);
        run_scenario(ChainedTable::with_config(config).unwrap(), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain traversal.
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

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every key shares bucket 0, so
// unlinking exercises head, middle and tail positions of one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(ChainedTable::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}
