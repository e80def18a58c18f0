use super::*;

use crate::hash::hash_func;
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Hop {
    Host,
    Shared,
    Compact,
}

/// Sends a host table through space `hop` and back.
fn round_trip(t: &FixedHashTable<i64, i32>, hop: Hop) -> FixedHashTable<i64, i32> {
    let back = match hop {
        Hop::Host => t.copy_to::<Host>(),
        Hop::Shared => t.copy_to::<Shared>().and_then(|s| s.copy_to::<Host>()),
        Hop::Compact => t.copy_to::<Compact>().and_then(|c| c.copy_to::<Host>()),
    };
    back.expect("small tables fit every space")
}

fn validate_table<K: Ordinal, V: Ordinal, M: MemorySpace>(t: &FixedHashTable<K, V, M>) {
    t.check().expect("table must pass its own consistency check");

    let ptr = t.offsets();
    let pairs = t.pairs();
    if ptr.is_empty() {
        assert!(pairs.is_empty(), "pairs stored without buckets");
        return;
    }
    assert_eq!(ptr[0].to_usize(), 0, "first offset must be 0");
    assert_eq!(
        ptr[ptr.len() - 1].to_usize(),
        pairs.len(),
        "last offset must equal the stored pair count"
    );

    let size = t.num_buckets();
    for b in 0..size {
        let (start, end) = (ptr[b].to_usize(), ptr[b + 1].to_usize());
        assert!(start <= end, "offsets must be non-decreasing (bucket={b})");
        for &(k, _) in &pairs[start..end] {
            assert_eq!(hash_func(k, size), b, "key {k} is in the wrong bucket");
        }
    }
}

/// Keys drawn from a narrow range so that repeats are common.
fn pairs_strategy() -> impl Strategy<Value = Vec<(i32, i32)>> {
    prop::collection::vec((-64i32..64, any::<i32>()), 0..=400)
}

/// A leading run of consecutive keys followed by distinct scattered keys.
fn run_then_scattered() -> impl Strategy<Value = Vec<i64>> {
    (
        any::<i16>(),
        0usize..40,
        prop::collection::hash_set(any::<i32>(), 0..300),
    )
        .prop_map(|(start, run, extra)| {
            let start = start as i64;
            let mut keys: Vec<i64> = (start..start + run as i64).collect();
            let taken: HashSet<i64> = keys.iter().copied().collect();
            keys.extend(extra.into_iter().map(i64::from).filter(|k| !taken.contains(k)));
            keys
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_pairs_match_first_occurrence(input in pairs_strategy(), probes in prop::collection::vec(-80i32..80, 0..64)) {
        let keys: Vec<i32> = input.iter().map(|&(k, _)| k).collect();
        let vals: Vec<i32> = input.iter().map(|&(_, v)| v).collect();
        let t: FixedHashTable<i32, i32> = FixedHashTable::from_pairs(&keys, &vals).unwrap();
        validate_table(&t);

        let mut first: HashMap<i32, i32> = HashMap::new();
        for &(k, v) in &input {
            first.entry(k).or_insert(v);
        }
        for (&k, &v) in &first {
            prop_assert_eq!(t.get(k), v);
        }
        for k in probes {
            if !first.contains_key(&k) {
                prop_assert_eq!(t.get(k), -1);
            }
        }

        prop_assert_eq!(t.num_pairs(), input.len());
        prop_assert_eq!(t.has_duplicate_keys(), first.len() != input.len());
    }

    #[test]
    fn prop_contiguous_round_trip(keys in run_then_scattered(), start in 0u32..1_000_000) {
        let t: FixedHashTable<i64, u32> = FixedHashTable::from_keys_starting_at(&keys, start, true).unwrap();
        validate_table(&t);

        prop_assert_eq!(t.num_pairs(), keys.len());
        prop_assert!(!t.has_duplicate_keys());
        for (i, &k) in keys.iter().enumerate() {
            prop_assert_eq!(t.get(k), start + i as u32);
            prop_assert_eq!(t.get_key(t.get(k)), k);
        }
        if let Some(&k) = keys.first() {
            prop_assert_eq!(t.min_val(), start);
            prop_assert_eq!(t.contiguous_range().map(|r| r.first()), Some(k));
        }
    }

    #[test]
    fn prop_duplicates_in_key_only_tables(keys in prop::collection::vec(-20i64..20, 0..100)) {
        let t: FixedHashTable<i64, i64> = FixedHashTable::from_keys(&keys).unwrap();
        validate_table(&t);

        let distinct: HashSet<i64> = keys.iter().copied().collect();
        prop_assert_eq!(t.has_duplicate_keys(), distinct.len() != keys.len());
        for &k in &distinct {
            let first = keys.iter().position(|&x| x == k).unwrap();
            prop_assert_eq!(t.get(k), first as i64);
        }
    }

    #[test]
    fn prop_copy_across_spaces(keys in run_then_scattered(), hops in prop::collection::vec(any::<Hop>(), 1..4)) {
        let original: FixedHashTable<i64, i32> = FixedHashTable::from_keys(&keys).unwrap();
        let mut t = original.clone();
        for hop in hops {
            t = round_trip(&t, hop);
            validate_table(&t);
        }

        prop_assert_eq!(t.num_pairs(), original.num_pairs());
        prop_assert_eq!(t.contiguous_range(), original.contiguous_range());
        for (i, &k) in keys.iter().enumerate() {
            prop_assert_eq!(t.get(k), original.get(k));
            prop_assert_eq!(t.get_key(i as i32), k);
        }
        prop_assert_eq!(t.get(i64::MAX), -1);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_key_order_small_set() {
    // Contains a run (4, 5, 6) so some orders start with a non-trivial run.
    let keys: Vec<u16> = vec![4, 5, 6, 0, 100, 7];

    for_each_permutation(&keys, |perm| {
        let t: FixedHashTable<u16, u8> = FixedHashTable::from_keys(&perm).unwrap();
        validate_table(&t);
        assert_eq!(t.num_pairs(), perm.len());
        assert!(!t.has_duplicate_keys());
        for (i, &k) in perm.iter().enumerate() {
            assert_eq!(t.get(k), i as u8);
            assert_eq!(t.get_key(i as u8), k);
        }
        assert_eq!(t.get(3), u8::MAX);
        assert_eq!(t.get(8), u8::MAX);
    });
}
