use super::*;

use crate::leaf::LeafId;
use crate::level::Slot;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Leaves whose keys lie in `start..=end`.
fn span_of<'a>(wide: &[u128], ids: &'a [LeafId], start: u128, end: u128) -> &'a [LeafId] {
    let first = wide.partition_point(|&k| k < start);
    let past = wide.partition_point(|&k| k <= end);
    &ids[first..past]
}

/// Check every structural invariant of `t` against its leaf list.
pub(crate) fn validate_trie<K: TrieKey, V>(t: &XFastTrie<K, V>) {
    let ids = t.leaves.ordered_ids();
    assert_eq!(ids.len(), t.len(), "leaf list must hold every entry");

    let mut backward = Vec::with_capacity(ids.len());
    let mut cur = t.leaves.last();
    while let Some(id) = cur {
        backward.push(id);
        cur = t.leaves.prev_of(id);
    }
    backward.reverse();
    assert_eq!(backward, ids, "backward links must mirror forward links");

    let keys: Vec<K> = ids.iter().map(|&id| t.leaves.leaf(id).key).collect();
    assert!(
        keys.windows(2).all(|w| w[0] < w[1]),
        "leaf list must be strictly ascending"
    );
    let wide: Vec<u128> = keys.iter().map(|k| k.to_u128()).collect();
    let span = |start: u128, end: u128| span_of(&wide, &ids, start, end);

    let width = t.width();
    for level in 0..width {
        let shift = width - level;
        let table = t.levels.table(level);

        let mut prefixes: Vec<K> = keys.iter().map(|&k| k.prefix(shift)).collect();
        prefixes.dedup();
        assert_eq!(
            table.len(),
            prefixes.len(),
            "level {level}: one node per distinct prefix"
        );

        for prefix in prefixes {
            let node = table
                .get(&prefix)
                .unwrap_or_else(|| panic!("level {level}: no node for prefix {prefix:?}"));
            let lo = prefix.to_u128().checked_shl(shift).unwrap_or(0);
            let half = 1u128 << (shift - 1);
            let subtree = span(lo, lo + (half - 1) + half);

            for bit in [false, true] {
                let start = if bit { lo | half } else { lo };
                let below = span(start, start + (half - 1));
                match node.slot(bit) {
                    Slot::Node => {
                        assert!(level + 1 < width, "level {level}: node slot at finest level");
                        assert!(!below.is_empty(), "level {level}: node slot over empty branch");
                    }
                    Slot::Leaf(id) => {
                        assert_eq!(level + 1, width, "level {level}: leaf slot above finest level");
                        assert_eq!(below, &[id], "level {level}: leaf slot must hold its key");
                    }
                    Slot::Jump(id) => {
                        assert!(below.is_empty(), "level {level}: jump over populated branch");
                        let target = if bit { subtree.last() } else { subtree.first() };
                        assert_eq!(
                            target,
                            Some(&id),
                            "level {level}: jump must target the subtree boundary"
                        );
                    }
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
enum Op<K> {
    Insert(K, u32),
    Remove(K),
    Get(K),
    Bounds(K),
    EraseLowerBound(K),
    PopFirst,
    Clear,
}

fn ops_strategy<K: TrieKey + 'static>(
    key: impl Strategy<Value = K> + Clone,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Op<K>>> {
    let op = prop_oneof![
        45 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        20 => key.clone().prop_map(Op::Remove),
        12 => key.clone().prop_map(Op::Get),
        12 => key.clone().prop_map(Op::Bounds),
        8 => key.clone().prop_map(Op::EraseLowerBound),
        2 => Just(Op::PopFirst),
        1 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=max_ops)
}

fn clustered_u64() -> impl Strategy<Value = u64> + Clone {
    prop_oneof![
        any::<u64>(),
        0u64..64,
        (u64::MAX - 64)..=u64::MAX,
        (1u64 << 40)..((1u64 << 40) + 64),
    ]
}

fn apply<K: TrieKey>(
    t: &mut XFastTrie<K, u32>,
    m: &mut BTreeMap<K, u32>,
    op: Op<K>,
) -> std::result::Result<(), TestCaseError> {
    match op {
        Op::Insert(key, value) => {
            let (pos, inserted) = t.insert(key, value).expect("key fits width");
            prop_assert_eq!(inserted, !m.contains_key(&key));
            m.entry(key).or_insert(value);
            prop_assert_eq!(t.entry_at(pos).map(|(k, v)| (k, *v)), Some((key, m[&key])));
        }
        Op::Remove(key) => {
            prop_assert_eq!(t.remove(key), m.remove(&key));
        }
        Op::Get(key) => {
            prop_assert_eq!(t.get(key), m.get(&key));
            prop_assert_eq!(t.count(key), usize::from(m.contains_key(&key)));
        }
        Op::Bounds(key) => {
            let lower = m.range(key..).next().map(|(k, _)| *k);
            let upper = m
                .range((Bound::Excluded(key), Bound::Unbounded))
                .next()
                .map(|(k, _)| *k);
            let pred = m.range(..key).next_back().map(|(k, _)| *k);
            prop_assert_eq!(t.key_at(t.lower_bound(key)), lower);
            prop_assert_eq!(t.key_at(t.upper_bound(key)), upper);
            prop_assert_eq!(t.successor(key).map(|(k, _)| k), upper);
            prop_assert_eq!(t.predecessor(key).map(|(k, _)| k), pred);
        }
        Op::EraseLowerBound(key) => {
            let pos = t.lower_bound(key);
            let next = t.erase(pos);
            let lower = m.range(key..).next().map(|(k, _)| *k);
            if let Some(k) = lower {
                m.remove(&k);
            }
            prop_assert_eq!(t.key_at(next), m.range(key..).next().map(|(k, _)| *k));
        }
        Op::PopFirst => {
            prop_assert_eq!(t.pop_first(), m.pop_first());
        }
        Op::Clear => {
            t.clear();
            m.clear();
        }
    }
    prop_assert_eq!(t.len(), m.len());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_narrow(ops in ops_strategy(0u16..1024, 200)) {
        let mut t: XFastTrie<u16, u32> = XFastTrie::with_width(10).unwrap();
        let mut m: BTreeMap<u16, u32> = BTreeMap::new();

        for op in ops {
            apply(&mut t, &mut m, op)?;
            validate_trie(&t);
        }

        let got: Vec<(u16, u32)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(u16, u32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_equivalence_u64(ops in ops_strategy(clustered_u64(), 400)) {
        let mut t: XFastTrie<u64, u32> = XFastTrie::new();
        let mut m: BTreeMap<u64, u32> = BTreeMap::new();

        for op in ops {
            apply(&mut t, &mut m, op)?;
        }

        validate_trie(&t);
        let got: Vec<(u64, u32)> = t.iter().rev().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(u64, u32)> = m.iter().rev().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_range_matches_btree(
        keys in prop::collection::btree_set(0u32..4096, 0..64),
        lo in 0u32..4200,
        hi in 0u32..4200,
    ) {
        let t: XFastTrie<u32, ()> = keys.iter().map(|&k| (k, ())).collect();
        let got: Vec<u32> = t.range(lo..hi).map(|(k, _)| k).collect();
        let expected: Vec<u32> = if lo <= hi {
            keys.range(lo..hi).copied().collect()
        } else {
            Vec::new()
        };
        prop_assert_eq!(got, expected);

        let got: Vec<u32> = t.range(lo..=hi).rev().map(|(k, _)| k).collect();
        let expected: Vec<u32> = if lo <= hi {
            keys.range(lo..=hi).rev().copied().collect()
        } else {
            Vec::new()
        };
        prop_assert_eq!(got, expected);
    }
}

/// Call `visit` once per ordering of `keys`, permuting a scratch copy in place.
fn visit_orderings(keys: &[u8], mut visit: impl FnMut(&[u8])) {
    fn permute(buf: &mut [u8], fixed: usize, visit: &mut impl FnMut(&[u8])) {
        if fixed == buf.len() {
            visit(buf);
            return;
        }
        for i in fixed..buf.len() {
            buf.swap(fixed, i);
            permute(buf, fixed + 1, visit);
            buf.swap(fixed, i);
        }
    }

    let mut buf = keys.to_vec();
    permute(&mut buf, 0, &mut visit);
}

// Keys sharing long prefixes, plus both extremes of the key space.
const SMALL_SET: [u8; 6] = [0, 1, 2, 0x80, 0x81, 0xFF];

#[test]
fn exhaustive_insert_order_small_set() {
    visit_orderings(&SMALL_SET, |order| {
        let mut t: XFastTrie<u8, usize> = XFastTrie::new();
        let mut m: BTreeMap<u8, usize> = BTreeMap::new();

        for (i, &k) in order.iter().enumerate() {
            let (_, inserted) = t.insert(k, i).unwrap();
            assert_eq!(inserted, m.insert(k, i).is_none());
            validate_trie(&t);
        }

        let got: Vec<(u8, usize)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(u8, usize)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    // Insert in a fixed order, then remove in every order.
    let mut base_trie: XFastTrie<u8, usize> = XFastTrie::new();
    let mut base_map: BTreeMap<u8, usize> = BTreeMap::new();
    for (i, &k) in SMALL_SET.iter().enumerate() {
        base_trie.insert(k, i).unwrap();
        base_map.insert(k, i);
    }

    visit_orderings(&SMALL_SET, |order| {
        let mut t = base_trie.clone();
        let mut m = base_map.clone();

        for &k in order {
            assert_eq!(t.remove(k), m.remove(&k));
            assert_eq!(t.len(), m.len());
            validate_trie(&t);
        }
        assert_eq!(t.len(), 0);
        assert!(t.leaves.first().is_none());
    });
}

#[test]
fn randomized_churn_matches_btree() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut t: XFastTrie<u32, u32> = XFastTrie::with_width(12).unwrap();
    let mut m: BTreeMap<u32, u32> = BTreeMap::new();

    for step in 0..20_000u32 {
        let key = rng.gen_range(0..4096);
        if rng.gen_bool(0.55) {
            let (_, inserted) = t.insert(key, step).unwrap();
            assert_eq!(inserted, !m.contains_key(&key));
            m.entry(key).or_insert(step);
        } else {
            assert_eq!(t.remove(key), m.remove(&key));
        }
        if step % 1000 == 0 {
            validate_trie(&t);
        }
    }

    validate_trie(&t);
    assert!(t.iter().map(|(k, v)| (k, *v)).eq(m.iter().map(|(k, v)| (*k, *v))));
}
