use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn validate_trie<V>(t: &Trie<u8, V>) {
    t.validate().expect("trie invariants");

    let mut valued = 0usize;
    let mut visited = 0usize;
    for node in t.level_order() {
        visited += 1;
        if node.has_value() {
            valued += 1;
        }
        assert_eq!(
            node.children().count(),
            node.sibling_count(),
            "sibling count must match level contents"
        );
        let labels: Vec<u8> = node.children().map(|c| *c.label().unwrap()).collect();
        assert!(
            labels.windows(2).all(|w| w[0] < w[1]),
            "in-order siblings must be strictly ascending"
        );
    }
    assert_eq!(visited, t.node_count() + 1, "level order must reach every node");
    assert_eq!(valued, t.len(), "valued node count must match Trie::len");
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet keeps prefixes shared and levels dense.
    prop::collection::vec(b'a'..=b'e', 0..=6)
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 50)]
    Insert(#[proptest(strategy = "key_strategy()")] Vec<u8>, u64),
    #[proptest(weight = 30)]
    Get(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 15)]
    Balance(#[proptest(strategy = "key_strategy()")] Vec<u8>),
    #[proptest(weight = 5)]
    BalanceAll,
}

fn naive_matches(patterns: &BTreeMap<Vec<u8>, u16>, text: &[u8]) -> Vec<(usize, usize, u16)> {
    let mut out = Vec::new();
    for end in 1..=text.len() {
        for start in 0..end {
            if let Some(&v) = patterns.get(&text[start..end]) {
                out.push((start, end, v));
            }
        }
    }
    out
}

fn build(patterns: &BTreeMap<Vec<u8>, u16>, balance: bool) -> Automaton<u8, u16> {
    let mut t = Trie::new();
    for (p, &v) in patterns {
        t.put(p, v).unwrap();
    }
    if balance {
        t.balance_all();
    }
    compile(t)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(ops in prop::collection::vec(any::<Op>(), 0..=500)) {
        let mut t: Trie<u8, u64> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let old_t = t.insert(&key, value).unwrap();
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Get(key) => {
                    let got_t = t.value(&key).unwrap().copied();
                    let got_m = m.get(&key).copied();
                    prop_assert_eq!(got_t, got_m);
                }
                Op::Balance(key) => {
                    if let Some(node) = t.get(&key).unwrap() {
                        let id = node.id();
                        t.balance(id);
                    }
                }
                Op::BalanceAll => t.balance_all(),
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_trie(&t);
        let got: Vec<(Vec<u8>, u64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_matches_naive(
        patterns in prop::collection::btree_map(
            prop::collection::vec(b'a'..=b'c', 1..=4),
            any::<u16>(),
            0..12,
        ),
        text in prop::collection::vec(b'a'..=b'd', 0..=40),
        balance in any::<bool>(),
    ) {
        let ac = build(&patterns, balance);
        let expected = naive_matches(&patterns, &text);

        let got: Vec<(usize, usize, u16)> = ac
            .find_all(&text)
            .unwrap()
            .into_iter()
            .map(|m| (m.start, m.end, *m.value))
            .collect();
        prop_assert_eq!(&got, &expected);

        let values: Vec<u16> = ac.match_all(&text).unwrap().into_iter().copied().collect();
        let expected_values: Vec<u16> = expected.iter().map(|&(_, _, v)| v).collect();
        prop_assert_eq!(values, expected_values);
    }

    #[test]
    fn prop_fail_links_are_proper_suffixes(
        patterns in prop::collection::btree_map(
            prop::collection::vec(b'a'..=b'c', 1..=5),
            any::<u16>(),
            0..16,
        ),
    ) {
        let ac = build(&patterns, false);
        let trie = ac.trie();
        for node in trie.level_order().skip(1) {
            let path = trie.key_of(node.id());
            let fail = ac.fail(node.id());
            let fail_path = trie.key_of(fail);
            prop_assert!(fail_path.len() < path.len());
            prop_assert!(path.ends_with(&fail_path));
            prop_assert_eq!(ac.depth(node.id()), path.len());

            // No longer proper suffix of `path` may exist in the trie.
            for start in 1..path.len() - fail_path.len() {
                prop_assert!(trie.get(&path[start..]).unwrap().is_none());
            }
        }
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
fn exhaustive_insert_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
        b"abc".to_vec(),
    ];
    let text = b"abcabcbac";
    let patterns: BTreeMap<Vec<u8>, u16> =
        keys.iter().enumerate().map(|(i, k)| (k.clone(), i as u16)).collect();
    let expected = naive_matches(&patterns, text);

    for_each_permutation(&keys, |perm| {
        let mut t: Trie<u8, u16> = Trie::new();
        for k in &perm {
            t.put(k, patterns[k]).unwrap();
        }
        validate_trie(&t);

        let ac = compile(t.clone());
        let got: Vec<(usize, usize, u16)> = ac
            .find_all(text)
            .unwrap()
            .into_iter()
            .map(|m| (m.start, m.end, *m.value))
            .collect();
        assert_eq!(got, expected, "insert order {:?}", perm);

        t.balance_all();
        validate_trie(&t);
        let balanced = compile(t);
        assert_eq!(balanced.match_all(text).unwrap(), ac.match_all(text).unwrap());
    });
}

#[test]
fn randomized_large_pattern_set() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut patterns: BTreeMap<Vec<u8>, u16> = BTreeMap::new();
    for i in 0..500u16 {
        let len = rng.gen_range(1..=6);
        let p: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'h')).collect();
        patterns.insert(p, i);
    }
    let text: Vec<u8> = (0..2_000).map(|_| rng.gen_range(b'a'..=b'h')).collect();

    let ac = build(&patterns, true);
    validate_trie(ac.trie());
    let got: Vec<(usize, usize, u16)> = ac
        .scan(text.iter().copied())
        .map(|m| (m.start, m.end, *m.value))
        .collect();
    assert_eq!(got, naive_matches(&patterns, &text));
}
