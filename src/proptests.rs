use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::HashMap;

/// Three-letter alphabet so random sequences share prefixes often.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Arbitrary)]
enum Tok {
    A,
    B,
    C,
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, u8, Vec<Tok>),
    Remove(Vec<Tok>),
    Query(Vec<Tok>, Option<usize>),
}

/// Naive reference: a flat list of values scanned on every query.
#[derive(Default)]
struct Model {
    entries: HashMap<u8, (Vec<Tok>, Weight, u64)>,
    next_stamp: u64,
}

impl Model {
    fn insert(&mut self, value: u8, weight: Weight, sequence: &[Tok]) -> Result<()> {
        match self.entries.get_mut(&value) {
            Some((stored, _, _)) if stored.as_slice() != sequence => Err(Error::SequenceMismatch),
            Some((_, total, _)) => {
                *total += weight;
                Ok(())
            }
            None => {
                self.entries
                    .insert(value, (sequence.to_vec(), weight, self.next_stamp));
                self.next_stamp += 1;
                Ok(())
            }
        }
    }

    fn autocomplete(&self, prefix: &[Tok], limit: Option<usize>) -> Vec<(u8, Weight)> {
        let mut hits: Vec<(u8, Weight, u64)> = self
            .entries
            .iter()
            .filter(|(_, (sequence, _, _))| sequence.starts_with(prefix))
            .map(|(&value, &(_, weight, stamp))| (value, weight, stamp))
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.2.cmp(&b.2)));
        hits.truncate(limit.unwrap_or(usize::MAX));
        hits.into_iter().map(|(value, weight, _)| (value, weight)).collect()
    }

    fn remove(&mut self, prefix: &[Tok]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, (sequence, _, _)| !sequence.starts_with(prefix));
        before - self.entries.len()
    }
}

fn sequence_strategy() -> impl Strategy<Value = Vec<Tok>> + Clone {
    prop::collection::vec(any::<Tok>(), 0..=6)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let seq = sequence_strategy();
    let op = prop_oneof![
        50 => (0u8..24, 1u8..=4, seq.clone()).prop_map(|(v, w, s)| Op::Insert(v, w, s)),
        15 => seq.clone().prop_map(Op::Remove),
        35 => (seq.clone(), prop::option::of(1usize..=5)).prop_map(|(s, l)| Op::Query(s, l)),
    ];
    prop::collection::vec(op, 0..=300)
}

fn run_against_model<A: Autocompleter<Tok, u8>>(
    tree: &mut A,
    verify: impl Fn(&A) -> Vec<String>,
    ops: Vec<Op>,
) -> std::result::Result<(), TestCaseError> {
    let mut model = Model::default();
    for op in ops {
        match op {
            Op::Insert(value, weight, sequence) => {
                let weight = Weight::from(weight);
                let got = tree.insert(value, weight, &sequence);
                let expected = model.insert(value, weight, &sequence);
                prop_assert_eq!(got, expected);
            }
            Op::Remove(prefix) => {
                prop_assert_eq!(tree.remove(&prefix), model.remove(&prefix));
                prop_assert!(tree.autocomplete(&prefix, None).unwrap().is_empty());
            }
            Op::Query(prefix, limit) => {
                prop_assert_eq!(
                    tree.autocomplete(&prefix, limit).unwrap(),
                    model.autocomplete(&prefix, limit)
                );
            }
        }

        prop_assert_eq!(tree.len(), model.entries.len());
        let issues = verify(tree);
        prop_assert!(issues.is_empty(), "{:?}", issues);
    }

    prop_assert_eq!(tree.autocomplete(&[], None).unwrap(), model.autocomplete(&[], None));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_simple_matches_model(ops in ops_strategy()) {
        let mut tree: SimplePrefixTree<Tok, u8> = SimplePrefixTree::new();
        run_against_model(&mut tree, SimplePrefixTree::verify_integrity, ops)?;
    }

    #[test]
    fn prop_compressed_matches_model(ops in ops_strategy()) {
        let mut tree: CompressedPrefixTree<Tok, u8> = CompressedPrefixTree::new();
        run_against_model(&mut tree, CompressedPrefixTree::verify_integrity, ops)?;
    }

    #[test]
    fn prop_variants_agree(ops in ops_strategy()) {
        let mut simple: SimplePrefixTree<Tok, u8> = SimplePrefixTree::new();
        let mut compressed: CompressedPrefixTree<Tok, u8> = CompressedPrefixTree::new();
        for op in ops {
            match op {
                Op::Insert(value, weight, sequence) => {
                    let weight = Weight::from(weight);
                    prop_assert_eq!(
                        simple.insert(value, weight, &sequence),
                        compressed.insert(value, weight, &sequence)
                    );
                }
                Op::Remove(prefix) => {
                    prop_assert_eq!(simple.remove(&prefix), compressed.remove(&prefix));
                }
                Op::Query(prefix, limit) => {
                    prop_assert_eq!(
                        simple.autocomplete(&prefix, limit).unwrap(),
                        compressed.autocomplete(&prefix, limit).unwrap()
                    );
                }
            }
        }
        let (s, c) = (simple.stats(), compressed.stats());
        prop_assert_eq!(s.leaves, c.leaves);
        prop_assert!(c.internal_nodes <= s.internal_nodes);
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

const WORDS: [&str; 6] = ["a", "b", "ab", "abc", "abd", "ba"];

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn all_prefixes() -> Vec<Vec<char>> {
    let mut prefixes = vec![Vec::new()];
    for word in WORDS {
        let word = chars(word);
        for end in 1..=word.len() {
            prefixes.push(word[..end].to_vec());
        }
    }
    prefixes.push(chars("zz"));
    prefixes
}

#[test]
fn exhaustive_insert_order_small_set() {
    let mut shapes = Vec::new();
    for_each_permutation(&WORDS, |perm| {
        let mut tree: CompressedPrefixTree<char, &str> = CompressedPrefixTree::new();
        for (i, &word) in perm.iter().enumerate() {
            tree.insert(word, (i % 3 + 1) as Weight, &chars(word)).unwrap();
        }
        let issues = tree.verify_integrity();
        assert!(issues.is_empty(), "order {perm:?}: {issues:?}");
        assert_eq!(tree.len(), WORDS.len());

        // Weights depend on the order, so compare sets of values only.
        for prefix in all_prefixes() {
            let mut got: Vec<&str> = tree
                .autocomplete(&prefix, None)
                .unwrap()
                .into_iter()
                .map(|(v, _)| v)
                .collect();
            got.sort_unstable();
            let mut expected: Vec<&str> = WORDS
                .iter()
                .copied()
                .filter(|w| chars(w).starts_with(&prefix))
                .collect();
            expected.sort_unstable();
            assert_eq!(got, expected, "order {perm:?}, prefix {prefix:?}");
        }
        shapes.push(tree.stats());
    });

    // Path compression is canonical: the shape never depends on order.
    assert!(shapes.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn exhaustive_remove_order_small_set() {
    for_each_permutation(&WORDS, |perm| {
        let mut simple: SimplePrefixTree<char, &str> = SimplePrefixTree::new();
        let mut compressed: CompressedPrefixTree<char, &str> = CompressedPrefixTree::new();
        for word in WORDS {
            simple.insert(word, 1.0, &chars(word)).unwrap();
            compressed.insert(word, 1.0, &chars(word)).unwrap();
        }

        for word in perm {
            let prefix = chars(word);
            assert_eq!(simple.remove(&prefix), compressed.remove(&prefix));
            assert_eq!(simple.len(), compressed.len());
            assert!(simple.verify_integrity().is_empty());
            let issues = compressed.verify_integrity();
            assert!(issues.is_empty(), "after removing {word:?}: {issues:?}");
        }
        assert!(simple.is_empty());
        assert!(compressed.is_empty());
        assert_eq!(compressed.stats(), TreeStats::default());
    });
}
