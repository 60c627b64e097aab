//! Merge-operator property tests.
//!
//! The set-level contracts of the combination operators:
//! - `#AND` produces exactly the intersection of its operands' documents
//! - `#OR` produces exactly the union, scored by the maximum operand score
//! - operand order never changes the result
//! - widening a `#NEAR`/`#WINDOW` distance never loses a matching document

use crate::common::{Identity, StubIndex};
use proptest::prelude::*;
use qrank::{parse, EvalContext, Field, RetrievalModel};
use std::collections::{BTreeMap, BTreeSet};

const NUM_DOCS: usize = 8;

/// Random postings for one term: docid → strictly increasing positions.
fn term_postings() -> impl Strategy<Value = BTreeMap<usize, BTreeSet<usize>>> {
    prop::collection::btree_map(
        0..NUM_DOCS,
        prop::collection::btree_set(1usize..30, 1..5),
        0..6,
    )
}

fn build_index(terms: &[(&str, &BTreeMap<usize, BTreeSet<usize>>)]) -> StubIndex {
    let mut index = StubIndex::new(NUM_DOCS as u64).with_totals(Field::Body, 400, NUM_DOCS as u64);
    for &(name, postings) in terms {
        let docs: Vec<(usize, Vec<usize>)> = postings
            .iter()
            .map(|(&doc, positions)| (doc, positions.iter().copied().collect()))
            .collect();
        let rows: Vec<(usize, &[usize])> =
            docs.iter().map(|(d, p)| (*d, p.as_slice())).collect();
        index = index.with_list(name, Field::Body, &rows);
    }
    for doc in 0..NUM_DOCS {
        index = index.with_length(Field::Body, doc, 50);
    }
    index
}

fn doc_set(index: &StubIndex, query: &str) -> BTreeSet<usize> {
    let model = RetrievalModel::RankedBoolean;
    let tree = parse(query, &model, &Identity).unwrap();
    let ranked = EvalContext::new(index, index, model).evaluate(&tree).unwrap();
    ranked.iter().map(|e| e.doc_id).collect()
}

fn doc_scores(index: &StubIndex, query: &str) -> BTreeMap<usize, f64> {
    let model = RetrievalModel::RankedBoolean;
    let tree = parse(query, &model, &Identity).unwrap();
    let ranked = EvalContext::new(index, index, model).evaluate(&tree).unwrap();
    ranked.iter().map(|e| (e.doc_id, e.score)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `#AND` matches exactly the documents every operand matches, and the
    /// ranked score is the minimum operand term frequency.
    #[test]
    fn prop_and_is_intersection(a in term_postings(), b in term_postings()) {
        let index = build_index(&[("alpha", &a), ("beta", &b)]);

        let expected: BTreeSet<usize> = a
            .keys()
            .filter(|doc| b.contains_key(doc))
            .copied()
            .collect();
        prop_assert_eq!(doc_set(&index, "#AND(alpha beta)"), expected);

        for (doc, score) in doc_scores(&index, "#AND(alpha beta)") {
            let min_tf = a[&doc].len().min(b[&doc].len()) as f64;
            prop_assert_eq!(score, min_tf);
        }
    }

    /// `#OR` matches the union, scored by the maximum operand frequency.
    #[test]
    fn prop_or_is_union_with_max(a in term_postings(), b in term_postings()) {
        let index = build_index(&[("alpha", &a), ("beta", &b)]);

        let expected: BTreeSet<usize> = a.keys().chain(b.keys()).copied().collect();
        prop_assert_eq!(doc_set(&index, "#OR(alpha beta)"), expected);

        for (doc, score) in doc_scores(&index, "#OR(alpha beta)") {
            let tf_a = a.get(&doc).map_or(0, BTreeSet::len);
            let tf_b = b.get(&doc).map_or(0, BTreeSet::len);
            prop_assert_eq!(score, tf_a.max(tf_b) as f64);
        }
    }

    /// Operand order is irrelevant for every combination operator.
    #[test]
    fn prop_operand_order_is_irrelevant(a in term_postings(), b in term_postings()) {
        let index = build_index(&[("alpha", &a), ("beta", &b)]);

        for op in ["AND", "OR", "SUM"] {
            let forward = doc_scores(&index, &format!("#{op}(alpha beta)"));
            let reversed = doc_scores(&index, &format!("#{op}(beta alpha)"));
            prop_assert_eq!(forward, reversed, "#{} is order sensitive", op);
        }
    }

    /// Every document matched at distance `d` is still matched at `d + 1`.
    #[test]
    fn prop_proximity_distance_is_monotone(
        a in term_postings(),
        b in term_postings(),
        distance in 1usize..8,
    ) {
        let index = build_index(&[("alpha", &a), ("beta", &b)]);

        let near_tight = doc_set(&index, &format!("#NEAR/{distance}(alpha beta)"));
        let near_loose = doc_set(&index, &format!("#NEAR/{}(alpha beta)", distance + 1));
        prop_assert!(near_tight.is_subset(&near_loose));

        let win_tight = doc_set(&index, &format!("#WINDOW/{distance}(alpha beta)"));
        let win_loose = doc_set(&index, &format!("#WINDOW/{}(alpha beta)", distance + 1));
        prop_assert!(win_tight.is_subset(&win_loose));
    }

    /// `#NEAR` never matches a document `#WINDOW` of the same width rejects:
    /// an ordered chain within the distance also fits in the window once the
    /// strict/inclusive bound difference is accounted for.
    #[test]
    fn prop_near_implies_window(a in term_postings(), b in term_postings(), distance in 1usize..8) {
        let index = build_index(&[("alpha", &a), ("beta", &b)]);

        let near = doc_set(&index, &format!("#NEAR/{distance}(alpha beta)"));
        let window = doc_set(&index, &format!("#WINDOW/{}(alpha beta)", distance + 1));
        prop_assert!(near.is_subset(&window));
    }
}
