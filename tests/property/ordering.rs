//! Ranking-order property tests.
//!
//! The final ranking contract: score descending, external id ascending on
//! ties, and sorting is idempotent.

use proptest::prelude::*;
use qrank::{ScoreEntry, ScoreList};

/// Scores drawn from a small integer set so ties actually happen.
fn entries() -> impl Strategy<Value = Vec<(usize, f64)>> {
    prop::collection::vec((0usize..50, (0u8..6).prop_map(f64::from)), 0..20)
}

fn external(doc: usize) -> String {
    format!("doc-{doc:05}")
}

fn build(list: &[(usize, f64)]) -> ScoreList {
    let mut scores = ScoreList::default();
    for &(doc, score) in list {
        scores.add(doc, score);
    }
    scores
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// After sorting, every adjacent pair is (score DESC, external id ASC).
    #[test]
    fn prop_ranking_order(list in entries()) {
        let mut scores = build(&list);
        scores.sort(external);

        for pair in scores.entries.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            prop_assert!(prev.score >= curr.score);
            if prev.score == curr.score {
                prop_assert!(external(prev.doc_id) <= external(curr.doc_id));
            }
        }
    }

    /// Sorting twice gives the same order as sorting once.
    #[test]
    fn prop_sort_is_idempotent(list in entries()) {
        let mut once = build(&list);
        once.sort(external);

        let mut twice = once.clone();
        twice.sort(external);
        prop_assert_eq!(once, twice);
    }

    /// Sorting permutes the entries: nothing is added, dropped, or rescored.
    #[test]
    fn prop_sort_preserves_entries(list in entries()) {
        let mut scores = build(&list);
        scores.sort(external);

        let mut before: Vec<ScoreEntry> = build(&list).entries;
        let mut after: Vec<ScoreEntry> = scores.entries;
        let key = |e: &ScoreEntry| (e.doc_id, e.score.to_bits());
        before.sort_by_key(key);
        after.sort_by_key(key);
        prop_assert_eq!(before, after);
    }
}
