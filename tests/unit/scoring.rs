//! Exact-value scoring scenarios for BM25 and the language model.

use crate::common::{Identity, StubIndex};
use qrank::{parse, EvalContext, Field, RetrievalModel, ScoreEntry};

/// Three documents, field body, N = 3, avgDocLen = 10, one query term with
/// df = 2, tf = [3, _, 1], docLen = [8, 12, 10].
fn bm25_collection() -> StubIndex {
    StubIndex::new(3)
        .with_totals(Field::Body, 30, 3)
        .with_list("apple", Field::Body, &[(0, &[1, 2, 3]), (2, &[4])])
        .with_length(Field::Body, 0, 8)
        .with_length(Field::Body, 1, 12)
        .with_length(Field::Body, 2, 10)
}

fn scores_of(index: &StubIndex, model: RetrievalModel, query: &str) -> Vec<ScoreEntry> {
    let tree = parse(query, &model, &Identity).unwrap();
    let ctx = EvalContext::new(index, index, model);
    ctx.evaluate(&tree).unwrap().entries
}

#[test]
fn bm25_idf_clamps_to_zero_when_df_dominates() {
    // df = 2 of N = 3: raw idf = ln(1.5/2.5) < 0, so every score clamps
    // to exactly 0.
    let index = bm25_collection();
    let model = RetrievalModel::Bm25 {
        k1: 1.2,
        b: 0.75,
        k3: 0.0,
    };
    for entry in scores_of(&index, model, "apple") {
        assert!((entry.score - 0.0).abs() < 1e-6);
    }
}

#[test]
fn bm25_matches_the_formula_to_six_decimals() {
    // Same collection scaled to N = 10 so the idf term is positive.
    let index = StubIndex::new(10)
        .with_totals(Field::Body, 100, 10)
        .with_list("apple", Field::Body, &[(0, &[1, 2, 3]), (2, &[4])])
        .with_length(Field::Body, 0, 8)
        .with_length(Field::Body, 2, 10);
    let model = RetrievalModel::Bm25 {
        k1: 1.2,
        b: 0.75,
        k3: 0.0,
    };

    let (k1, b) = (1.2f64, 0.75f64);
    let idf = ((10.0f64 - 2.0 + 0.5) / (2.0 + 0.5)).ln();
    let expected_d0 = idf * 3.0 / (3.0 + k1 * ((1.0 - b) + b * 8.0 / 10.0));
    let expected_d2 = idf * 1.0 / (1.0 + k1 * ((1.0 - b) + b * 10.0 / 10.0));

    let entries = scores_of(&index, model, "apple");
    assert_eq!(entries.len(), 2);
    // d0 has the higher score, so it ranks first.
    assert_eq!(entries[0].doc_id, 0);
    assert!((entries[0].score - expected_d0).abs() < 1e-6);
    assert!((entries[1].score - expected_d2).abs() < 1e-6);
}

#[test]
fn indri_scores_matching_documents_with_dirichlet_smoothing() {
    // ctf = 50 over 100000 collection tokens: p_mle = 0.0005.
    let index = StubIndex::new(2)
        .with_totals(Field::Body, 100_000, 1000)
        .with_list("apple", Field::Body, &[(0, &[5, 9])])
        .with_length(Field::Body, 0, 80)
        .with_length(Field::Body, 1, 120);
    let model = RetrievalModel::Indri {
        mu: 1000.0,
        lambda: 0.4,
    };

    let p_mle = 50.0 / 100_000.0;
    let expected = 0.6 * (2.0 + 1000.0 * p_mle) / (80.0 + 1000.0) + 0.4 * p_mle;

    let entries = scores_of(&index, model, "apple");
    assert_eq!(entries.len(), 1);
    assert!((entries[0].score - expected).abs() < 1e-9);
}

#[test]
fn indri_default_score_is_the_tf_zero_case() {
    // A document missing one of two #AND terms takes the tf = 0 score for
    // it: (1-λ)·μ·p_mle/(docLen+μ) + λ·p_mle.
    let index = StubIndex::new(2)
        .with_totals(Field::Body, 100_000, 1000)
        .with_list("apple", Field::Body, &[(0, &[1]), (1, &[2])])
        .with_list("pie", Field::Body, &[(0, &[2])])
        .with_length(Field::Body, 0, 80)
        .with_length(Field::Body, 1, 120);
    let model = RetrievalModel::Indri {
        mu: 1000.0,
        lambda: 0.4,
    };

    let p_apple = 2.0f64 / 100_000.0;
    let p_pie = 1.0f64 / 100_000.0;
    let apple_d1 = 0.6 * (1.0 + 1000.0 * p_apple) / (120.0 + 1000.0) + 0.4 * p_apple;
    let pie_default_d1 = 0.6 * (1000.0 * p_pie) / (120.0 + 1000.0) + 0.4 * p_pie;
    let expected_d1 = (apple_d1 * pie_default_d1).sqrt();

    let entries = scores_of(&index, model, "apple pie");
    // Both documents appear: Dirichlet smoothing gives every document
    // nonzero probability for every term.
    assert_eq!(entries.len(), 2);
    let d1 = entries.iter().find(|e| e.doc_id == 1).unwrap();
    assert!((d1.score - expected_d1).abs() < 1e-9);
}

#[test]
fn default_score_formula_stands_alone() {
    let model = RetrievalModel::Indri {
        mu: 1000.0,
        lambda: 0.4,
    };
    let p_mle = 50.0 / 100_000.0;
    let expected = 0.6 * 1000.0 * p_mle / (200.0 + 1000.0) + 0.4 * p_mle;
    assert!((model.default_score(p_mle, 200.0) - expected).abs() < 1e-12);
}
