//! Parse → print → reparse property tests.
//!
//! `Op`'s `Display` emits the same structured syntax the parser consumes.
//! Printing a parsed tree and parsing it again must rank every document
//! identically (the reparse adds one more default-operator wrapper, which
//! is score-neutral for a single child).

use crate::common::{Identity, StubIndex};
use proptest::prelude::*;
use qrank::{parse, EvalContext, Field, RetrievalModel};

const VOCAB: [&str; 5] = ["apple", "pie", "crust", "cherry", "tart"];

fn orchard_index() -> StubIndex {
    StubIndex::new(4)
        .with_totals(Field::Body, 500, 4)
        .with_list("apple", Field::Body, &[(0, &[1, 7]), (2, &[2, 5]), (3, &[4])])
        .with_list("pie", Field::Body, &[(0, &[2]), (1, &[1, 6]), (3, &[5])])
        .with_list("crust", Field::Body, &[(0, &[3]), (2, &[9])])
        .with_list("cherry", Field::Body, &[(1, &[2]), (3, &[1, 2])])
        .with_list("tart", Field::Body, &[(1, &[3])])
        .with_length(Field::Body, 0, 8)
        .with_length(Field::Body, 1, 7)
        .with_length(Field::Body, 2, 10)
        .with_length(Field::Body, 3, 6)
}

fn leaf() -> impl Strategy<Value = String> {
    prop::sample::select(VOCAB.to_vec()).prop_map(str::to_string)
}

/// A postings-producing subquery: a term or a positional operator over terms.
fn positional() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => leaf(),
        1 => (leaf(), leaf()).prop_map(|(a, b)| format!("#SYN({a} {b})")),
        1 => (1usize..6, leaf(), leaf()).prop_map(|(d, a, b)| format!("#NEAR/{d}({a} {b})")),
        1 => (2usize..7, leaf(), leaf()).prop_map(|(d, a, b)| format!("#WINDOW/{d}({a} {b})")),
    ]
}

fn query() -> impl Strategy<Value = String> {
    let plain = (
        prop::sample::select(vec!["#AND", "#OR", "#SUM"]),
        prop::collection::vec(positional(), 2..4),
    )
        .prop_map(|(op, args)| format!("{op}({})", args.join(" ")));
    let weighted = (
        prop::sample::select(vec!["#WAND", "#WSUM"]),
        prop::collection::vec(
            (prop::sample::select(vec![0.25, 0.5, 1.0, 2.0]), positional()),
            2..4,
        ),
    )
        .prop_map(|(op, args)| {
            let body: Vec<String> = args.iter().map(|(w, a)| format!("{w} {a}")).collect();
            format!("{op}({})", body.join(" "))
        });
    prop_oneof![2 => plain, 1 => weighted]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// The printed form of a parsed tree reparses into the original tree
    /// under one more default-operator wrapper.
    #[test]
    fn prop_display_reparses_structurally(q in query()) {
        let model = RetrievalModel::RankedBoolean;
        let tree = parse(&q, &model, &Identity).unwrap();
        let reparsed = parse(&tree.to_string(), &model, &Identity).unwrap();
        prop_assert_eq!(reparsed, qrank::Op::Or(vec![tree]));
    }

    /// Printing and reparsing never changes a single document's score.
    #[test]
    fn prop_display_is_score_neutral(q in query()) {
        let index = orchard_index();
        for model in [RetrievalModel::RankedBoolean, RetrievalModel::bm25_default()] {
            let ctx = EvalContext::new(&index, &index, model);
            let tree = parse(&q, &model, &Identity).unwrap();
            let reparsed = parse(&tree.to_string(), &model, &Identity).unwrap();

            let direct = ctx.evaluate(&tree).unwrap();
            let via_display = ctx.evaluate(&reparsed).unwrap();
            prop_assert_eq!(direct, via_display);
        }
    }
}
