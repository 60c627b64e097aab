//! Score-combination operators and default scoring.
//!
//! Everything here works on docid-ascending [`ScoreList`]s. The Boolean
//! `#AND` runs a cursor-based sorted-merge intersection; union-shaped
//! operators accumulate into a `BTreeMap`, which keeps outputs
//! docid-ordered and iteration deterministic.
//!
//! The language model needs a score for documents a child did *not* match
//! (Dirichlet smoothing gives every document nonzero probability for every
//! term). [`DefaultScore`] captures how to compute that per child — and
//! composes recursively, because a `#WAND` child of a `#WAND` has a
//! geometric-mean default of its own.

use super::cursor::intersect;
use crate::index::DocLengths;
use crate::model::RetrievalModel;
use crate::types::{DocId, Field, ScoreList};
use std::collections::BTreeMap;

/// How to score a document that a child operator did not match.
#[derive(Debug, Clone)]
pub(crate) enum DefaultScore {
    /// Sparse models: a miss scores zero.
    Zero,
    /// Dirichlet smoothing at tf = 0 for one term in one field.
    Dirichlet { p_mle: f64, field: Field },
    /// Weighted geometric mean of child defaults (weights pre-normalized).
    GeoMean(Vec<(f64, DefaultScore)>),
    /// Weighted arithmetic mean of child defaults (weights pre-normalized).
    Arith(Vec<(f64, DefaultScore)>),
}

impl DefaultScore {
    pub fn score(&self, model: &RetrievalModel, lengths: &dyn DocLengths, doc: DocId) -> f64 {
        match self {
            DefaultScore::Zero => 0.0,
            DefaultScore::Dirichlet { p_mle, field } => {
                model.default_score(*p_mle, lengths.doc_length(*field, doc) as f64)
            }
            DefaultScore::GeoMean(parts) => parts
                .iter()
                .map(|(w, d)| d.score(model, lengths, doc).powf(*w))
                .product(),
            DefaultScore::Arith(parts) => parts
                .iter()
                .map(|(w, d)| w * d.score(model, lengths, doc))
                .sum(),
        }
    }
}

/// One evaluated child of a score-combination operator: its matches in
/// docid order plus the recipe for scoring its misses.
pub(crate) struct Scored {
    pub scores: ScoreList,
    pub default: DefaultScore,
}

impl Scored {
    fn lookup(&self) -> BTreeMap<DocId, f64> {
        self.scores.iter().map(|e| (e.doc_id, e.score)).collect()
    }
}

/// Boolean `#AND`: sorted-merge intersection of the children's docid
/// sequences. Unranked scores 1.0; ranked keeps the weakest child's score.
pub(crate) fn and_boolean(children: &[Scored], unranked: bool) -> ScoreList {
    let lists: Vec<_> = children.iter().map(|c| c.scores.entries.as_slice()).collect();
    let mut result = ScoreList::new();
    intersect(&lists, |doc, row| {
        let score = if unranked {
            1.0
        } else {
            row.iter().map(|e| e.score).fold(f64::INFINITY, f64::min)
        };
        result.add(doc, score);
    });
    result
}

/// `#OR`: union of the children's documents. Unranked scores every member
/// 1.0; ranked keeps the maximum contributing score.
pub(crate) fn or_merge(children: &[Scored], unranked: bool) -> ScoreList {
    let mut union: BTreeMap<DocId, f64> = BTreeMap::new();
    for child in children {
        for entry in child.scores.iter() {
            let score = if unranked { 1.0 } else { entry.score };
            union
                .entry(entry.doc_id)
                .and_modify(|s| *s = s.max(score))
                .or_insert(score);
        }
    }
    collect(union)
}

/// `#SUM`: per-document sum over the union; documents missing from a child
/// take 0 from it.
pub(crate) fn sum_merge(children: &[Scored]) -> ScoreList {
    let mut union: BTreeMap<DocId, f64> = BTreeMap::new();
    for child in children {
        for entry in child.scores.iter() {
            *union.entry(entry.doc_id).or_insert(0.0) += entry.score;
        }
    }
    collect(union)
}

/// How `weighted` combines the per-child scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Combine {
    /// `Π child^(w/W)` — `#WAND` and the language model's `#AND`.
    GeoMean,
    /// `Σ (w/W)·child` — `#WSUM`.
    Arith,
}

/// Weighted combination over the union of the children's documents, with
/// default-score substitution for children that missed a document.
///
/// Weights are normalized by their sum, so `#WAND(1 a 1 b 1 c)` is the
/// uniform geometric mean. Also returns the combined [`DefaultScore`], so
/// the node can itself be a child of another weighted operator.
pub(crate) fn weighted(
    children: &[Scored],
    weights: &[f64],
    combine: Combine,
    model: &RetrievalModel,
    lengths: &dyn DocLengths,
) -> (ScoreList, DefaultScore) {
    let total: f64 = weights.iter().sum();
    let norm: Vec<f64> = if total > 0.0 {
        weights.iter().map(|w| w / total).collect()
    } else {
        weights.to_vec()
    };

    let lookups: Vec<BTreeMap<DocId, f64>> = children.iter().map(Scored::lookup).collect();
    let mut docs: std::collections::BTreeSet<DocId> = std::collections::BTreeSet::new();
    for lookup in &lookups {
        docs.extend(lookup.keys().copied());
    }

    let mut result = ScoreList::new();
    for doc in docs {
        let mut acc = match combine {
            Combine::GeoMean => 1.0,
            Combine::Arith => 0.0,
        };
        for ((child, lookup), w) in children.iter().zip(&lookups).zip(&norm) {
            let score = lookup
                .get(&doc)
                .copied()
                .unwrap_or_else(|| child.default.score(model, lengths, doc));
            match combine {
                Combine::GeoMean => acc *= score.powf(*w),
                Combine::Arith => acc += w * score,
            }
        }
        result.add(doc, acc);
    }

    let parts: Vec<(f64, DefaultScore)> = norm
        .iter()
        .zip(children)
        .map(|(w, c)| (*w, c.default.clone()))
        .collect();
    let default = match combine {
        Combine::GeoMean => DefaultScore::GeoMean(parts),
        Combine::Arith => DefaultScore::Arith(parts),
    };
    (result, default)
}

fn collect(union: BTreeMap<DocId, f64>) -> ScoreList {
    let mut result = ScoreList::new();
    for (doc, score) in union {
        result.add(doc, score);
    }
    result
}
