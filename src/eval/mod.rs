//! Operator-tree evaluation.
//!
//! One recursive post-order walk: a node first evaluates its children, then
//! combines their results. Two structural categories exist:
//!
//! - positional operators (`Term`, `#SYN`, `#NEAR/n`, `#WINDOW/n`) produce
//!   inverted lists and may nest under each other;
//! - score-combination operators (`#AND`, `#OR`, `#SUM`, `#WAND`, `#WSUM`,
//!   `Score`) produce score lists. A positional child of a scoring operator
//!   is converted implicitly via the retrieval model's per-posting formula.
//!
//! The context is explicit: the posting source, the doc-length oracle, and
//! the retrieval model are passed into every call. No globals, no caches;
//! every lookup produces a fresh list that dies with the evaluation pass.

mod cursor;
mod merge;
mod positional;

use crate::error::{Error, Result};
use crate::index::{DocLengths, PostingSource};
use crate::model::{RetrievalModel, TermStats};
use crate::query::Op;
use crate::types::{DocId, InvertedList, ScoreList};
use merge::{and_boolean, or_merge, sum_merge, weighted, Combine, DefaultScore, Scored};
use tracing::debug;

/// Everything one evaluation pass needs, passed by reference.
pub struct EvalContext<'a> {
    pub source: &'a dyn PostingSource,
    pub lengths: &'a dyn DocLengths,
    pub model: RetrievalModel,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        source: &'a dyn PostingSource,
        lengths: &'a dyn DocLengths,
        model: RetrievalModel,
    ) -> Self {
        EvalContext {
            source,
            lengths,
            model,
        }
    }

    /// Evaluate a query tree to its final ranking: scores descending,
    /// ties broken by ascending external document id.
    pub fn evaluate(&self, op: &Op) -> Result<ScoreList> {
        let mut scores = self.scores_of(op)?.scores;
        scores.sort(|d| self.external(d));
        debug!(matches = scores.len(), "evaluated query");
        Ok(scores)
    }

    /// External id for tie-breaking; documents unknown to the source fall
    /// back to their numeric id.
    pub fn external(&self, doc: DocId) -> String {
        self.source
            .external_id(doc)
            .unwrap_or_else(|| doc.to_string())
    }

    /// Evaluate a node to scores (docid-ascending) plus its default-score
    /// recipe for enclosing weighted operators.
    fn scores_of(&self, op: &Op) -> Result<Scored> {
        match op {
            Op::Term { .. } | Op::Syn(_) | Op::Near { .. } | Op::Window { .. } => {
                let list = self.postings_of(op)?;
                Ok(self.score_postings(list))
            }
            Op::Score(child) => {
                if child.is_positional() {
                    let list = self.postings_of(child)?;
                    Ok(self.score_postings(list))
                } else {
                    self.scores_of(child)
                }
            }
            Op::And(children) if self.model.is_indri() => {
                // The language model's #AND is the uniform geometric mean,
                // with Dirichlet defaults for children that missed a doc.
                let scored = self.eval_children(children)?;
                let uniform = vec![1.0; scored.len()];
                let (scores, default) =
                    weighted(&scored, &uniform, Combine::GeoMean, &self.model, self.lengths);
                Ok(Scored { scores, default })
            }
            Op::And(children) => {
                let scored = self.eval_children(children)?;
                let unranked = self.model == RetrievalModel::UnrankedBoolean;
                Ok(Scored {
                    scores: and_boolean(&scored, unranked),
                    default: DefaultScore::Zero,
                })
            }
            Op::Or(children) => {
                let scored = self.eval_children(children)?;
                let unranked = self.model == RetrievalModel::UnrankedBoolean;
                Ok(Scored {
                    scores: or_merge(&scored, unranked),
                    default: DefaultScore::Zero,
                })
            }
            Op::Sum(children) => {
                let scored = self.eval_children(children)?;
                Ok(Scored {
                    scores: sum_merge(&scored),
                    default: DefaultScore::Zero,
                })
            }
            Op::Wand { weights, children } => {
                let scored = self.eval_children(children)?;
                let (scores, default) =
                    weighted(&scored, weights, Combine::GeoMean, &self.model, self.lengths);
                Ok(Scored { scores, default })
            }
            Op::Wsum { weights, children } => {
                let scored = self.eval_children(children)?;
                let (scores, default) =
                    weighted(&scored, weights, Combine::Arith, &self.model, self.lengths);
                Ok(Scored { scores, default })
            }
        }
    }

    fn eval_children(&self, children: &[Op]) -> Result<Vec<Scored>> {
        children.iter().map(|c| self.scores_of(c)).collect()
    }

    /// Evaluate a positional subtree to its inverted list.
    fn postings_of(&self, op: &Op) -> Result<InvertedList> {
        match op {
            Op::Term { stem, field } => Ok(self
                .source
                .postings(stem, *field)
                .unwrap_or_else(|| InvertedList::empty(*field))),
            Op::Syn(children) => {
                let lists = self.child_postings("#SYN", children)?;
                positional::synonym(&lists)
            }
            Op::Near { distance, children } => {
                let lists = self.child_postings("#NEAR", children)?;
                positional::proximity("#NEAR", &lists, *distance, true)
            }
            Op::Window { distance, children } => {
                let lists = self.child_postings("#WINDOW", children)?;
                positional::proximity("#WINDOW", &lists, *distance, false)
            }
            other => Err(Error::Eval(format!(
                "operator requires position-bearing arguments: {other}"
            ))),
        }
    }

    fn child_postings(&self, op_name: &str, children: &[Op]) -> Result<Vec<InvertedList>> {
        children
            .iter()
            .map(|c| {
                if c.is_positional() {
                    self.postings_of(c)
                } else {
                    Err(Error::Eval(format!(
                        "{op_name} argument produces scores, not positions: {c}"
                    )))
                }
            })
            .collect()
    }

    /// The Score operation: convert an inverted list into a score list with
    /// the active model's per-posting formula. The residual inverted list
    /// is dropped — downstream operators consume scores past this point.
    fn score_postings(&self, list: InvertedList) -> Scored {
        let field = list.field;
        let total = self.source.total_tokens(field) as f64;
        let p_mle = if total > 0.0 {
            list.ctf as f64 / total
        } else {
            0.0
        };
        let doc_count = self.source.doc_count(field) as f64;
        let avg_doc_len = if doc_count > 0.0 { total / doc_count } else { 0.0 };
        let df = list.df() as f64;
        let num_docs = self.source.num_docs() as f64;

        let mut scores = ScoreList::new();
        for posting in &list.postings {
            let stats = TermStats {
                tf: posting.tf() as f64,
                df,
                p_mle,
                doc_len: self.lengths.doc_length(field, posting.doc_id) as f64,
                avg_doc_len,
                num_docs,
            };
            scores.add(posting.doc_id, self.model.score_posting(&stats));
        }

        let default = if self.model.is_indri() {
            DefaultScore::Dirichlet { p_mle, field }
        } else {
            DefaultScore::Zero
        };
        Scored { scores, default }
    }
}
