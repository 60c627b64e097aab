//! Indri pseudo-relevance feedback.
//!
//! Expansion uses the top-ranked documents of an initial retrieval (or a
//! supplied initial ranking) as implicit relevance judgments: every stem
//! seen in *any* of those documents is scored against *every* document in
//! the set — Dirichlet-smoothed, so absence contributes the tf = 0 term —
//! and the heaviest stems become a `#WAND` expansion query blended with the
//! original via `#WAND(w #AND(q) 1-w expansion)`.
//!
//! Only the language model supports this: the accumulation formula is the
//! smoothed query likelihood. Construction fails up front for any other
//! retrieval model, before query processing begins.

use crate::error::{Error, Result};
use crate::eval::EvalContext;
use crate::model::RetrievalModel;
use crate::query::Op;
use crate::types::{DocId, Field, ScoreList};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Feedback configuration.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackParams {
    /// Number of top-ranked documents to mine for expansion terms.
    pub fb_docs: usize,
    /// Number of expansion terms to keep.
    pub fb_terms: usize,
    /// Dirichlet prior for the expansion-term probabilities.
    pub fb_mu: f64,
    /// Weight of the original query in the combined tree; the expansion
    /// query gets `1 - fb_orig_weight`.
    pub fb_orig_weight: f64,
}

/// What [`Feedback::expand`] produces: the final ranking plus both query
/// trees, so callers can log or persist the expansion.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub scores: ScoreList,
    pub expansion: Op,
    pub combined: Op,
}

/// The relevance-feedback expander for one query set.
#[derive(Debug)]
pub struct Feedback {
    params: FeedbackParams,
    /// query id → ordered (external id, score) pairs, already capped at
    /// `fb_docs` per query.
    initial_rankings: Option<HashMap<String, Vec<(String, f64)>>>,
}

impl Feedback {
    /// Fails with [`Error::IllegalState`] unless `model` is the language
    /// model — checked here, before any query runs.
    pub fn new(params: FeedbackParams, model: &RetrievalModel) -> Result<Self> {
        if !model.is_indri() {
            return Err(Error::IllegalState(
                "relevance feedback requires the Indri retrieval model",
            ));
        }
        Ok(Feedback {
            params,
            initial_rankings: None,
        })
    }

    /// Use a precomputed initial ranking instead of evaluating the original
    /// query for the seed documents.
    pub fn with_initial_rankings(mut self, rankings: HashMap<String, Vec<(String, f64)>>) -> Self {
        self.initial_rankings = Some(rankings);
        self
    }

    /// Parse ranking lines of the form
    /// `<queryId> Q0 <externalId> <rank> <score> <run>`, keeping the first
    /// `fb_docs` lines per query id. Malformed lines are reported and
    /// skipped.
    pub fn parse_initial_rankings(
        text: &str,
        fb_docs: usize,
    ) -> HashMap<String, Vec<(String, f64)>> {
        let mut rankings: HashMap<String, Vec<(String, f64)>> = HashMap::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let parsed = match fields.as_slice() {
                [qid, _, ext, _, score, ..] => {
                    score.parse::<f64>().ok().map(|s| (*qid, *ext, s))
                }
                _ => None,
            };
            let Some((qid, ext, score)) = parsed else {
                warn!(line, "skipping malformed ranking line");
                continue;
            };
            let entry = rankings.entry(qid.to_string()).or_default();
            if entry.len() < fb_docs {
                entry.push((ext.to_string(), score));
            }
        }
        rankings
    }

    /// Expand and re-evaluate one query.
    pub fn expand(&self, tree: &Op, query_id: &str, ctx: &EvalContext) -> Result<Expansion> {
        let seeds = self.seed_documents(tree, query_id, ctx)?;
        let expansion = self.expansion_query(&seeds, ctx);
        debug!(query_id, seeds = seeds.len(), %expansion, "expansion query");

        let w = self.params.fb_orig_weight;
        let combined = Op::Wand {
            weights: vec![w, 1.0 - w],
            children: vec![Op::And(vec![tree.clone()]), expansion.clone()],
        };
        let scores = ctx.evaluate(&combined)?;
        Ok(Expansion {
            scores,
            expansion,
            combined,
        })
    }

    /// The seed set: up to `fb_docs` (docid, importance) pairs from the
    /// initial ranking if one was supplied, otherwise from evaluating the
    /// original query.
    fn seed_documents(
        &self,
        tree: &Op,
        query_id: &str,
        ctx: &EvalContext,
    ) -> Result<Vec<(DocId, f64)>> {
        if let Some(rankings) = &self.initial_rankings {
            let ranking = rankings.get(query_id).ok_or_else(|| {
                Error::Eval(format!("no initial ranking for query {query_id}"))
            })?;
            return ranking
                .iter()
                .take(self.params.fb_docs)
                .map(|(external, score)| {
                    ctx.source
                        .internal_id(external)
                        .map(|doc| (doc, *score))
                        .ok_or_else(|| Error::ExternalIdNotFound(external.clone()))
                })
                .collect();
        }

        let initial = ctx.evaluate(tree)?;
        Ok(initial
            .iter()
            .take(self.params.fb_docs)
            .map(|e| (e.doc_id, e.score))
            .collect())
    }

    /// Accumulate `Σ_d p(t|d) · importance(d) · idf(t)` over the seed set
    /// and keep the heaviest `fb_terms` stems.
    fn expansion_query(&self, seeds: &[(DocId, f64)], ctx: &EvalContext) -> Op {
        let field = Field::Body;
        let collection_len = ctx.source.total_tokens(field) as f64;

        // Pass one: the candidate vocabulary with collection frequencies.
        let mut ctfs: BTreeMap<String, u64> = BTreeMap::new();
        for &(doc, _) in seeds {
            for info in ctx.source.term_vector(doc, field) {
                ctfs.entry(info.stem).or_insert(info.ctf);
            }
        }

        // Pass two: every candidate stem is scored against every seed
        // document, absent stems with tf = 0.
        let mut weights: BTreeMap<String, f64> = BTreeMap::new();
        for &(doc, importance) in seeds {
            let doc_len = ctx.lengths.doc_length(field, doc) as f64;
            let tfs: HashMap<String, usize> = ctx
                .source
                .term_vector(doc, field)
                .into_iter()
                .map(|info| (info.stem, info.tf))
                .collect();
            for (stem, &ctf) in &ctfs {
                let tf = tfs.get(stem).copied().unwrap_or(0) as f64;
                let p_mle = ctf as f64 / collection_len;
                let p_t_d = (tf + self.params.fb_mu * p_mle) / (doc_len + self.params.fb_mu);
                let idf = (collection_len / ctf as f64).ln();
                *weights.entry(stem.clone()).or_insert(0.0) += p_t_d * importance * idf;
            }
        }

        // Deterministic top-k: weight descending, stem ascending on ties.
        let mut ranked: Vec<(String, f64)> = weights.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(self.params.fb_terms);

        let (stems, term_weights): (Vec<_>, Vec<_>) = ranked.into_iter().unzip();
        Op::Wand {
            weights: term_weights,
            children: stems
                .into_iter()
                .map(|stem| Op::Term { stem, field })
                .collect(),
        }
    }
}
