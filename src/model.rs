//! Retrieval models and their scoring formulas.
//!
//! A closed set of variants, matched exhaustively at every evaluation site.
//! Each variant carries its own immutable parameter set; parameters are
//! read-only during evaluation.
//!
//! The Indri variant is the only one with a nonzero *default score*: under
//! Dirichlet smoothing every document has nonzero probability for every
//! term, so a document missing a term still contributes
//! `(1-λ)·μ·p_mle/(docLen+μ) + λ·p_mle` — the tf=0 case of the same formula.
//! Boolean and BM25 stay sparse: their default score is 0.

use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// The retrieval model in effect for one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrievalModel {
    UnrankedBoolean,
    RankedBoolean,
    Bm25 { k1: f64, b: f64, k3: f64 },
    Indri { mu: f64, lambda: f64 },
}

/// Everything the per-posting formulas need to know about one term in one
/// document. Collection-level numbers come from the posting source;
/// `doc_len` from the doc-length oracle.
#[derive(Debug, Clone, Copy)]
pub struct TermStats {
    pub tf: f64,
    pub df: f64,
    /// Maximum-likelihood estimate `ctf / totalCollectionTokens(field)`.
    pub p_mle: f64,
    pub doc_len: f64,
    pub avg_doc_len: f64,
    pub num_docs: f64,
}

impl RetrievalModel {
    /// BM25 with the usual starting parameters.
    pub fn bm25_default() -> Self {
        RetrievalModel::Bm25 {
            k1: 1.2,
            b: 0.75,
            k3: 0.0,
        }
    }

    /// Indri with the usual starting parameters.
    pub fn indri_default() -> Self {
        RetrievalModel::Indri {
            mu: 2500.0,
            lambda: 0.4,
        }
    }

    pub fn is_indri(&self) -> bool {
        matches!(self, RetrievalModel::Indri { .. })
    }

    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            RetrievalModel::UnrankedBoolean | RetrievalModel::RankedBoolean
        )
    }

    /// Set a named parameter. Unknown names are reported and ignored;
    /// existing parameters are left unchanged. Returns whether the
    /// parameter was recognized.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> bool {
        let recognized = match self {
            RetrievalModel::Bm25 { k1, b, k3 } => match name {
                "k_1" | "k1" => {
                    *k1 = value;
                    true
                }
                "b" => {
                    *b = value;
                    true
                }
                "k_3" | "k3" => {
                    *k3 = value;
                    true
                }
                _ => false,
            },
            RetrievalModel::Indri { mu, lambda } => match name {
                "mu" => {
                    *mu = value;
                    true
                }
                "lambda" => {
                    *lambda = value;
                    true
                }
                _ => false,
            },
            RetrievalModel::UnrankedBoolean | RetrievalModel::RankedBoolean => false,
        };
        if !recognized {
            warn!(model = %self, name, "unknown retrieval model parameter ignored");
        }
        recognized
    }

    /// Score one posting under this model.
    pub fn score_posting(&self, s: &TermStats) -> f64 {
        match *self {
            // Match means score 1.0, nothing else.
            RetrievalModel::UnrankedBoolean => 1.0,
            // Match means raw term frequency.
            RetrievalModel::RankedBoolean => s.tf,
            RetrievalModel::Bm25 { k1, b, k3 } => {
                let idf = ((s.num_docs - s.df + 0.5) / (s.df + 0.5)).ln().max(0.0);
                let tf_weight = s.tf / (s.tf + k1 * ((1.0 - b) + b * s.doc_len / s.avg_doc_len));
                // qtf = 1 for single-occurrence query terms.
                let qtf = 1.0;
                let user_weight = (k3 + 1.0) * qtf / (k3 + qtf);
                idf * tf_weight * user_weight
            }
            RetrievalModel::Indri { mu, lambda } => {
                (1.0 - lambda) * (s.tf + mu * s.p_mle) / (s.doc_len + mu) + lambda * s.p_mle
            }
        }
    }

    /// Score for a document that does *not* contain the term: the tf=0 case.
    /// Zero for every model except Indri.
    pub fn default_score(&self, p_mle: f64, doc_len: f64) -> f64 {
        match *self {
            RetrievalModel::Indri { mu, lambda } => {
                (1.0 - lambda) * mu * p_mle / (doc_len + mu) + lambda * p_mle
            }
            _ => 0.0,
        }
    }

    /// The operator an unstructured query is wrapped in: Boolean models take
    /// the union, the language model its geometric-mean `#AND`, BM25 its
    /// additive `#SUM`.
    pub fn default_operator(&self) -> &'static str {
        match self {
            RetrievalModel::UnrankedBoolean | RetrievalModel::RankedBoolean => "#OR",
            RetrievalModel::Indri { .. } => "#AND",
            RetrievalModel::Bm25 { .. } => "#SUM",
        }
    }
}

impl fmt::Display for RetrievalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetrievalModel::UnrankedBoolean => f.write_str("UnrankedBoolean"),
            RetrievalModel::RankedBoolean => f.write_str("RankedBoolean"),
            RetrievalModel::Bm25 { .. } => f.write_str("BM25"),
            RetrievalModel::Indri { .. } => f.write_str("Indri"),
        }
    }
}

impl FromStr for RetrievalModel {
    type Err = String;

    /// Model names as they appear in parameter files. Parameterized models
    /// start from their defaults; use [`RetrievalModel::set_parameter`] to
    /// adjust.
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "unrankedboolean" => Ok(RetrievalModel::UnrankedBoolean),
            "rankedboolean" => Ok(RetrievalModel::RankedBoolean),
            "bm25" => Ok(RetrievalModel::bm25_default()),
            "indri" => Ok(RetrievalModel::indri_default()),
            other => Err(format!("unknown retrieval model: {other}")),
        }
    }
}
