//! Structured Boolean and ranked query evaluation over inverted indexes.
//!
//! `qrank` evaluates structured queries (`#AND`, `#OR`, `#SYN`, `#SUM`,
//! `#WAND`, `#WSUM`, `#NEAR/n`, `#WINDOW/n`) against a pre-built inverted
//! index and produces ranked document lists under one of four retrieval
//! models: unranked Boolean, ranked Boolean, BM25, or the Dirichlet-smoothed
//! language model (Indri). The language model additionally supports
//! pseudo-relevance-feedback query expansion.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐    ┌──────────────┐    ┌─────────────┐    ┌────────────┐
//! │ query::   │───▶│  query::Op   │───▶│ eval::      │───▶│ ScoreList  │
//! │ parse     │    │ (operator    │    │ EvalContext │    │ (ranked)   │
//! │           │    │  tree)       │    │ .evaluate   │    │            │
//! └───────────┘    └──────────────┘    └─────────────┘    └────────────┘
//!                                            │  ▲
//!                              PostingSource │  │ feedback::Feedback
//!                              DocLengths    ▼  │ (optional expansion
//!                            ┌────────────────┐ │  + re-evaluation)
//!                            │ index traits / │◀┘
//!                            │ MemoryIndex    │
//!                            └────────────────┘
//! ```
//!
//! The engine owns no index: postings, document lengths, and the query
//! tokenizer are collaborator traits ([`index`]) passed by reference into
//! every parse/evaluate call. [`MemoryIndex`] is the bundled in-memory
//! implementation used by the demo binary and the test suite.
//!
//! # Usage
//!
//! ```
//! use qrank::{EvalContext, MemoryIndex, RetrievalModel, SimpleAnalyzer};
//!
//! let corpus = r#"[
//!     {"external_id": "d1", "body": "obama family tree"},
//!     {"external_id": "d2", "body": "presidential family history"}
//! ]"#;
//! let index = MemoryIndex::from_json(corpus).unwrap();
//! let model = RetrievalModel::bm25_default();
//!
//! let tree = qrank::parse("family tree", &model, &SimpleAnalyzer::new()).unwrap();
//! let ranked = EvalContext::new(&index, &index, model).evaluate(&tree).unwrap();
//! assert_eq!(ranked.entries[0].doc_id, 0);
//! ```

pub mod analysis;
pub mod error;
pub mod eval;
pub mod feedback;
pub mod index;
pub mod memory;
pub mod model;
pub mod query;
pub mod types;

// Re-exports for the public API
pub use analysis::SimpleAnalyzer;
pub use error::{Error, Result};
pub use eval::EvalContext;
pub use feedback::{Expansion, Feedback, FeedbackParams};
pub use index::{DocLengths, PostingSource, QueryTokenizer, StemInfo};
pub use memory::{CorpusDoc, MemoryIndex};
pub use model::{RetrievalModel, TermStats};
pub use query::{parse, Op};
pub use types::{DocId, Field, InvertedList, Posting, ScoreEntry, ScoreList};
