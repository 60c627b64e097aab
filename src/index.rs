//! Collaborator traits: the seams between the evaluation engine and the
//! index it runs against.
//!
//! The engine never owns an index. It consumes three read-only oracles —
//! postings, document lengths, and the query tokenizer — passed explicitly
//! into every parse/evaluate call. No process-wide singletons: two
//! evaluations against two different indexes can coexist in one process.
//!
//! All three oracles must merely be safe for repeated sequential reads; the
//! engine is single-threaded and places no locking obligation on them.

use crate::types::{DocId, Field, InvertedList};

/// One stem of a document's term vector, as used by relevance feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StemInfo {
    pub stem: String,
    /// Term frequency of the stem in this document.
    pub tf: usize,
    /// Collection term frequency of the stem.
    pub ctf: u64,
}

/// Read-only access to per-term postings and collection statistics.
pub trait PostingSource {
    /// Postings for a (term, field) pair, ordered by document id.
    ///
    /// `None` means the term does not occur in that field. Callers treat it
    /// as an empty [`InvertedList`] (df = 0), never as a failure.
    fn postings(&self, term: &str, field: Field) -> Option<InvertedList>;

    /// Total number of token occurrences in a field across the collection.
    fn total_tokens(&self, field: Field) -> u64;

    /// Number of documents with at least one token in `field`.
    fn doc_count(&self, field: Field) -> u64;

    /// Number of documents in the collection.
    fn num_docs(&self) -> u64;

    /// The stems of one document in one field, with per-document and
    /// collection frequencies. Used by the relevance-feedback expander.
    fn term_vector(&self, doc_id: DocId, field: Field) -> Vec<StemInfo>;

    /// External (collection) identifier for an internal document id.
    fn external_id(&self, doc_id: DocId) -> Option<String>;

    /// Internal id for an external identifier, if the document exists.
    fn internal_id(&self, external: &str) -> Option<DocId>;
}

/// Read-only access to per-field document lengths.
pub trait DocLengths {
    /// Number of tokens document `doc_id` has in `field` (0 if none).
    fn doc_length(&self, field: Field, doc_id: DocId) -> u64;
}

/// Maps a raw query term to its normalized stems.
///
/// Zero stems means the term was a stop word and is silently dropped by the
/// parser; more than one stem makes the query malformed (the parser rejects
/// it). The analyzer used at index build time must implement the same
/// normalization, or query stems will not match indexed stems.
pub trait QueryTokenizer {
    fn normalize(&self, raw: &str) -> Vec<String>;
}
