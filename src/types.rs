//! Core data model: fields, postings, inverted lists, score lists.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **POSTINGS_SORTED**: `InvertedList.postings` is strictly increasing by
//!    `doc_id` — no duplicates.
//! 2. **POSITIONS_SORTED**: `Posting.positions` is strictly increasing,
//!    1-based.
//! 3. **SCORELIST_ORDER**: after [`ScoreList::sort`], entries are descending
//!    by score with ties broken by ascending external document id. This is a
//!    total order; sorting twice is a no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Internal document identifier, dense and 0-based.
pub type DocId = usize;

/// The closed set of indexed fields a term can be matched against.
///
/// An unrecognized `term.suffix` in a query is *not* an error: the whole
/// token is reinterpreted as a term in the default field ([`Field::Body`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Url,
    Keywords,
    Title,
    Body,
    Inlink,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Url,
        Field::Keywords,
        Field::Title,
        Field::Body,
        Field::Inlink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Keywords => "keywords",
            Field::Title => "title",
            Field::Body => "body",
            Field::Inlink => "inlink",
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::Body
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ();

    /// Case-insensitive; `Err(())` means "not a recognized field".
    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(Field::Url),
            "keywords" => Ok(Field::Keywords),
            "title" => Ok(Field::Title),
            "body" => Ok(Field::Body),
            "inlink" => Ok(Field::Inlink),
            _ => Err(()),
        }
    }
}

/// All occurrences of one term in one document.
///
/// The term frequency is not stored separately: it is always
/// `positions.len()`, including for the virtual terms produced by `#SYN`,
/// `#NEAR/n` and `#WINDOW/n` (which record one position per match).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// 1-based term positions, strictly increasing.
    pub positions: Vec<usize>,
}

impl Posting {
    pub fn new(doc_id: DocId, positions: Vec<usize>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        Posting { doc_id, positions }
    }

    /// Term frequency within this document.
    pub fn tf(&self) -> usize {
        self.positions.len()
    }
}

/// All postings for one (term, field) pair, ordered by document id.
///
/// Produced fresh by a [`crate::index::PostingSource`] lookup (or by a
/// positional operator) and discarded after one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvertedList {
    pub field: Field,
    /// Collection term frequency: total occurrences across all documents.
    pub ctf: u64,
    /// Postings, strictly increasing by `doc_id`.
    pub postings: Vec<Posting>,
}

impl InvertedList {
    /// An empty list for an absent term. Absence is not an error.
    pub fn empty(field: Field) -> Self {
        InvertedList {
            field,
            ctf: 0,
            postings: Vec::new(),
        }
    }

    /// Document frequency: number of documents containing the term.
    pub fn df(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

/// One (document, score) result pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreEntry {
    pub doc_id: DocId,
    pub score: f64,
}

/// An ordered list of document scores.
///
/// Unordered on construction; [`ScoreList::sort`] establishes the final
/// ranking order (score descending, external id ascending on ties).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreList {
    pub entries: Vec<ScoreEntry>,
}

impl ScoreList {
    pub fn new() -> Self {
        ScoreList::default()
    }

    pub fn add(&mut self, doc_id: DocId, score: f64) {
        self.entries.push(ScoreEntry { doc_id, score });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreEntry> {
        self.entries.iter()
    }

    /// Sort into ranking order: score descending, ties broken by ascending
    /// external document id. `external` resolves an internal id to the
    /// collection's external identifier.
    ///
    /// The tie-break makes the order total and therefore deterministic:
    /// sorting an already-sorted list changes nothing.
    pub fn sort(&mut self, external: impl Fn(DocId) -> String) {
        self.entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| external(a.doc_id).cmp(&external(b.doc_id)))
        });
    }

    /// Keep only the `k` highest-ranked entries. Call after [`ScoreList::sort`].
    pub fn truncate(&mut self, k: usize) {
        self.entries.truncate(k);
    }
}

impl IntoIterator for ScoreList {
    type Item = ScoreEntry;
    type IntoIter = std::vec::IntoIter<ScoreEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
