//! Text analysis: the default tokenizer shared by the in-memory index and
//! query parsing.
//!
//! Lowercase, split on non-alphanumerics, drop English stop words, stem with
//! the Snowball English stemmer. Queries and documents must go through the
//! same pipeline or query stems will never match indexed stems.

use crate::index::QueryTokenizer;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Minimal English stop list.
///
/// Stop words are dropped before positions are assigned, so `#NEAR/1(new york)`
/// matches "new *the* york" the same way the original collection pipeline
/// would after its own stop-word removal.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these",
    "they", "this", "to", "was", "will", "with",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Word boundary detection: checks if character is a word separator.
fn is_word_boundary(c: char) -> bool {
    !c.is_alphanumeric()
}

/// The default analyzer: lowercase → stop list → Snowball stem.
pub struct SimpleAnalyzer {
    stemmer: Stemmer,
}

impl SimpleAnalyzer {
    pub fn new() -> Self {
        SimpleAnalyzer {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Tokenize running text into normalized stems, in order.
    ///
    /// Stop words are removed *before* positions are assigned, so callers
    /// indexing the output can number the returned stems 1..=n directly.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(is_word_boundary)
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .filter(|w| !STOP_SET.contains(w.as_str()))
            .map(|w| self.stemmer.stem(&w).into_owned())
            .collect()
    }
}

impl Default for SimpleAnalyzer {
    fn default() -> Self {
        SimpleAnalyzer::new()
    }
}

impl QueryTokenizer for SimpleAnalyzer {
    fn normalize(&self, raw: &str) -> Vec<String> {
        self.tokenize(raw)
    }
}
