//! In-memory index: the collaborator implementation used by the demo binary
//! and the test suite.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **POSTINGS_SORTED**: posting lists are built in document order, so
//!    they are strictly increasing by doc id.
//! 2. **CTF_CONSISTENT**: `ctf` of every stored list equals the sum of its
//!    postings' term frequencies.
//! 3. **IDS_BIJECTIVE**: `external_id` and `internal_id` are inverses over
//!    the indexed documents.
//!
//! A production on-disk index is out of scope; anything implementing the
//! traits in [`crate::index`] can replace this one without touching the
//! evaluation engine.

use crate::analysis::SimpleAnalyzer;
use crate::index::{DocLengths, PostingSource, QueryTokenizer, StemInfo};
use crate::types::{DocId, Field, InvertedList, Posting};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One document of the JSON corpus format.
///
/// Absent fields index as empty. `external_id` is the collection identifier
/// used in rankings and tie-breaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusDoc {
    pub external_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub inlink: String,
}

impl CorpusDoc {
    fn field_text(&self, field: Field) -> &str {
        match field {
            Field::Url => &self.url,
            Field::Keywords => &self.keywords,
            Field::Title => &self.title,
            Field::Body => &self.body,
            Field::Inlink => &self.inlink,
        }
    }
}

/// A fully built, in-memory inverted index over a small corpus.
pub struct MemoryIndex {
    /// field → stem → posting list.
    terms: HashMap<Field, HashMap<String, InvertedList>>,
    /// field → per-document stem frequencies, indexed by doc id.
    /// BTreeMap keys give term vectors a deterministic order.
    doc_stems: HashMap<Field, Vec<BTreeMap<String, usize>>>,
    /// field → per-document token counts, indexed by doc id.
    lengths: HashMap<Field, Vec<u64>>,
    externals: Vec<String>,
    internals: HashMap<String, DocId>,
}

impl MemoryIndex {
    /// Index a corpus with the default analyzer.
    pub fn from_docs(docs: &[CorpusDoc]) -> Self {
        Self::build(docs, &SimpleAnalyzer::new())
    }

    /// Parse a JSON array of [`CorpusDoc`] and index it.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let docs: Vec<CorpusDoc> = serde_json::from_str(json)?;
        Ok(Self::from_docs(&docs))
    }

    /// Index a corpus, analyzing every field of every document.
    ///
    /// Positions are 1-based and assigned after stop-word removal, matching
    /// what the analyzer reports for query terms.
    pub fn build(docs: &[CorpusDoc], analyzer: &SimpleAnalyzer) -> Self {
        let mut terms: HashMap<Field, HashMap<String, InvertedList>> = HashMap::new();
        let mut doc_stems: HashMap<Field, Vec<BTreeMap<String, usize>>> = HashMap::new();
        let mut lengths: HashMap<Field, Vec<u64>> = HashMap::new();
        let mut externals = Vec::with_capacity(docs.len());
        let mut internals = HashMap::with_capacity(docs.len());

        for field in Field::ALL {
            terms.insert(field, HashMap::new());
            doc_stems.insert(field, vec![BTreeMap::new(); docs.len()]);
            lengths.insert(field, vec![0; docs.len()]);
        }

        for (doc_id, doc) in docs.iter().enumerate() {
            externals.push(doc.external_id.clone());
            internals.insert(doc.external_id.clone(), doc_id);

            for field in Field::ALL {
                let stems = analyzer.tokenize(doc.field_text(field));
                lengths.get_mut(&field).expect("field seeded")[doc_id] = stems.len() as u64;

                let freqs = &mut doc_stems.get_mut(&field).expect("field seeded")[doc_id];
                let lists = terms.get_mut(&field).expect("field seeded");
                for (i, stem) in stems.iter().enumerate() {
                    *freqs.entry(stem.clone()).or_insert(0) += 1;
                    let list = lists
                        .entry(stem.clone())
                        .or_insert_with(|| InvertedList::empty(field));
                    list.ctf += 1;
                    match list.postings.last_mut() {
                        Some(p) if p.doc_id == doc_id => p.positions.push(i + 1),
                        _ => list.postings.push(Posting::new(doc_id, vec![i + 1])),
                    }
                }
            }
        }

        MemoryIndex {
            terms,
            doc_stems,
            lengths,
            externals,
            internals,
        }
    }

    /// Vocabulary size of one field.
    pub fn vocab_size(&self, field: Field) -> usize {
        self.terms.get(&field).map_or(0, HashMap::len)
    }
}

impl PostingSource for MemoryIndex {
    fn postings(&self, term: &str, field: Field) -> Option<InvertedList> {
        self.terms.get(&field)?.get(term).cloned()
    }

    fn total_tokens(&self, field: Field) -> u64 {
        self.lengths.get(&field).map_or(0, |l| l.iter().sum())
    }

    fn doc_count(&self, field: Field) -> u64 {
        self.lengths
            .get(&field)
            .map_or(0, |l| l.iter().filter(|&&n| n > 0).count() as u64)
    }

    fn num_docs(&self) -> u64 {
        self.externals.len() as u64
    }

    fn term_vector(&self, doc_id: DocId, field: Field) -> Vec<StemInfo> {
        let Some(per_doc) = self.doc_stems.get(&field) else {
            return Vec::new();
        };
        let Some(freqs) = per_doc.get(doc_id) else {
            return Vec::new();
        };
        let lists = &self.terms[&field];
        freqs
            .iter()
            .map(|(stem, &tf)| StemInfo {
                stem: stem.clone(),
                tf,
                ctf: lists.get(stem).map_or(0, |l| l.ctf),
            })
            .collect()
    }

    fn external_id(&self, doc_id: DocId) -> Option<String> {
        self.externals.get(doc_id).cloned()
    }

    fn internal_id(&self, external: &str) -> Option<DocId> {
        self.internals.get(external).copied()
    }
}

impl DocLengths for MemoryIndex {
    fn doc_length(&self, field: Field, doc_id: DocId) -> u64 {
        self.lengths
            .get(&field)
            .and_then(|l| l.get(doc_id))
            .copied()
            .unwrap_or(0)
    }
}
