//! Shared fixtures: a hand-controllable posting source and tokenizers.
//!
//! Most tests want exact control over postings, positions, and collection
//! statistics, which a real analyzed corpus makes awkward. `StubIndex`
//! implements the collaborator traits over hand-built lists.

#![allow(dead_code)]

use qrank::{
    DocId, DocLengths, Field, InvertedList, Posting, PostingSource, QueryTokenizer, StemInfo,
};
use std::collections::{BTreeMap, HashMap};

/// A posting source built by hand, statistic by statistic.
#[derive(Default)]
pub struct StubIndex {
    lists: HashMap<(String, Field), InvertedList>,
    lengths: HashMap<(Field, DocId), u64>,
    totals: HashMap<Field, u64>,
    doc_counts: HashMap<Field, u64>,
    num_docs: u64,
    externals: Vec<String>,
}

#[allow(dead_code)]
impl StubIndex {
    pub fn new(num_docs: u64) -> Self {
        StubIndex {
            num_docs,
            externals: (0..num_docs).map(|d| format!("ext-{d:04}")).collect(),
            ..StubIndex::default()
        }
    }

    /// Add a posting list for `term` in `field` from (docid, positions)
    /// pairs. Collection term frequency is the summed position count.
    pub fn with_list(mut self, term: &str, field: Field, docs: &[(DocId, &[usize])]) -> Self {
        let mut list = InvertedList::empty(field);
        for &(doc, positions) in docs {
            list.ctf += positions.len() as u64;
            list.postings.push(Posting::new(doc, positions.to_vec()));
        }
        self.lists.insert((term.to_string(), field), list);
        self
    }

    pub fn with_length(mut self, field: Field, doc: DocId, len: u64) -> Self {
        self.lengths.insert((field, doc), len);
        self
    }

    pub fn with_totals(mut self, field: Field, tokens: u64, docs: u64) -> Self {
        self.totals.insert(field, tokens);
        self.doc_counts.insert(field, docs);
        self
    }
}

impl PostingSource for StubIndex {
    fn postings(&self, term: &str, field: Field) -> Option<InvertedList> {
        self.lists.get(&(term.to_string(), field)).cloned()
    }

    fn total_tokens(&self, field: Field) -> u64 {
        self.totals.get(&field).copied().unwrap_or(0)
    }

    fn doc_count(&self, field: Field) -> u64 {
        self.doc_counts.get(&field).copied().unwrap_or(0)
    }

    fn num_docs(&self) -> u64 {
        self.num_docs
    }

    fn term_vector(&self, doc_id: DocId, field: Field) -> Vec<StemInfo> {
        // Scan the stored lists; BTreeMap gives a deterministic order.
        let mut stems: BTreeMap<String, (usize, u64)> = BTreeMap::new();
        for ((term, f), list) in &self.lists {
            if *f != field {
                continue;
            }
            if let Some(p) = list.postings.iter().find(|p| p.doc_id == doc_id) {
                stems.insert(term.clone(), (p.tf(), list.ctf));
            }
        }
        stems
            .into_iter()
            .map(|(stem, (tf, ctf))| StemInfo { stem, tf, ctf })
            .collect()
    }

    fn external_id(&self, doc_id: DocId) -> Option<String> {
        self.externals.get(doc_id).cloned()
    }

    fn internal_id(&self, external: &str) -> Option<DocId> {
        self.externals.iter().position(|e| e == external)
    }
}

impl DocLengths for StubIndex {
    fn doc_length(&self, field: Field, doc_id: DocId) -> u64 {
        self.lengths.get(&(field, doc_id)).copied().unwrap_or(0)
    }
}

/// Tokenizer that lowercases and keeps every term: parser behavior can be
/// tested without stemming or stop-word surprises.
pub struct Identity;

impl QueryTokenizer for Identity {
    fn normalize(&self, raw: &str) -> Vec<String> {
        vec![raw.to_lowercase()]
    }
}

/// Tokenizer with a configurable stop list and no stemming.
pub struct WithStops(pub Vec<&'static str>);

impl QueryTokenizer for WithStops {
    fn normalize(&self, raw: &str) -> Vec<String> {
        let lower = raw.to_lowercase();
        if self.0.contains(&lower.as_str()) {
            Vec::new()
        } else {
            vec![lower]
        }
    }
}
