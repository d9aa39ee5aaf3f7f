//! In-memory inverted index and the batch build pipeline.
//!
//! The index maps each term to its postings list (`doc_id -> term frequency`).
//! Both levels are `BTreeMap` so iteration and serialization are deterministic
//! regardless of the order documents were ingested in. Every build recomputes
//! term frequencies from scratch; nothing accumulates across builds.

use crate::corpus::Document;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type DocId = u32;

/// One entry per posting: document id mapped to the term's frequency in that
/// document. Keys are unique and iterate in ascending doc id order.
pub type PostingsList = BTreeMap<DocId, u32>;

/// Term -> postings list mapping.
///
/// Serializes transparently as `{term: {doc_id: tf}}`, which is exactly the
/// monolithic artifact layout (JSON object keys come out as numeric strings
/// and parse back to integers).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    postings: BTreeMap<String, PostingsList>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Total number of postings across all terms.
    pub fn posting_count(&self) -> usize {
        self.postings.values().map(BTreeMap::len).sum()
    }

    /// Count one occurrence of `term` in `doc_id`, starting at 1.
    pub fn add_occurrence(&mut self, term: String, doc_id: DocId) {
        *self.postings.entry(term).or_default().entry(doc_id).or_insert(0) += 1;
    }

    pub fn postings_for(&self, term: &str) -> Option<&PostingsList> {
        self.postings.get(term)
    }

    /// Term frequency of `term` in `doc_id`; 0 when either is absent.
    pub fn tf(&self, term: &str, doc_id: DocId) -> u32 {
        self.postings
            .get(term)
            .and_then(|postings| postings.get(&doc_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Iterate `(term, postings list)` pairs in ascending term order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PostingsList)> {
        self.postings.iter()
    }

    /// Flatten into `(term, doc_id, tf)` triples; the unit of cross-backend
    /// equivalence checks.
    pub fn entries(&self) -> impl Iterator<Item = (&str, DocId, u32)> {
        self.postings.iter().flat_map(|(term, postings)| {
            postings.iter().map(move |(doc, tf)| (term.as_str(), *doc, *tf))
        })
    }

    /// Key-wise union, summing frequencies for matching `(term, doc_id)`
    /// pairs. Associative and commutative, so partial indexes built over
    /// disjoint document sets can be merged in any order.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (term, postings) in other.postings {
            let target = self.postings.entry(term).or_default();
            for (doc_id, tf) in postings {
                *target.entry(doc_id).or_insert(0) += tf;
            }
        }
    }
}

impl From<BTreeMap<String, PostingsList>> for InvertedIndex {
    fn from(postings: BTreeMap<String, PostingsList>) -> Self {
        Self { postings }
    }
}

/// Result of one build pass: the index plus every document id that was
/// consumed, whether or not it produced any terms.
#[derive(Debug, Default)]
pub struct BuildOutput {
    pub index: InvertedIndex,
    pub processed: BTreeSet<DocId>,
}

fn ingest(index: &mut InvertedIndex, processed: &mut BTreeSet<DocId>, id: DocId, text: &str) {
    for term in tokenize(text) {
        index.add_occurrence(term, id);
    }
    processed.insert(id);
}

/// Build an inverted index over a document stream in a single batch pass.
///
/// Runs in time proportional to the total token count. The resulting index
/// content does not depend on enumeration order.
pub fn build_index<I>(documents: I) -> BuildOutput
where
    I: IntoIterator<Item = Document>,
{
    let mut out = BuildOutput::default();
    for doc in documents {
        ingest(&mut out.index, &mut out.processed, doc.id, &doc.text);
    }
    out
}

/// Tokenize disjoint document chunks on `jobs` worker threads, then merge the
/// partial indexes sequentially on the calling thread. No postings map is
/// ever touched by two threads.
pub fn build_index_parallel(documents: &[Document], jobs: usize) -> BuildOutput {
    if jobs <= 1 || documents.len() <= 1 {
        let mut out = BuildOutput::default();
        for doc in documents {
            ingest(&mut out.index, &mut out.processed, doc.id, &doc.text);
        }
        return out;
    }

    let chunk_size = documents.len().div_ceil(jobs);
    let mut partials: Vec<BuildOutput> = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = documents
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut partial = BuildOutput::default();
                    for doc in chunk {
                        ingest(&mut partial.index, &mut partial.processed, doc.id, &doc.text);
                    }
                    partial
                })
            })
            .collect();
        for handle in handles {
            partials.push(handle.join().expect("index worker panicked"));
        }
    });

    let mut out = BuildOutput::default();
    for partial in partials {
        out.index.merge(partial.index);
        out.processed.extend(partial.processed);
    }
    out
}
