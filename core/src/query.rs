//! Boolean retrieval with term-frequency ranking.
//!
//! [`search`] is the pure algorithm over one index snapshot; [`SearchEngine`]
//! wraps it with swap-on-reload snapshot management so a long-running server
//! can pick up fresh builds without blocking in-flight queries.

use crate::index::{DocId, InvertedIndex};
use crate::store::IndexStore;
use crate::tokenizer::normalize_term;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryOp {
    #[default]
    And,
    Or,
}

impl QueryOp {
    /// Lenient parse for query parameters: `or` (any case) selects union,
    /// everything else intersection.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("or") {
            QueryOp::Or
        } else {
            QueryOp::And
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryOp::And => "and",
            QueryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    pub terms: Vec<String>,
    pub op: QueryOp,
    pub limit: usize,
}

impl Query {
    pub fn new<I, S>(terms: I, op: QueryOp) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            op,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub doc_id: DocId,
    /// Sum of the query terms' frequencies in this document.
    pub score: u64,
}

/// Run a query against one index snapshot.
///
/// Terms are normalized the same way indexed text was, matched as exact
/// terms, and combined by intersection (`And`) or union (`Or`). Hits are
/// ranked by descending score with ascending doc id breaking ties, then
/// truncated to `query.limit`. An empty term list matches nothing.
pub fn search(index: &InvertedIndex, query: &Query) -> Vec<SearchHit> {
    if query.terms.is_empty() {
        return Vec::new();
    }
    let terms: Vec<String> = query.terms.iter().map(|t| normalize_term(t)).collect();

    let sets: Vec<BTreeSet<DocId>> = terms
        .iter()
        .map(|term| {
            index
                .postings_for(term)
                .map(|postings| postings.keys().copied().collect())
                .unwrap_or_default()
        })
        .collect();

    let matched: BTreeSet<DocId> = match query.op {
        QueryOp::And => match sets.split_first() {
            Some((first, rest)) => rest.iter().fold(first.clone(), |acc, set| &acc & set),
            None => BTreeSet::new(),
        },
        QueryOp::Or => sets.iter().flatten().copied().collect(),
    };

    let mut hits: Vec<SearchHit> = matched
        .into_iter()
        .map(|doc_id| SearchHit {
            doc_id,
            score: terms.iter().map(|term| u64::from(index.tf(term, doc_id))).sum(),
        })
        .collect();
    hits.sort_by(|a, b| b.score.cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    hits.truncate(query.limit);
    hits
}

/// Holds the live index snapshot behind an `Arc` swap. Queries clone the
/// `Arc` and never hold the lock while searching, so a reload mid-query is
/// invisible to that query.
pub struct SearchEngine {
    snapshot: RwLock<Arc<InvertedIndex>>,
}

impl SearchEngine {
    pub fn new(index: InvertedIndex) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(index)),
        }
    }

    /// Load the initial snapshot from a store. A load failure degrades to an
    /// empty index rather than refusing to start.
    pub fn open(store: &dyn IndexStore) -> Self {
        Self::new(load_or_empty(store))
    }

    /// Replace the snapshot with a fresh load from the store. On failure the
    /// engine serves an empty index until the next successful reload.
    pub fn reload(&self, store: &dyn IndexStore) {
        let fresh = Arc::new(load_or_empty(store));
        *self.snapshot.write() = fresh;
    }

    pub fn snapshot(&self) -> Arc<InvertedIndex> {
        self.snapshot.read().clone()
    }

    pub fn search(&self, query: &Query) -> Vec<SearchHit> {
        search(&self.snapshot(), query)
    }
}

fn load_or_empty(store: &dyn IndexStore) -> InvertedIndex {
    match store.load() {
        Ok(index) => {
            tracing::info!(terms = index.term_count(), "index snapshot loaded");
            index
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load index, serving empty snapshot");
            InvertedIndex::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::index::build_index;

    fn two_book_index() -> InvertedIndex {
        build_index(vec![
            Document::new(1, "adventure sea"),
            Document::new(2, "adventure mountain"),
        ])
        .index
    }

    #[test]
    fn and_intersects_or_unions() {
        let index = two_book_index();
        let and = search(&index, &Query::new(["adventure", "sea"], QueryOp::And));
        assert_eq!(and.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![1]);

        let or = search(&index, &Query::new(["adventure", "sea"], QueryOp::Or));
        assert_eq!(or.iter().map(|h| h.doc_id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let index = two_book_index();
        assert!(search(&index, &Query::new(Vec::<String>::new(), QueryOp::Or)).is_empty());
    }

    #[test]
    fn engine_swaps_snapshots() {
        let engine = SearchEngine::new(two_book_index());
        let before = engine.snapshot();
        assert_eq!(engine.search(&Query::new(["sea"], QueryOp::And)).len(), 1);

        *engine.snapshot.write() = Arc::new(InvertedIndex::new());
        assert!(engine.search(&Query::new(["sea"], QueryOp::And)).is_empty());
        // the old snapshot is still intact for anyone holding it
        assert_eq!(before.tf("sea", 1), 1);
    }
}
