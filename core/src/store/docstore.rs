//! Strategy 3: embedded document store.
//!
//! One sled tree (`inverted_index`) keyed by term, each value a JSON record
//! `{"term": ..., "postings": {"<doc_id>": tf}}`. Doc ids are stringified in
//! the record because they are JSON object keys; they parse back to integers
//! on load, so the string form never leaks past this module. Persist applies
//! one batch that upserts every current term and removes terms left over
//! from earlier builds, so readers see either the old index or the new one.

use super::IndexStore;
use crate::index::{DocId, InvertedIndex, PostingsList};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const TREE_NAME: &str = "inverted_index";

#[derive(Debug, Serialize, Deserialize)]
struct TermRecord {
    term: String,
    postings: BTreeMap<String, u32>,
}

pub struct DocumentStore {
    path: PathBuf,
    db: sled::Db,
    tree: sled::Tree,
}

impl DocumentStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let db = sled::open(&path)
            .with_context(|| format!("cannot open document store at {}", path.display()))?;
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self { path, db, tree })
    }
}

impl IndexStore for DocumentStore {
    fn persist(&self, index: &InvertedIndex) -> Result<String> {
        let mut batch = sled::Batch::default();
        let mut stale = 0usize;
        for item in self.tree.iter() {
            let (key, _) = item?;
            let keep = std::str::from_utf8(&key)
                .ok()
                .is_some_and(|term| index.postings_for(term).is_some());
            if !keep {
                batch.remove(key);
                stale += 1;
            }
        }
        for (term, postings) in index.iter() {
            let record = TermRecord {
                term: term.clone(),
                postings: postings
                    .iter()
                    .map(|(doc_id, tf)| (doc_id.to_string(), *tf))
                    .collect(),
            };
            batch.insert(term.as_bytes(), serde_json::to_vec(&record)?);
        }
        self.tree.apply_batch(batch)?;
        self.db.flush()?;
        tracing::info!(
            terms = index.term_count(),
            stale_removed = stale,
            path = %self.path.display(),
            "upserted document-store index"
        );
        Ok(format!("{}::{}", self.path.display(), TREE_NAME))
    }

    fn load(&self) -> Result<InvertedIndex> {
        let mut map: BTreeMap<String, PostingsList> = BTreeMap::new();
        for item in self.tree.iter() {
            let (_, value) = item?;
            let record: TermRecord = serde_json::from_slice(&value)
                .with_context(|| format!("malformed term record in {}", self.path.display()))?;
            let mut postings = PostingsList::new();
            for (doc, tf) in record.postings {
                let doc_id: DocId = doc.parse().with_context(|| {
                    format!("non-numeric doc id {doc:?} under term {:?}", record.term)
                })?;
                postings.insert(doc_id, tf);
            }
            map.insert(record.term, postings);
        }
        Ok(InvertedIndex::from(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::index::build_index;

    #[test]
    fn round_trips_through_string_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("docstore")).unwrap();
        let built = build_index(vec![
            Document::new(1342, "pride prejudice"),
            Document::new(2701, "whale pride"),
        ])
        .index;
        store.persist(&built).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, built);
        assert_eq!(loaded.tf("pride", 2701), 1);
    }

    #[test]
    fn repersist_removes_stale_terms() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("docstore")).unwrap();
        store
            .persist(&build_index(vec![Document::new(5, "obsolete lexicon")]).index)
            .unwrap();
        store
            .persist(&build_index(vec![Document::new(5, "fresh lexicon")]).index)
            .unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.postings_for("obsolete").is_none());
        assert_eq!(loaded.tf("fresh", 5), 1);
        assert_eq!(loaded.tf("lexicon", 5), 1);
    }

    #[test]
    fn empty_tree_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("docstore")).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
