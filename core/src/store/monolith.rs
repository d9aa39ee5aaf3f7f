//! Strategy 1: the whole index as one JSON file.
//!
//! Simplest possible artifact, `index.json` under the store root, shaped as
//! `{term: {doc_id: tf}}`. Good for small corpora and for eyeballing what a
//! build produced.

use super::{write_atomic, IndexStore};
use crate::index::InvertedIndex;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub const INDEX_FILE: &str = "index.json";

pub struct MonolithStore {
    root: PathBuf,
}

impl MonolithStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }
}

impl IndexStore for MonolithStore {
    fn persist(&self, index: &InvertedIndex) -> Result<String> {
        let path = self.index_path();
        let bytes = serde_json::to_vec(index)?;
        write_atomic(&path, &bytes)?;
        tracing::info!(terms = index.term_count(), path = %path.display(), "wrote monolithic index");
        Ok(path.display().to_string())
    }

    fn load(&self) -> Result<InvertedIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(InvertedIndex::new());
        }
        let bytes = fs::read(&path)?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("malformed monolithic index at {}", path.display()))
    }
}
