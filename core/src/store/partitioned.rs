//! Strategy 2: partitioned file hierarchy, one file per term.
//!
//! Layout under the store root is `<first char of term>/<term>.txt`, each
//! file holding one `doc_id tf` pair per line in ascending doc id order.
//! Terms can be inspected or diffed with ordinary shell tools. Persist
//! builds the tree in a staging directory and swaps it in with a rename so
//! a crash never leaves a half-written mixture of two builds.

use super::IndexStore;
use crate::index::{DocId, InvertedIndex, PostingsList};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use walkdir::WalkDir;

const TERM_EXT: &str = "txt";

pub struct PartitionedStore {
    root: PathBuf,
}

impl PartitionedStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn staging_path(&self) -> Result<PathBuf> {
        let name = self
            .root
            .file_name()
            .with_context(|| format!("not a usable store root: {}", self.root.display()))?;
        Ok(self
            .root
            .with_file_name(format!("{}.tmp", name.to_string_lossy())))
    }
}

impl IndexStore for PartitionedStore {
    fn persist(&self, index: &InvertedIndex) -> Result<String> {
        let staging = self.staging_path()?;
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        fs::create_dir_all(&staging)?;

        for (term, postings) in index.iter() {
            let Some(first) = term.chars().next() else {
                continue;
            };
            let bucket = staging.join(first.to_string());
            fs::create_dir_all(&bucket)?;
            let mut body = String::new();
            for (doc_id, tf) in postings {
                body.push_str(&format!("{doc_id} {tf}\n"));
            }
            fs::write(bucket.join(format!("{term}.{TERM_EXT}")), body)?;
        }

        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::rename(&staging, &self.root)?;
        tracing::info!(terms = index.term_count(), path = %self.root.display(), "wrote partitioned index");
        Ok(self.root.display().to_string())
    }

    fn load(&self) -> Result<InvertedIndex> {
        if !self.root.exists() {
            return Ok(InvertedIndex::new());
        }
        let mut map: BTreeMap<String, PostingsList> = BTreeMap::new();
        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TERM_EXT) {
                continue;
            }
            let term = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            let text = fs::read_to_string(path)?;
            let postings = map.entry(term).or_default();
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let mut parts = line.split_whitespace();
                let (Some(doc), Some(tf), None) = (parts.next(), parts.next(), parts.next())
                else {
                    bail!("malformed posting line {line:?} in {}", path.display());
                };
                let doc_id: DocId = doc
                    .parse()
                    .with_context(|| format!("bad doc id in {}", path.display()))?;
                let tf: u32 = tf
                    .parse()
                    .with_context(|| format!("bad frequency in {}", path.display()))?;
                postings.insert(doc_id, tf);
            }
        }
        Ok(InvertedIndex::from(map))
    }
}
