//! Pluggable persistence strategies for the inverted index.
//!
//! Every strategy implements [`IndexStore`]: full-snapshot persist, full
//! loads, and loads of a missing artifact come back as an empty index so a
//! fresh deployment can serve before its first build. All three strategies
//! store the same logical `(term, doc_id, tf)` content.

mod docstore;
mod monolith;
mod partitioned;

pub use docstore::DocumentStore;
pub use monolith::MonolithStore;
pub use partitioned::PartitionedStore;

use crate::index::InvertedIndex;
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Subdirectory of the datamarts root used by each strategy.
pub const MONOLITH_DIR: &str = "inverted_index_monolith";
pub const PARTITIONED_DIR: &str = "inverted_index_fs";
pub const DOCSTORE_DIR: &str = "inverted_index_docstore";

pub trait IndexStore: Send + Sync {
    /// Replace whatever the backend holds with `index`. A crash mid-persist
    /// must leave the previous artifact readable. Returns a human-readable
    /// location descriptor for logs and manifests.
    fn persist(&self, index: &InvertedIndex) -> Result<String>;

    /// Read the full index back. A store that has never been persisted to
    /// loads as an empty index; a malformed artifact is an error.
    fn load(&self) -> Result<InvertedIndex>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Monolith,
    Partitioned,
    DocStore,
}

impl StoreKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreKind::Monolith => "monolith",
            StoreKind::Partitioned => "partitioned",
            StoreKind::DocStore => "docstore",
        }
    }

    /// Open this strategy's backend under its standard subdirectory of the
    /// datamarts root.
    pub fn open(self, datamarts: &Path) -> Result<Box<dyn IndexStore>> {
        Ok(match self {
            StoreKind::Monolith => Box::new(MonolithStore::new(datamarts.join(MONOLITH_DIR))),
            StoreKind::Partitioned => {
                Box::new(PartitionedStore::new(datamarts.join(PARTITIONED_DIR)))
            }
            StoreKind::DocStore => Box::new(DocumentStore::open(datamarts.join(DOCSTORE_DIR))?),
        })
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write a file via a temp sibling and rename, so a concurrent reader sees
/// either the old content or the new, never a torn write.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let name = path
        .file_name()
        .with_context(|| format!("not a writable file path: {}", path.display()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_file_name(format!("{}.tmp", name.to_string_lossy()));
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
