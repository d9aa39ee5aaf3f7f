//! Datalake corpus source.
//!
//! A corpus is any directory tree containing files named `<doc_id>_body.txt`,
//! where the leading integer is the document id. Harvest runs drop bodies
//! under dated subdirectories, but nothing here depends on that layout.

use crate::index::DocId;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Suffix that marks a file as document body text.
pub const BODY_SUFFIX: &str = "_body.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocId,
    pub text: String,
}

impl Document {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

/// Parse a document id from a file name's leading numeric prefix, e.g.
/// `1342_body.txt` -> `1342`. Returns `None` when the prefix before the first
/// underscore is not an integer.
pub fn doc_id_from_name(name: &str) -> Option<DocId> {
    name.split('_').next()?.parse().ok()
}

/// Read every conforming body file under `datalake`, in sorted path order.
///
/// Non-conforming names, unreadable files, and repeated document ids are
/// skipped with a log line; none of them fail the read. Body bytes are
/// decoded as UTF-8 with invalid sequences replaced. A missing root yields
/// an empty corpus.
pub fn read_corpus(datalake: &Path) -> Vec<Document> {
    if !datalake.exists() {
        tracing::info!(path = %datalake.display(), "datalake root missing, treating corpus as empty");
        return Vec::new();
    }

    let mut seen: HashSet<DocId> = HashSet::new();
    let mut documents = Vec::new();
    for entry in WalkDir::new(datalake)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !name.ends_with(BODY_SUFFIX) {
            continue;
        }
        let Some(id) = doc_id_from_name(name) else {
            tracing::debug!(file = name, "skipping body file without a numeric id prefix");
            continue;
        };
        if !seen.insert(id) {
            tracing::warn!(id, file = name, "skipping duplicate document id");
            continue;
        }
        let text = match fs::read(entry.path()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::warn!(file = name, error = %err, "skipping unreadable document");
                // a failed read should not burn the id
                seen.remove(&id);
                continue;
            }
        };
        documents.push(Document { id, text });
    }
    tracing::debug!(documents = documents.len(), "corpus read");
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_leading_id() {
        assert_eq!(doc_id_from_name("1342_body.txt"), Some(1342));
        assert_eq!(doc_id_from_name("12_34_body.txt"), Some(12));
        assert_eq!(doc_id_from_name("notes_body.txt"), None);
        assert_eq!(doc_id_from_name("_body.txt"), None);
    }

    #[test]
    fn reads_only_conforming_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("1_body.txt"), "call me ishmael").unwrap();
        fs::write(dir.path().join("1_header.txt"), "Title: Moby Dick").unwrap();
        fs::write(dir.path().join("two_body.txt"), "no id here").unwrap();
        fs::write(dir.path().join("readme.md"), "not a body").unwrap();

        let docs = read_corpus(dir.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, 1);
        assert_eq!(docs[0].text, "call me ishmael");
    }

    #[test]
    fn first_duplicate_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a").join("9_body.txt"), "first copy").unwrap();
        fs::write(dir.path().join("b").join("9_body.txt"), "second copy").unwrap();

        let docs = read_corpus(dir.path());
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, "first copy");
    }

    #[test]
    fn missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_corpus(&dir.path().join("nope")).is_empty());
    }
}
