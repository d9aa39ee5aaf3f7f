//! Bibliographic catalog: titles, authors, and languages keyed by doc id.
//!
//! Metadata comes from `<doc_id>_header.txt` files that harvest runs leave
//! next to each body. The catalog is optional everywhere it is consumed;
//! search works fine without it, hits just come back without titles.

use crate::corpus::doc_id_from_name;
use crate::index::DocId;
use crate::store::write_atomic;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix that marks a file as a document header.
pub const HEADER_SUFFIX: &str = "_header.txt";
pub const CATALOG_FILE: &str = "catalog.bin";

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?i)^\s*Title:\s*(.+)$").expect("valid regex");
    static ref AUTHOR_RE: Regex = Regex::new(r"(?i)^\s*Author:\s*(.+)$").expect("valid regex");
    static ref LANGUAGE_RE: Regex =
        Regex::new(r"(?i)^\s*Language:\s*(.+)$").expect("valid regex");
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMeta {
    pub title: Option<String>,
    pub author: Option<String>,
    pub language: Option<String>,
}

fn captured(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extract title, author, and language from raw header text. Only the first
/// match of each field counts, scanning stops once all three are found, and
/// absent fields stay `None`.
pub fn parse_header(text: &str) -> BookMeta {
    let mut meta = BookMeta::default();
    for line in text.lines() {
        if meta.title.is_none() {
            meta.title = captured(&TITLE_RE, line);
        }
        if meta.author.is_none() {
            meta.author = captured(&AUTHOR_RE, line);
        }
        if meta.language.is_none() {
            meta.language = captured(&LANGUAGE_RE, line);
        }
        if meta.title.is_some() && meta.author.is_some() && meta.language.is_some() {
            break;
        }
    }
    meta
}

/// Walk `datalake` for header files and parse each into the catalog map.
/// Unreadable or unparsable files are skipped with a log line.
pub fn scan_headers(datalake: &Path) -> BTreeMap<DocId, BookMeta> {
    let mut catalog = BTreeMap::new();
    if !datalake.exists() {
        tracing::info!(path = %datalake.display(), "datalake root missing, catalog will be empty");
        return catalog;
    }
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
        if !name.ends_with(HEADER_SUFFIX) {
            continue;
        }
        let Some(id) = doc_id_from_name(name) else {
            tracing::debug!(file = name, "skipping header file without a numeric id prefix");
            continue;
        };
        let text = match fs::read(entry.path()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::warn!(file = name, error = %err, "skipping unreadable header");
                continue;
            }
        };
        catalog.insert(id, parse_header(&text));
    }
    tracing::debug!(entries = catalog.len(), "headers scanned");
    catalog
}

pub fn catalog_path(datamarts: &Path) -> PathBuf {
    datamarts.join(CATALOG_FILE)
}

pub fn save_catalog(datamarts: &Path, catalog: &BTreeMap<DocId, BookMeta>) -> Result<()> {
    let path = catalog_path(datamarts);
    let bytes = bincode::serialize(catalog)?;
    write_atomic(&path, &bytes)?;
    tracing::info!(entries = catalog.len(), path = %path.display(), "wrote catalog");
    Ok(())
}

/// Load the catalog; a missing file is an empty catalog.
pub fn load_catalog(datamarts: &Path) -> Result<BTreeMap<DocId, BookMeta>> {
    let path = catalog_path(datamarts);
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let bytes = fs::read(&path)?;
    bincode::deserialize(&bytes)
        .with_context(|| format!("malformed catalog at {}", path.display()))
}
