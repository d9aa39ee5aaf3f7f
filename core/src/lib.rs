//! Core library for gutensearch: tokenization, inverted-index construction,
//! pluggable index persistence, and boolean/ranked retrieval.
//!
//! The pipeline reads a datalake of harvested book texts, builds a fresh
//! term -> postings index in memory, persists it through one of three
//! interchangeable backends (monolithic JSON, partitioned files, embedded
//! document store), records the processed ids in a control ledger, and
//! serves queries from an atomically swappable snapshot.

pub mod catalog;
pub mod corpus;
pub mod index;
pub mod ledger;
pub mod query;
pub mod store;
pub mod tokenizer;

pub use catalog::BookMeta;
pub use corpus::{read_corpus, Document};
pub use index::{build_index, build_index_parallel, BuildOutput, DocId, InvertedIndex, PostingsList};
pub use ledger::ControlLedger;
pub use query::{Query, QueryOp, SearchEngine, SearchHit, DEFAULT_LIMIT};
pub use store::{IndexStore, StoreKind};
pub use tokenizer::{normalize_term, tokenize};
