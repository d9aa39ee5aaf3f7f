//! The three persistence strategies must store the same logical content:
//! loading any backend after persisting the same build yields identical
//! `(term, doc_id, tf)` triples.

use gutensearch_core::corpus::Document;
use gutensearch_core::index::{build_index, InvertedIndex};
use gutensearch_core::store::{
    DocumentStore, IndexStore, MonolithStore, PartitionedStore, StoreKind,
};
use std::fs;

fn sample_index() -> InvertedIndex {
    build_index(vec![
        Document::new(1342, "It is a truth universally acknowledged"),
        Document::new(2701, "Call me Ishmael, some years ago"),
        Document::new(84, "You will rejoice to hear that no disaster"),
    ])
    .index
}

#[test]
fn all_backends_agree_on_content() {
    let dir = tempfile::tempdir().unwrap();
    let built = sample_index();

    let mono = MonolithStore::new(dir.path().join("mono"));
    let part = PartitionedStore::new(dir.path().join("part"));
    let docs = DocumentStore::open(dir.path().join("docs")).unwrap();

    mono.persist(&built).unwrap();
    part.persist(&built).unwrap();
    docs.persist(&built).unwrap();

    let from_mono = mono.load().unwrap();
    let from_part = part.load().unwrap();
    let from_docs = docs.load().unwrap();

    assert_eq!(from_mono, built);
    assert_eq!(from_part, from_mono);
    assert_eq!(from_docs, from_mono);
}

#[test]
fn store_kinds_open_under_standard_subdirs() {
    let dir = tempfile::tempdir().unwrap();
    let built = sample_index();
    for kind in [StoreKind::Monolith, StoreKind::Partitioned, StoreKind::DocStore] {
        let store = kind.open(dir.path()).unwrap();
        store.persist(&built).unwrap();
        assert_eq!(store.load().unwrap(), built, "backend {kind}");
    }
    assert!(dir
        .path()
        .join("inverted_index_monolith")
        .join("index.json")
        .exists());
    assert!(dir.path().join("inverted_index_fs").exists());
    assert!(dir.path().join("inverted_index_docstore").exists());
}

#[test]
fn empty_index_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    for kind in [StoreKind::Monolith, StoreKind::Partitioned, StoreKind::DocStore] {
        let store = kind.open(dir.path()).unwrap();
        store.persist(&InvertedIndex::new()).unwrap();
        assert!(store.load().unwrap().is_empty(), "backend {kind}");
    }
}

#[test]
fn monolith_bytes_are_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let store = MonolithStore::new(dir.path().join("mono"));
    store.persist(&sample_index()).unwrap();
    let first = fs::read(store.index_path()).unwrap();
    store.persist(&sample_index()).unwrap();
    let second = fs::read(store.index_path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn persist_descriptor_names_a_location() {
    let dir = tempfile::tempdir().unwrap();
    let store = MonolithStore::new(dir.path().join("mono"));
    let location = store.persist(&sample_index()).unwrap();
    assert!(location.ends_with("index.json"));
}
