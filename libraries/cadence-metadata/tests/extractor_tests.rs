//! Integration tests for cache-first extraction


use cadence_artwork::CoverArtStore;
use cadence_core::{CadenceError, KeyValueStore};
use cadence_metadata::{strict_key, ExtractionSource, MetadataCache, MetadataExtractor};
use cadence_storage::MemoryKeyValueStore;
use std::sync::Arc;
use tempfile::TempDir;
use test_helpers::{FakeStorage, TextParser};

struct Fixture {
    storage: Arc<FakeStorage>,
    parser: Arc<TextParser>,
    kv: Arc<MemoryKeyValueStore>,
    extractor: MetadataExtractor,
    _covers_dir: TempDir,
}

fn fixture() -> Fixture {
    let storage = Arc::new(FakeStorage::default());
    let parser = Arc::new(TextParser::default());
    let kv = Arc::new(MemoryKeyValueStore::new());
    let covers_dir = tempfile::tempdir().unwrap();
    let covers = Arc::new(CoverArtStore::new(covers_dir.path(), 16).unwrap());

    let extractor = MetadataExtractor::new(
        storage.clone(),
        parser.clone(),
        MetadataCache::new(kv.clone()),
        covers,
    );

    Fixture {
        storage,
        parser,
        kv,
        extractor,
        _covers_dir: covers_dir,
    }
}

#[tokio::test]
async fn test_unchanged_file_hits_strict_cache() {
    let f = fixture();
    f.storage.put("/m/a.mp3", b"Alpha|Band|Record|1999|200", Some(100));

    let first = f.extractor.extract("/m/a.mp3").await.unwrap();
    assert_eq!(first.source, ExtractionSource::Parsed);
    assert_eq!(first.metadata.title.as_deref(), Some("Alpha"));
    assert_eq!(first.metadata.year, Some(1999));
    assert_eq!(first.metadata.modified_at, Some(100));

    let second = f.extractor.extract("/m/a.mp3").await.unwrap();
    assert_eq!(second.source, ExtractionSource::StrictCache);
    assert_eq!(second.metadata, first.metadata, "tag fields must be identical");
    assert_eq!(f.parser.calls(), 1);
    assert_eq!(f.storage.reads.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_changed_mtime_forces_reparse() {
    let f = fixture();
    f.storage.put("/m/a.mp3", b"Old|Band|Record|1999|200", Some(100));
    f.extractor.extract("/m/a.mp3").await.unwrap();

    f.storage.put("/m/a.mp3", b"New|Band|Record|1999|200", Some(101));
    let again = f.extractor.extract("/m/a.mp3").await.unwrap();

    assert_eq!(again.source, ExtractionSource::Parsed);
    assert_eq!(again.metadata.title.as_deref(), Some("New"));
    assert_eq!(f.parser.calls(), 2);
}

#[tokio::test]
async fn test_missing_mtime_uses_loose_cache() {
    let f = fixture();
    f.storage.put("content://doc/7", b"Seven|||2001|60", None);

    let first = f.extractor.extract("content://doc/7").await.unwrap();
    assert_eq!(first.source, ExtractionSource::Parsed);

    let second = f.extractor.extract("content://doc/7").await.unwrap();
    assert_eq!(second.source, ExtractionSource::LooseCache);
    assert!(second.from_cache());
    assert_eq!(f.parser.calls(), 1);
}

#[tokio::test]
async fn test_corrupt_cache_entry_is_reextracted_and_overwritten() {
    let f = fixture();
    f.storage.put("/m/a.mp3", b"Alpha|Band|Record|1999|200", Some(5));
    f.kv.set(&strict_key("/m/a.mp3", 5), "not json").await.unwrap();

    let extracted = f.extractor.extract("/m/a.mp3").await.unwrap();
    assert_eq!(extracted.source, ExtractionSource::Parsed);

    let raw = f.kv.get(&strict_key("/m/a.mp3", 5)).await.unwrap().unwrap();
    assert!(raw.contains("Alpha"));
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let f = fixture();
    let result = f.extractor.extract("/m/gone.mp3").await;
    assert!(matches!(result, Err(CadenceError::NotFound(_))));
}

#[tokio::test]
async fn test_parse_failure_names_the_uri() {
    let f = fixture();
    f.storage.put("/m/bad.mp3", b"garbage", Some(1));

    match f.extractor.extract("/m/bad.mp3").await {
        Err(CadenceError::ParseFailure { uri, .. }) => assert_eq!(uri, "/m/bad.mp3"),
        other => panic!("expected parse failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cover_is_shared_per_album() {
    let f = fixture();
    f.storage.put("/m/1.mp3", b"One|Band|Same Album|2000|10|JPEGDATA", Some(1));
    f.storage.put("/m/2.mp3", b"Two|Band|Same Album|2000|10|OTHERDATA", Some(1));

    let one = f.extractor.extract("/m/1.mp3").await.unwrap();
    let two = f.extractor.extract("/m/2.mp3").await.unwrap();

    let cover = one.metadata.cover_art.clone().unwrap();
    assert_eq!(two.metadata.cover_art.as_deref(), Some(cover.as_str()));
    assert_eq!(std::fs::read(&cover).unwrap(), b"JPEGDATA");
}

#[tokio::test]
async fn test_cached_lookup_never_reads_the_source() {
    let f = fixture();
    f.storage.put("/m/a.mp3", b"Alpha|Band|Record|1999|200", Some(100));

    assert!(f.extractor.cached("/m/a.mp3", Some(100)).await.unwrap().is_none());
    f.extractor.extract("/m/a.mp3").await.unwrap();

    let hit = f.extractor.cached("/m/a.mp3", Some(100)).await.unwrap().unwrap();
    assert_eq!(hit.title.as_deref(), Some("Alpha"));
    assert!(f.extractor.cached("/m/a.mp3", Some(101)).await.unwrap().is_none());
    assert!(f.extractor.cached("/m/a.mp3", None).await.unwrap().is_none());
    assert_eq!(f.storage.reads.load(std::sync::atomic::Ordering::SeqCst), 1);
}
