//! Tests for the image store.

use pictor_error::{PictorErrorKind, StorageErrorKind};
use pictor_storage::{IMAGE_EXTENSION, ImageStore};
use tempfile::TempDir;

fn write_source(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_persist_moves_bytes_into_store() {
    let store_dir = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let store = ImageStore::new(store_dir.path()).unwrap();

    let source = write_source(&scratch, "generated.tmp", b"RIFF fake webp bytes");
    let stored = store.persist_from_local_file(&source).await.unwrap();

    assert!(!source.exists(), "source should be consumed");
    assert_eq!(stored.parent().unwrap(), store_dir.path());
    assert_eq!(
        stored.extension().and_then(|e| e.to_str()),
        Some(IMAGE_EXTENSION)
    );
    assert_eq!(std::fs::read(&stored).unwrap(), b"RIFF fake webp bytes");

    let stem = stored.file_stem().unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(stem).is_ok());
}

#[tokio::test]
async fn test_persist_issues_distinct_names() {
    let store_dir = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let store = ImageStore::new(store_dir.path()).unwrap();

    let first = store
        .persist_from_local_file(write_source(&scratch, "a.tmp", b"one"))
        .await
        .unwrap();
    let second = store
        .persist_from_local_file(write_source(&scratch, "b.tmp", b"two"))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(std::fs::read_dir(store_dir.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn test_persist_missing_source_is_not_found() {
    let store_dir = TempDir::new().unwrap();
    let store = ImageStore::new(store_dir.path()).unwrap();

    let err = store
        .persist_from_local_file(store_dir.path().join("nope.webp"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(std::fs::read_dir(store_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_copy_keeps_source() {
    let base = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let root = base.path().join("images");
    let store = ImageStore::new(&root).unwrap();

    // Destination directory disappears underneath the store.
    std::fs::remove_dir(&root).unwrap();

    let source = write_source(&scratch, "generated.tmp", b"keep me");
    let err = store.persist_from_local_file(&source).await.unwrap_err();

    assert!(!err.is_not_found());
    assert!(matches!(
        err.kind(),
        PictorErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::FileWrite(_))
    ));
    assert_eq!(std::fs::read(&source).unwrap(), b"keep me");
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let store_dir = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let store = ImageStore::new(store_dir.path()).unwrap();

    let stored = store
        .persist_from_local_file(write_source(&scratch, "a.tmp", b"bytes"))
        .await
        .unwrap();
    let filename = stored.file_name().unwrap().to_str().unwrap().to_string();

    assert!(store.exists(&filename).await.unwrap());
    store.delete(&filename).await.unwrap();
    assert!(!stored.exists());
    assert!(!store.exists(&filename).await.unwrap());

    // Second delete of the same image is a no-op.
    store.delete(&filename).await.unwrap();
}

#[tokio::test]
async fn test_locate_missing_image_is_not_found() {
    let store_dir = TempDir::new().unwrap();
    let store = ImageStore::new(store_dir.path()).unwrap();

    let err = store.locate("missing.webp").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rejects_traversal_filenames() {
    let store_dir = TempDir::new().unwrap();
    let store = ImageStore::new(store_dir.path()).unwrap();

    let err = store.delete("../outside.webp").await.unwrap_err();
    assert!(matches!(
        err.kind(),
        PictorErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::InvalidPath(_))
    ));
}
