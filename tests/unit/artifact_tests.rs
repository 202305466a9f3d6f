// Artifact store tests against the real filesystem

use bytes::Bytes;
use pixelguard::artifact::{ArtifactError, ArtifactRole, ArtifactStore, Sweeper};
use pixelguard::config::StorageConfig;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn storage_config(dir: &TempDir) -> StorageConfig {
    StorageConfig {
        temp_dir: dir.path().join("artifacts"),
        expiry_secs: 3600,
        sweep_interval_secs: 60,
    }
}

fn two_hours_later() -> SystemTime {
    SystemTime::now() + Duration::from_secs(7200)
}

#[tokio::test]
async fn test_open_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let config = storage_config(&dir);
    assert!(!config.temp_dir.exists());

    let store = ArtifactStore::open(&config).await.unwrap();
    assert!(store.dir().is_dir());

    // opening again is fine
    ArtifactStore::open(&config).await.unwrap();
}

#[tokio::test]
async fn test_store_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();

    let original = store
        .store(Bytes::from_static(b"raw upload"), ArtifactRole::Original, "../My Photo.JPG")
        .await
        .unwrap();
    let processed = store
        .store(Bytes::from_static(b"protected"), ArtifactRole::Processed, "My Photo.protected.jpg")
        .await
        .unwrap();

    assert_eq!(original.path.parent(), Some(store.dir()));
    let name = original.file_name().unwrap();
    assert!(name.starts_with(&format!("original-{}-", original.id)));
    assert!(name.ends_with("My_Photo.JPG"));
    assert!(processed.file_name().unwrap().starts_with("processed-"));
    assert_ne!(original.id, processed.id);

    assert_eq!(store.load(&original).await.unwrap(), Bytes::from_static(b"raw upload"));
    assert_eq!(std::fs::read(&processed.path).unwrap(), b"protected");
}

#[tokio::test]
async fn test_same_name_never_collides() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();

    let mut paths = std::collections::HashSet::new();
    for _ in 0..20 {
        let artifact = store
            .store(Bytes::from_static(b"x"), ArtifactRole::Original, "same.png")
            .await
            .unwrap();
        assert!(paths.insert(artifact.path));
    }
    assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 20);
}

#[tokio::test]
async fn test_sweep_keeps_fresh_artifacts() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();
    let artifact = store
        .store(Bytes::from_static(b"x"), ArtifactRole::Original, "a.png")
        .await
        .unwrap();

    let report = store.sweep_once().await;
    assert_eq!(report.scanned, 1);
    assert_eq!(report.retained, 1);
    assert_eq!(report.deleted, 0);
    assert!(artifact.path.exists());
}

#[tokio::test]
async fn test_sweep_twice_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();
    for name in ["a.png", "b.jpg", "c.png"] {
        store
            .store(Bytes::from_static(b"x"), ArtifactRole::Processed, name)
            .await
            .unwrap();
    }

    let now = two_hours_later();
    let first = store.sweep_at(now).await;
    assert_eq!(first.deleted, 3);
    assert_eq!(first.errors, 0);

    let second = store.sweep_at(now).await;
    assert_eq!(second.deleted, 0);
    assert_eq!(second.errors, 0);
    assert_eq!(second.scanned, 0);
}

#[tokio::test]
async fn test_sweep_continues_past_undeletable_entry() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();
    std::fs::create_dir(store.dir().join("not-a-file")).unwrap();
    let artifact = store
        .store(Bytes::from_static(b"x"), ArtifactRole::Original, "a.png")
        .await
        .unwrap();

    let report = store.sweep_at(two_hours_later()).await;
    assert_eq!(report.scanned, 2);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.errors, 1);
    assert!(!artifact.path.exists());
}

#[tokio::test]
async fn test_load_after_sweep_is_not_found() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();
    let artifact = store
        .store(Bytes::from_static(b"x"), ArtifactRole::Original, "a.png")
        .await
        .unwrap();
    store.sweep_at(two_hours_later()).await;

    let err = store.load(&artifact).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, ArtifactError::NotFound(_)));
}

#[tokio::test]
async fn test_sweep_of_missing_directory_reports_error() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(&storage_config(&dir)).await.unwrap();
    std::fs::remove_dir(store.dir()).unwrap();

    let report = store.sweep_once().await;
    assert_eq!(report.errors, 1);
    assert_eq!(report.scanned, 0);
}

#[tokio::test]
async fn test_sweeper_starts_and_stops() {
    let dir = TempDir::new().unwrap();
    let config = storage_config(&dir);
    let store = ArtifactStore::open(&config).await.unwrap();
    store
        .store(Bytes::from_static(b"x"), ArtifactRole::Original, "a.png")
        .await
        .unwrap();

    let sweeper = Sweeper::start(store, config.sweep_interval()).await;
    assert_eq!(sweeper.startup_report().scanned, 1);
    assert_eq!(sweeper.startup_report().retained, 1);
    assert_eq!(sweeper.completed_sweeps(), 1);

    sweeper.stop().await;
}
