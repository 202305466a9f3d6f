//! In-memory artifact backend for tests

use super::backend::{ArtifactBackend, RemoveOutcome};
use super::error::ArtifactError;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug, Clone)]
struct MemoryFile {
    data: Bytes,
    modified: SystemTime,
}

/// Backend that keeps files in a HashMap, with settable modification times
/// and per-path failure injection.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    files: Arc<RwLock<HashMap<PathBuf, MemoryFile>>>,
    directories: Arc<RwLock<HashSet<PathBuf>>>,
    failing_stat: Arc<RwLock<HashSet<PathBuf>>>,
    failing_delete: Arc<RwLock<HashSet<PathBuf>>>,
    /// Paths that are listed but vanish before they can be stat'ed
    phantom: Arc<RwLock<HashSet<PathBuf>>>,
}

fn simulated(kind: std::io::ErrorKind, what: &str) -> ArtifactError {
    ArtifactError::Io(std::io::Error::new(kind, format!("Simulated {}", what)))
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file directly, bypassing the no-overwrite rule.
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Bytes>, modified: SystemTime) {
        self.files.write().insert(
            path.into(),
            MemoryFile {
                data: data.into(),
                modified,
            },
        );
    }

    pub fn set_modified(&self, path: &Path, modified: SystemTime) -> bool {
        match self.files.write().get_mut(path) {
            Some(file) => {
                file.modified = modified;
                true
            }
            None => false,
        }
    }

    /// Make `modified` fail with PermissionDenied for this path.
    pub fn fail_stat(&self, path: impl Into<PathBuf>) {
        self.failing_stat.write().insert(path.into());
    }

    /// Make `remove_file` fail with PermissionDenied for this path.
    pub fn fail_delete(&self, path: impl Into<PathBuf>) {
        self.failing_delete.write().insert(path.into());
    }

    /// List `path` without backing data, as if it was deleted concurrently.
    pub fn add_phantom(&self, path: impl Into<PathBuf>) {
        self.phantom.write().insert(path.into());
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.read().contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.read().len()
    }

    pub fn has_directory(&self, path: &Path) -> bool {
        self.directories.read().contains(path)
    }
}

#[async_trait]
impl ArtifactBackend for MemoryBackend {
    async fn create_dir_all(&self, path: &Path) -> Result<(), ArtifactError> {
        self.directories.write().insert(path.to_path_buf());
        Ok(())
    }

    async fn write_new(&self, path: &Path, data: Bytes) -> Result<(), ArtifactError> {
        let mut files = self.files.write();
        if files.contains_key(path) {
            return Err(ArtifactError::AlreadyExists(path.to_path_buf()));
        }
        files.insert(
            path.to_path_buf(),
            MemoryFile {
                data,
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes, ArtifactError> {
        self.files
            .read()
            .get(path)
            .map(|f| f.data.clone())
            .ok_or_else(|| ArtifactError::NotFound(path.to_path_buf()))
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
        let mut entries: Vec<PathBuf> = self
            .files
            .read()
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect();
        entries.extend(
            self.phantom
                .read()
                .iter()
                .filter(|p| p.parent() == Some(path))
                .cloned(),
        );
        entries.sort();
        Ok(entries)
    }

    async fn modified(&self, path: &Path) -> Result<SystemTime, ArtifactError> {
        if self.failing_stat.read().contains(path) {
            return Err(simulated(std::io::ErrorKind::PermissionDenied, "stat failure"));
        }
        self.files
            .read()
            .get(path)
            .map(|f| f.modified)
            .ok_or_else(|| ArtifactError::NotFound(path.to_path_buf()))
    }

    async fn remove_file(&self, path: &Path) -> Result<RemoveOutcome, ArtifactError> {
        if self.failing_delete.read().contains(path) {
            return Err(simulated(std::io::ErrorKind::PermissionDenied, "delete failure"));
        }
        match self.files.write().remove(path) {
            Some(_) => Ok(RemoveOutcome::Removed),
            None => Ok(RemoveOutcome::AlreadyGone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_new_refuses_overwrite() {
        let backend = MemoryBackend::new();
        let path = PathBuf::from("/store/a.png");
        backend.write_new(&path, Bytes::from_static(b"1")).await.unwrap();

        let err = backend
            .write_new(&path, Bytes::from_static(b"2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ArtifactError::AlreadyExists(_)));
        assert_eq!(backend.read_file(&path).await.unwrap(), Bytes::from_static(b"1"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_already_gone() {
        let backend = MemoryBackend::new();
        let outcome = backend.remove_file(Path::new("/store/nope")).await.unwrap();
        assert_eq!(outcome, RemoveOutcome::AlreadyGone);
    }

    #[tokio::test]
    async fn test_list_dir_is_non_recursive() {
        let backend = MemoryBackend::new();
        backend.insert("/store/a", "x", SystemTime::now());
        backend.insert("/store/nested/b", "x", SystemTime::now());
        backend.insert("/other/c", "x", SystemTime::now());

        let entries = backend.list_dir(Path::new("/store")).await.unwrap();
        assert_eq!(entries, vec![PathBuf::from("/store/a")]);
    }
}
