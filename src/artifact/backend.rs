//! Filesystem abstraction used by the artifact store
//!
//! The store only needs a handful of primitives. Keeping them behind a trait
//! lets tests drive the sweeper with controlled modification times and
//! injected failures.

use super::error::ArtifactError;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The entry was already gone
    AlreadyGone,
}

#[async_trait]
pub trait ArtifactBackend: Send + Sync {
    async fn create_dir_all(&self, path: &Path) -> Result<(), ArtifactError>;

    /// Write `data` to a path that must not exist yet.
    async fn write_new(&self, path: &Path, data: Bytes) -> Result<(), ArtifactError>;

    async fn read_file(&self, path: &Path) -> Result<Bytes, ArtifactError>;

    /// List the entries of a directory (non-recursive).
    async fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, ArtifactError>;

    async fn modified(&self, path: &Path) -> Result<SystemTime, ArtifactError>;

    /// Delete a file. A missing file is not an error.
    async fn remove_file(&self, path: &Path) -> Result<RemoveOutcome, ArtifactError>;
}

/// Portable backend using tokio::fs
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioFsBackend;

impl TokioFsBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactBackend for TokioFsBackend {
    async fn create_dir_all(&self, path: &Path) -> Result<(), ArtifactError> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn write_new(&self, path: &Path, data: Bytes) -> Result<(), ArtifactError> {
        use tokio::io::AsyncWriteExt;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .map_err(|e| ArtifactError::from_io(e, path))?;
        file.write_all(&data).await?;
        file.flush().await?;
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes, ArtifactError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ArtifactError::from_io(e, path))?;
        Ok(Bytes::from(data))
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, ArtifactError> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(path).await?;
        while push_entry(
            path,
            &mut entries,
            dir.next_entry().await.map(|e| e.map(|e| e.path())),
        ) {}
        Ok(entries)
    }

    async fn modified(&self, path: &Path) -> Result<SystemTime, ArtifactError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ArtifactError::from_io(e, path))?;
        Ok(metadata.modified()?)
    }

    async fn remove_file(&self, path: &Path) -> Result<RemoveOutcome, ArtifactError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(RemoveOutcome::Removed),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RemoveOutcome::AlreadyGone),
            Err(e) => Err(ArtifactError::Io(e)),
        }
    }
}

/// Record one directory read; returns `false` once listing should stop.
///
/// A failed read ends the listing but keeps what was gathered before it.
fn push_entry(
    dir: &Path,
    entries: &mut Vec<PathBuf>,
    next: std::io::Result<Option<PathBuf>>,
) -> bool {
    match next {
        Ok(Some(entry)) => {
            entries.push(entry);
            true
        }
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                listed = entries.len(),
                error = %e,
                "Directory listing interrupted, continuing with partial listing"
            );
            false
        }
    }
}
