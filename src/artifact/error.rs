//! Error types for artifact storage

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Artifact already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Artifact {} is outside the storage directory", .0.display())]
    OutsideStore(PathBuf),
}

impl ArtifactError {
    /// Map an I/O error on `path`, keeping not-found and already-exists distinct.
    pub fn from_io(err: std::io::Error, path: &std::path::Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ArtifactError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::AlreadyExists => ArtifactError::AlreadyExists(path.to_path_buf()),
            _ => ArtifactError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            ArtifactError::NotFound(_) => true,
            ArtifactError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
