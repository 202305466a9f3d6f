//! Artifact store: unique naming under one directory plus expiry sweeps

use super::backend::{ArtifactBackend, RemoveOutcome, TokioFsBackend};
use super::error::ArtifactError;
use super::types::{artifact_file_name, Artifact, ArtifactRole, SweepReport};
use crate::config::StorageConfig;
use bytes::Bytes;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Append-only namespace of image artifacts.
///
/// Every stored buffer gets a name embedding a fresh UUID, so entries are
/// never reused or rewritten. Cloning is cheap and clones share the backend.
#[derive(Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    expiry: Duration,
    backend: Arc<dyn ArtifactBackend>,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("dir", &self.dir)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl ArtifactStore {
    /// Open the store on the local filesystem, creating the directory if absent.
    pub async fn open(config: &StorageConfig) -> Result<Self, ArtifactError> {
        Self::with_backend(
            config.temp_dir.clone(),
            config.expiry(),
            Arc::new(TokioFsBackend::new()),
        )
        .await
    }

    pub async fn with_backend(
        dir: impl Into<PathBuf>,
        expiry: Duration,
        backend: Arc<dyn ArtifactBackend>,
    ) -> Result<Self, ArtifactError> {
        let dir = dir.into();
        backend.create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), expiry_secs = expiry.as_secs(), "Artifact store ready");
        Ok(Self {
            dir,
            expiry,
            backend,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Persist `data` under a fresh name `<role>-<uuid>-<original_name>`.
    pub async fn store(
        &self,
        data: Bytes,
        role: ArtifactRole,
        original_name: &str,
    ) -> Result<Artifact, ArtifactError> {
        let id = Uuid::new_v4();
        let path = self.dir.join(artifact_file_name(role, id, original_name));
        let size = data.len() as u64;

        self.backend.write_new(&path, data).await?;

        debug!(
            artifact_id = %id,
            role = %role,
            path = %path.display(),
            size,
            "Stored artifact"
        );

        Ok(Artifact {
            id,
            role,
            created_at: Utc::now(),
            path,
            size,
        })
    }

    /// Read an artifact back. Fails with `NotFound` once it has been swept.
    pub async fn load(&self, artifact: &Artifact) -> Result<Bytes, ArtifactError> {
        if artifact.path.parent() != Some(self.dir.as_path()) {
            return Err(ArtifactError::OutsideStore(artifact.path.clone()));
        }
        self.backend.read_file(&artifact.path).await
    }

    /// Delete every entry older than the expiry.
    pub async fn sweep_once(&self) -> SweepReport {
        self.sweep_at(SystemTime::now()).await
    }

    /// Sweep as if the current time were `now`.
    ///
    /// Each entry is handled on its own: a failed stat or delete is logged
    /// and counted, and the sweep moves on.
    pub async fn sweep_at(&self, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();

        let entries = match self.backend.list_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "Failed to list artifact directory");
                report.errors += 1;
                return report;
            }
        };

        for path in entries {
            report.scanned += 1;

            let modified = match self.backend.modified(&path).await {
                Ok(modified) => modified,
                Err(e) if e.is_not_found() => {
                    report.vanished += 1;
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat artifact");
                    report.errors += 1;
                    continue;
                }
            };

            // mtime in the future counts as fresh
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age <= self.expiry {
                report.retained += 1;
                continue;
            }

            match self.backend.remove_file(&path).await {
                Ok(RemoveOutcome::Removed) => {
                    debug!(path = %path.display(), age_secs = age.as_secs(), "Deleted expired artifact");
                    report.deleted += 1;
                }
                Ok(RemoveOutcome::AlreadyGone) => report.vanished += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to delete artifact");
                    report.errors += 1;
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            scanned = report.scanned,
            deleted = report.deleted,
            retained = report.retained,
            vanished = report.vanished,
            errors = report.errors,
            "Artifact sweep complete"
        );

        report
    }
}
