//! Artifact identity and sweep bookkeeping.

use crate::constants::MAX_ARTIFACT_NAME_LEN;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Why an artifact exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactRole {
    /// Uploaded source image
    Original,
    /// Pipeline output
    Processed,
}

impl ArtifactRole {
    /// File name prefix for this role.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Processed => "processed",
        }
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A byte buffer persisted in the storage directory. Never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub id: Uuid,
    pub role: ArtifactRole,
    pub created_at: DateTime<Utc>,
    pub path: PathBuf,
    pub size: u64,
}

impl Artifact {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Outcome of one sweep over the storage directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Entries listed
    pub scanned: usize,
    /// Expired entries deleted
    pub deleted: usize,
    /// Entries younger than the expiry
    pub retained: usize,
    /// Entries that disappeared before they could be stat'ed or deleted
    pub vanished: usize,
    /// Entries whose stat or delete failed
    pub errors: usize,
}

/// Reduce an uploaded filename to a safe name fragment.
///
/// Only the final path component is kept; anything outside
/// `[A-Za-z0-9._-]` becomes `_`.
pub fn sanitize_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    let mut name: String = if cleaned.chars().count() > MAX_ARTIFACT_NAME_LEN {
        // keep the tail so the extension survives
        let skip = cleaned.chars().count() - MAX_ARTIFACT_NAME_LEN;
        cleaned.chars().skip(skip).collect()
    } else {
        cleaned.to_string()
    };

    if name.is_empty() {
        name.push_str("image");
    }
    name
}

/// `<role>-<uuid>-<sanitized name>`
pub fn artifact_file_name(role: ArtifactRole, id: Uuid, original: &str) -> String {
    format!("{}-{}-{}", role.prefix(), id, sanitize_name(original))
}
