// Error types module

use crate::artifact::ArtifactError;
use crate::raster::ImageError;
use std::fmt;

/// Caller-visible failure of a protection run
///
/// Stage failures (watermark, metadata, noise) never appear here: they are
/// logged and the stage falls back to its input. What remains is a source
/// that cannot be decoded, an output that cannot be encoded, and artifact
/// storage around the run.
#[derive(Debug, Clone)]
pub enum ProtectError {
    /// Source bytes are not a decodable image (unknown format, corrupt data)
    Decode(ImageError),

    /// The processed raster could not be encoded
    Encode(ImageError),

    /// Artifact storage failed
    Artifact(String),

    /// Internal errors (worker task panicked or was cancelled)
    Internal(String),
}

impl fmt::Display for ProtectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtectError::Decode(e) => write!(f, "Decode error: {}", e),
            ProtectError::Encode(e) => write!(f, "Encode error: {}", e),
            ProtectError::Artifact(msg) => write!(f, "Artifact error: {}", msg),
            ProtectError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ProtectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtectError::Decode(e) | ProtectError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

impl ProtectError {
    /// True when the source itself was rejected.
    pub fn is_decode(&self) -> bool {
        matches!(self, ProtectError::Decode(_))
    }
}

impl From<ArtifactError> for ProtectError {
    fn from(e: ArtifactError) -> Self {
        ProtectError::Artifact(e.to_string())
    }
}
