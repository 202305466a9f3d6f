//! Artifact lifecycle: unique on-disk names for uploads and outputs, plus
//! periodic removal of expired entries.

pub mod backend;
mod error;
#[cfg(test)]
mod memory_backend;
mod store;
mod sweeper;
mod types;

pub use backend::{ArtifactBackend, RemoveOutcome, TokioFsBackend};
pub use error::ArtifactError;
#[cfg(test)]
pub(crate) use memory_backend::MemoryBackend;
pub use store::ArtifactStore;
pub use sweeper::Sweeper;
pub use types::{artifact_file_name, sanitize_name, Artifact, ArtifactRole, SweepReport};
