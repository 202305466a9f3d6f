//! Upload-to-output flow over the artifact store.

use super::pipeline::{ProtectionOutput, ProtectionPipeline, ProtectionRequest};
use crate::artifact::{Artifact, ArtifactRole, ArtifactStore};
use crate::error::ProtectError;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;

/// Artifacts written for one protected upload.
#[derive(Debug, Clone)]
pub struct ProtectedUpload {
    pub original: Artifact,
    pub processed: Artifact,
    pub output: ProtectionOutput,
}

/// Name of the output artifact: `<stem>.protected.<ext>`.
pub fn output_name(original_name: &str, output: &ProtectionOutput) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{}.protected.{}", stem, output.format.extension())
}

/// Store the upload, protect it and store the result under a fresh name.
///
/// The upload's filename doubles as the format hint when the request has
/// none. A decode failure leaves the original artifact in place for the
/// sweeper.
pub async fn protect_upload(
    store: &ArtifactStore,
    pipeline: &Arc<ProtectionPipeline>,
    original_name: &str,
    mut request: ProtectionRequest,
) -> Result<ProtectedUpload, ProtectError> {
    let original = store
        .store(request.source.clone(), ArtifactRole::Original, original_name)
        .await?;

    if request.format_hint.is_none() {
        request.format_hint = Some(original_name.to_string());
    }

    let output = pipeline.process_async(request).await?;

    let processed = store
        .store(
            Bytes::from(output.bytes.clone()),
            ArtifactRole::Processed,
            &output_name(original_name, &output),
        )
        .await?;

    tracing::info!(
        original_id = %original.id,
        processed_id = %processed.id,
        processed = %processed.path.display(),
        format = %output.format,
        "Protected upload stored"
    );

    Ok(ProtectedUpload {
        original,
        processed,
        output,
    })
}
