//! Metadata protection stage.

use super::container::{
    is_jpeg, is_png, write_jpeg_exif, write_png_exif, write_png_text, SourceMetadata, TextEntry,
};
use super::error::MetadataError;
use super::strategy::{default_chain, InjectionStrategy};
use super::tags::{MetadataSpec, MetadataTag};
use crate::raster::FormatClass;

/// Encoded bytes after the metadata stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedImage {
    pub bytes: Vec<u8>,
    /// Strategy that wrote the tags; `None` when the source container was
    /// carried over unchanged.
    pub strategy: Option<&'static str>,
}

/// Writes protection tags through an ordered strategy chain.
pub struct MetadataProtector {
    strategies: Vec<Box<dyn InjectionStrategy>>,
}

impl std::fmt::Debug for MetadataProtector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataProtector")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl Default for MetadataProtector {
    fn default() -> Self {
        Self::new(default_chain())
    }
}

impl MetadataProtector {
    pub fn new(strategies: Vec<Box<dyn InjectionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Write the tags of `spec` into `encoded`.
    ///
    /// When `spec` is disabled the source container is carried over
    /// verbatim instead. Fails only when every strategy failed; the caller
    /// decides what to fall back to.
    pub fn protect(
        &self,
        encoded: &[u8],
        format: FormatClass,
        source: &SourceMetadata,
        spec: &MetadataSpec,
    ) -> Result<TaggedImage, MetadataError> {
        if !spec.enabled {
            return Ok(TaggedImage {
                bytes: preserve(encoded, source)?,
                strategy: None,
            });
        }

        let tags = spec.tags();
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            if !strategy.supports(format) {
                tracing::debug!(
                    strategy = strategy.name(),
                    format = %format,
                    "Metadata strategy does not support output format"
                );
                continue;
            }

            let attempt = strategy
                .inject(encoded, source, &tags)
                .and_then(|bytes| carry_text(bytes, source, &tags));

            match attempt {
                Ok(bytes) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        tags = tags.len(),
                        "Protection metadata written"
                    );
                    return Ok(TaggedImage {
                        bytes,
                        strategy: Some(strategy.name()),
                    });
                }
                Err(e) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        error = %e,
                        "Metadata strategy failed, trying next"
                    );
                    failures.push(format!("{}: {}", strategy.name(), e));
                }
            }
        }

        Err(MetadataError::AllStrategiesFailed(failures))
    }
}

/// Write `spec` into `encoded` with the default strategy chain.
pub fn protect(
    encoded: &[u8],
    format: FormatClass,
    source: &SourceMetadata,
    spec: &MetadataSpec,
) -> Result<TaggedImage, MetadataError> {
    MetadataProtector::default().protect(encoded, format, source, spec)
}

/// Re-insert the source container into freshly encoded bytes.
///
/// Returns `encoded` unchanged when the source had no container.
pub fn preserve(encoded: &[u8], source: &SourceMetadata) -> Result<Vec<u8>, MetadataError> {
    let mut bytes = encoded.to_vec();

    if let Some(exif) = &source.exif {
        bytes = if is_jpeg(&bytes) {
            write_jpeg_exif(&bytes, exif)?
        } else if is_png(&bytes) {
            write_png_exif(&bytes, exif)?
        } else {
            return Err(MetadataError::UnrecognizedImage(
                "encoded output is neither JPEG nor PNG".to_string(),
            ));
        };
    }

    if !source.text.is_empty() && is_png(&bytes) {
        bytes = write_png_text(&bytes, &source.text)?;
    }

    Ok(bytes)
}

/// Keep the source's PNG text entries, except those a protection tag replaces.
fn carry_text(
    bytes: Vec<u8>,
    source: &SourceMetadata,
    tags: &[MetadataTag],
) -> Result<Vec<u8>, MetadataError> {
    if source.text.is_empty() || !is_png(&bytes) {
        return Ok(bytes);
    }

    let kept: Vec<TextEntry> = source
        .text
        .iter()
        .filter(|entry| !tags.iter().any(|t| t.key.png_keyword() == entry.keyword))
        .cloned()
        .collect();

    if kept.is_empty() {
        return Ok(bytes);
    }
    write_png_text(&bytes, &kept)
}
