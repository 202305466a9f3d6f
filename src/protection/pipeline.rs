//! Protection orchestrator.
//!
//! A run moves through `Decoded -> Watermarked -> MetadataTagged -> Noised
//! -> Encoded`. Every stage after decoding either applies, is skipped because
//! its spec turns it off, or fails and passes its input through; the run
//! always reaches `Encoded`. Only an undecodable source aborts it.
//!
//! Metadata tags are resolved in the `MetadataTagged` stage but written into
//! the container after the final encode, since re-encoding the noised pixels
//! produces a bare image.

use super::report::{PipelineState, ProtectionReport, StageOutcome};
use crate::config::ProtectionConfig;
use crate::error::ProtectError;
use crate::metadata::{self, MetadataProtector, MetadataSpec, SourceMetadata};
use crate::noise::{NoiseSpec, NoiseSynthesizer, RandomNoise};
use crate::raster::{self, EncoderFactory, EncoderQuality, FormatClass, RasterImage};
use crate::watermark::{TextCompositor, WatermarkSpec};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;

/// Everything one run consumes.
#[derive(Debug, Clone)]
pub struct ProtectionRequest {
    pub source: Bytes,
    /// Declared format ("jpeg", "image/png", a filename...), used only when
    /// the bytes are not self-describing
    pub format_hint: Option<String>,
    pub watermark: WatermarkSpec,
    pub metadata: MetadataSpec,
    pub noise: NoiseSpec,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct ProtectionOutput {
    pub bytes: Vec<u8>,
    pub format: FormatClass,
    pub width: u32,
    pub height: u32,
    pub report: ProtectionReport,
}

impl ProtectionOutput {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Sequences the watermark, metadata and noise stages over one image.
pub struct ProtectionPipeline {
    compositor: TextCompositor,
    protector: MetadataProtector,
    synthesizer: Box<dyn NoiseSynthesizer>,
    quality: EncoderQuality,
}

impl std::fmt::Debug for ProtectionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectionPipeline")
            .field("compositor", &self.compositor)
            .field("protector", &self.protector)
            .field("quality", &self.quality)
            .finish()
    }
}

impl Default for ProtectionPipeline {
    fn default() -> Self {
        Self::new(
            TextCompositor::default(),
            MetadataProtector::default(),
            Box::new(RandomNoise),
            EncoderQuality::default(),
        )
    }
}

impl ProtectionPipeline {
    pub fn new(
        compositor: TextCompositor,
        protector: MetadataProtector,
        synthesizer: Box<dyn NoiseSynthesizer>,
        quality: EncoderQuality,
    ) -> Self {
        Self {
            compositor,
            protector,
            synthesizer,
            quality,
        }
    }

    /// Build the pipeline described by the `protection` config section.
    pub fn from_config(config: &ProtectionConfig) -> Self {
        Self::new(
            TextCompositor::new(config.font_path.as_deref()),
            MetadataProtector::default(),
            Box::new(RandomNoise),
            EncoderQuality::with_quality(config.jpeg_quality),
        )
    }

    pub fn with_synthesizer(mut self, synthesizer: Box<dyn NoiseSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_compositor(mut self, compositor: TextCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_protector(mut self, protector: MetadataProtector) -> Self {
        self.protector = protector;
        self
    }

    /// Run the full pipeline over `source`.
    pub fn process(
        &self,
        source: &[u8],
        format_hint: Option<&str>,
        watermark: &WatermarkSpec,
        metadata: &MetadataSpec,
        noise: &NoiseSpec,
    ) -> Result<ProtectionOutput, ProtectError> {
        let started = Instant::now();
        let mut report = ProtectionReport::default();

        // Decoded
        let t = Instant::now();
        let image = raster::decode(source, format_hint).map_err(|e| {
            tracing::warn!(error = %e, bytes = source.len(), "Source image could not be decoded");
            ProtectError::Decode(e)
        })?;
        let source_metadata = SourceMetadata::read(source);
        let format = image.format();
        let (width, height) = (image.width(), image.height());
        report.record(PipelineState::Decoded, StageOutcome::applied(), t.elapsed());

        // Watermarked
        let t = Instant::now();
        let (image, outcome) = self.watermark_stage(image, watermark);
        report.record(PipelineState::Watermarked, outcome, t.elapsed());

        // MetadataTagged: tags are fixed here, written after encoding
        let tag_count = metadata.tags().len();
        tracing::debug!(
            enabled = metadata.enabled,
            tags = tag_count,
            source_container = !source_metadata.is_empty(),
            "Metadata tags resolved"
        );

        // Noised
        let t = Instant::now();
        let (image, outcome) = self.noise_stage(image, noise);
        report.record(PipelineState::Noised, outcome, t.elapsed());

        // Encoded
        let t = Instant::now();
        let encoded = EncoderFactory::create(format)
            .encode(&image, self.quality)
            .map_err(|e| {
                tracing::error!(error = %e, format = %format, "Failed to encode protected image");
                ProtectError::Encode(e)
            })?;
        report.record(
            PipelineState::Encoded,
            StageOutcome::applied_with(encoded.content_type),
            t.elapsed(),
        );

        let t = Instant::now();
        let (bytes, outcome) =
            self.metadata_stage(encoded.data, format, &source_metadata, metadata);
        report.record(PipelineState::MetadataTagged, outcome, t.elapsed());

        report.total_ms = started.elapsed().as_secs_f64() * 1000.0;

        tracing::info!(
            format = %format,
            width = width,
            height = height,
            input_bytes = source.len(),
            output_bytes = bytes.len(),
            fallbacks = report.fallbacks().len(),
            duration_ms = report.total_ms,
            "Image protected"
        );

        Ok(ProtectionOutput {
            bytes,
            format,
            width,
            height,
            report,
        })
    }

    /// Run a request on the blocking thread pool.
    pub async fn process_async(
        self: &Arc<Self>,
        request: ProtectionRequest,
    ) -> Result<ProtectionOutput, ProtectError> {
        let pipeline = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            pipeline.process(
                &request.source,
                request.format_hint.as_deref(),
                &request.watermark,
                &request.metadata,
                &request.noise,
            )
        })
        .await
        .map_err(|e| ProtectError::Internal(format!("protection task failed: {}", e)))?
    }

    /// Composite the watermark, or pass the image through.
    pub fn watermark_stage(
        &self,
        image: RasterImage,
        spec: &WatermarkSpec,
    ) -> (RasterImage, StageOutcome) {
        if spec.is_empty() {
            return (image, StageOutcome::skipped("empty text"));
        }

        match self.compositor.composite(&image, spec) {
            Ok(marked) => (marked, StageOutcome::applied_with(spec.anchor.as_str())),
            Err(e) => {
                tracing::warn!(error = %e, "Watermark stage failed, keeping unwatermarked image");
                (image, StageOutcome::fell_back(e))
            }
        }
    }

    /// Add noise, or pass the image through. The synthesizer is not called
    /// when noise is disabled.
    pub fn noise_stage(&self, mut image: RasterImage, spec: &NoiseSpec) -> (RasterImage, StageOutcome) {
        let Some(amplitude) = spec.amplitude() else {
            return (image, StageOutcome::skipped("disabled"));
        };

        let result = self
            .synthesizer
            .synthesize(
                image.width(),
                image.height(),
                image.channels(),
                amplitude,
                spec.method,
            )
            .and_then(|noise| noise.apply_to(&mut image));

        match result {
            Ok(()) => {
                tracing::debug!(
                    method = %spec.method,
                    intensity = spec.intensity,
                    amplitude = amplitude,
                    "Noise applied"
                );
                (image, StageOutcome::applied_with(spec.method.as_str()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Noise stage failed, keeping unperturbed image");
                (image, StageOutcome::fell_back(e))
            }
        }
    }

    /// Write tags into the encoded bytes. On failure the source container is
    /// carried over when possible, else the bare encoding is kept.
    fn metadata_stage(
        &self,
        encoded: Vec<u8>,
        format: FormatClass,
        source: &SourceMetadata,
        spec: &MetadataSpec,
    ) -> (Vec<u8>, StageOutcome) {
        match self.protector.protect(&encoded, format, source, spec) {
            Ok(tagged) => {
                let outcome = match tagged.strategy {
                    Some(strategy) => StageOutcome::applied_with(strategy),
                    None => StageOutcome::skipped("disabled"),
                };
                (tagged.bytes, outcome)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Metadata stage failed, continuing without protection tags");
                let bytes = metadata::preserve(&encoded, source).unwrap_or(encoded);
                (bytes, StageOutcome::fell_back(e))
            }
        }
    }
}

/// Run `source` through a default pipeline (embedded font, quality 95).
pub fn process(
    source: &[u8],
    format_hint: Option<&str>,
    watermark: &WatermarkSpec,
    metadata: &MetadataSpec,
    noise: &NoiseSpec,
) -> Result<ProtectionOutput, ProtectError> {
    ProtectionPipeline::default().process(source, format_hint, watermark, metadata, noise)
}
