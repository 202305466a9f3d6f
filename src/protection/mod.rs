//! Protection orchestration: decode, watermark, tag, perturb, encode.

pub mod ingest;
pub mod pipeline;
pub mod report;

pub use ingest::{output_name, protect_upload, ProtectedUpload};
pub use pipeline::{process, ProtectionOutput, ProtectionPipeline, ProtectionRequest};
pub use report::{PipelineState, ProtectionReport, StageOutcome, StageRecord};
