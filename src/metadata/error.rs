use crate::raster::FormatClass;
use thiserror::Error;

/// Metadata read and write errors.
///
/// Injection errors are recoverable; the pipeline logs them and keeps the
/// pre-injection buffer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Unrecognized image: {0}")]
    UnrecognizedImage(String),

    #[error("Malformed {format} container: {message}")]
    MalformedContainer {
        format: &'static str,
        message: String,
    },

    #[error("EXIF error: {0}")]
    Exif(String),

    #[error("EXIF payload of {len} bytes does not fit in a JPEG APP1 segment")]
    PayloadTooLarge { len: usize },

    #[error("Source has no metadata container to merge")]
    NoSourceContainer,

    #[error("Strategy {strategy} cannot write {format} images")]
    UnsupportedTarget {
        strategy: &'static str,
        format: FormatClass,
    },

    #[error("All metadata strategies failed: {}", .0.join("; "))]
    AllStrategiesFailed(Vec<String>),
}

impl MetadataError {
    pub fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        MetadataError::MalformedContainer {
            format,
            message: message.into(),
        }
    }
}

impl From<exif::Error> for MetadataError {
    fn from(e: exif::Error) -> Self {
        MetadataError::Exif(e.to_string())
    }
}
