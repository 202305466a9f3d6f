//! Read-only metadata inspection.

use super::container::{SourceMetadata, TextEntry};
use super::error::MetadataError;
use super::tags::{TagKey, USER_COMMENT_ASCII_PREFIX};
use crate::raster::{detect_format, FormatClass};
use exif::{Field, Tag, Value};
use image::io::Reader as ImageReader;
use serde::Serialize;
use std::io::Cursor;

/// One EXIF field in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExifEntry {
    /// IFD the field belongs to ("primary" or "thumbnail")
    pub ifd: String,
    pub tag: String,
    pub value: String,
}

/// What an image carries, for display and comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataSnapshot {
    pub format: FormatClass,
    pub width: u32,
    pub height: u32,
    pub has_container: bool,
    pub exif: Vec<ExifEntry>,
    pub text: Vec<TextEntry>,
}

impl MetadataSnapshot {
    /// Display value of a primary-IFD EXIF tag, looked up by name.
    pub fn exif_value(&self, tag: &str) -> Option<&str> {
        self.exif
            .iter()
            .find(|e| e.tag == tag && e.ifd == "primary")
            .map(|e| e.value.as_str())
    }

    pub fn text_value(&self, keyword: &str) -> Option<&str> {
        self.text
            .iter()
            .find(|e| e.keyword == keyword)
            .map(|e| e.text.as_str())
    }

    /// Value of a protection tag from EXIF, or from PNG text when EXIF lacks it.
    pub fn protection_value(&self, key: TagKey) -> Option<&str> {
        self.exif_value(key.name())
            .or_else(|| self.text_value(key.png_keyword()))
    }
}

/// Inspect `bytes` without modifying them.
pub fn extract_metadata(bytes: &[u8]) -> Result<MetadataSnapshot, MetadataError> {
    let format = detect_format(bytes)
        .ok_or_else(|| MetadataError::UnrecognizedImage("unknown format".to_string()))?;

    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| MetadataError::UnrecognizedImage(e.to_string()))?
        .into_dimensions()
        .map_err(|e| MetadataError::UnrecognizedImage(e.to_string()))?;

    let source = SourceMetadata::read(bytes);

    let exif = match &source.exif {
        Some(raw) => match exif::Reader::new().read_raw(raw.clone()) {
            Ok(parsed) => parsed
                .fields()
                .map(|field| ExifEntry {
                    ifd: field.ifd_num.to_string(),
                    tag: field.tag.to_string(),
                    value: field_text(field, &parsed),
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "EXIF container present but unreadable");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    Ok(MetadataSnapshot {
        format,
        width,
        height,
        has_container: !source.is_empty(),
        exif,
        text: source.text,
    })
}

fn field_text(field: &Field, exif: &exif::Exif) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|p| String::from_utf8_lossy(p).trim_end_matches('\0').to_string())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Undefined(bytes, _) if field.tag == Tag::UserComment => {
            let text = bytes
                .strip_prefix(USER_COMMENT_ASCII_PREFIX.as_slice())
                .or_else(|| bytes.get(8..))
                .unwrap_or(bytes.as_slice());
            String::from_utf8_lossy(text)
                .trim_end_matches(|c: char| c == '\0' || c == ' ')
                .to_string()
        }
        _ => field.display_value().with_unit(exif).to_string(),
    }
}
