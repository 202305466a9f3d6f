//! Ordered metadata injection strategies.
//!
//! The protector tries each strategy in turn until one succeeds:
//!
//! 1. [`MergedExif`] rebuilds the source EXIF container with the protection
//!    tags merged in (protection values win on collision).
//! 2. [`CanonicalExif`] writes a fresh container holding only the protection
//!    tags.
//! 3. [`PngText`] writes the protection tags as PNG `tEXt` entries, the
//!    minimal tag set a lossless output can always carry.

use super::container::{
    is_jpeg, is_png, write_jpeg_exif, write_png_exif, write_png_text, SourceMetadata, TextEntry,
};
use super::error::MetadataError;
use super::tags::MetadataTag;
use crate::raster::FormatClass;
use exif::{Field, In, Tag, Value};
use std::io::Cursor;

/// One way of writing protection tags into an encoded image.
pub trait InjectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy can write the given output format class.
    fn supports(&self, _format: FormatClass) -> bool {
        true
    }

    /// Return `encoded` with `tags` written into its metadata container.
    fn inject(
        &self,
        encoded: &[u8],
        source: &SourceMetadata,
        tags: &[MetadataTag],
    ) -> Result<Vec<u8>, MetadataError>;
}

/// Tags describing the TIFF layout itself; the writer regenerates them.
fn is_structural(tag: Tag) -> bool {
    matches!(
        tag,
        Tag::ExifIFDPointer
            | Tag::GPSInfoIFDPointer
            | Tag::InteropIFDPointer
            | Tag::StripOffsets
            | Tag::StripByteCounts
            | Tag::TileOffsets
            | Tag::TileByteCounts
            | Tag::JPEGInterchangeFormat
            | Tag::JPEGInterchangeFormatLength
    )
}

/// Serialize fields into a TIFF-structured EXIF payload.
pub fn build_exif<'a, I>(fields: I, little_endian: bool) -> Result<Vec<u8>, MetadataError>
where
    I: IntoIterator<Item = &'a Field>,
{
    let mut writer = exif::experimental::Writer::new();
    for field in fields {
        writer.push_field(field);
    }

    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, little_endian)?;
    Ok(buf.into_inner())
}

/// Put an EXIF payload into whichever container `encoded` is.
fn write_exif_container(encoded: &[u8], tiff: &[u8]) -> Result<Vec<u8>, MetadataError> {
    if is_jpeg(encoded) {
        write_jpeg_exif(encoded, tiff)
    } else if is_png(encoded) {
        write_png_exif(encoded, tiff)
    } else {
        Err(MetadataError::UnrecognizedImage(
            "encoded output is neither JPEG nor PNG".to_string(),
        ))
    }
}

fn canonical_fields(tags: &[MetadataTag]) -> Vec<Field> {
    tags.iter().map(|t| t.key.exif_field(&t.value)).collect()
}

/// Merge protection tags into the source EXIF container.
///
/// Only the primary image's fields (IFD0 and its Exif/GPS sub-IFDs) are
/// carried over. The thumbnail IFD is dropped: its preview was taken from
/// the unprotected source and would ship an unmarked copy of the image.
#[derive(Debug, Default)]
pub struct MergedExif;

impl InjectionStrategy for MergedExif {
    fn name(&self) -> &'static str {
        "merged-exif"
    }

    fn inject(
        &self,
        encoded: &[u8],
        source: &SourceMetadata,
        tags: &[MetadataTag],
    ) -> Result<Vec<u8>, MetadataError> {
        let raw = source.exif.as_ref().ok_or(MetadataError::NoSourceContainer)?;
        let parsed = exif::Reader::new().read_raw(raw.clone())?;
        let canonical = canonical_fields(tags);

        let preserved = parsed.fields().filter(|f| {
            f.ifd_num == In::PRIMARY
                && !is_structural(f.tag)
                && !matches!(f.value, Value::Unknown(..))
                && !canonical.iter().any(|c| c.tag == f.tag)
        });

        let tiff = build_exif(preserved.chain(canonical.iter()), parsed.little_endian())?;
        write_exif_container(encoded, &tiff)
    }
}

/// Fresh EXIF container holding only the protection tags.
#[derive(Debug, Default)]
pub struct CanonicalExif;

impl InjectionStrategy for CanonicalExif {
    fn name(&self) -> &'static str {
        "canonical-exif"
    }

    fn inject(
        &self,
        encoded: &[u8],
        _source: &SourceMetadata,
        tags: &[MetadataTag],
    ) -> Result<Vec<u8>, MetadataError> {
        let fields = canonical_fields(tags);
        let tiff = build_exif(fields.iter(), false)?;
        write_exif_container(encoded, &tiff)
    }
}

/// Protection tags as PNG text chunks.
#[derive(Debug, Default)]
pub struct PngText;

impl InjectionStrategy for PngText {
    fn name(&self) -> &'static str {
        "png-text"
    }

    fn supports(&self, format: FormatClass) -> bool {
        format == FormatClass::Lossless
    }

    fn inject(
        &self,
        encoded: &[u8],
        _source: &SourceMetadata,
        tags: &[MetadataTag],
    ) -> Result<Vec<u8>, MetadataError> {
        if !is_png(encoded) {
            return Err(MetadataError::UnsupportedTarget {
                strategy: self.name(),
                format: FormatClass::Lossy,
            });
        }

        let entries: Vec<TextEntry> = tags
            .iter()
            .map(|t| TextEntry::new(t.key.png_keyword(), t.value.clone()))
            .collect();
        write_png_text(encoded, &entries)
    }
}

/// The default chain, most faithful first.
pub fn default_chain() -> Vec<Box<dyn InjectionStrategy>> {
    vec![
        Box::new(MergedExif),
        Box::new(CanonicalExif),
        Box::new(PngText),
    ]
}
