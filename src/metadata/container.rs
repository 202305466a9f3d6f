//! Metadata container access at the byte level.
//!
//! Encoders write bare images, so protection tags (or the source's original
//! container) are spliced into the encoded bytes afterwards:
//!
//! - JPEG: EXIF lives in an APP1 segment starting with `Exif\0\0`, placed
//!   after SOI and any leading APP0 (JFIF) segment.
//! - PNG: EXIF lives in an `eXIf` chunk; text entries in `tEXt` chunks. New
//!   chunks go right before the first `IDAT`.

use super::error::MetadataError;
use flate2::Crc;
use serde::Serialize;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
const JPEG_APP0: u8 = 0xE0;
const JPEG_APP1: u8 = 0xE1;
const JPEG_SOS: u8 = 0xDA;
const JPEG_EOI: u8 = 0xD9;
const EXIF_HEADER: &[u8] = b"Exif\0\0";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_EXIF: &[u8; 4] = b"eXIf";
const PNG_TEXT: &[u8; 4] = b"tEXt";
const PNG_IDAT: &[u8; 4] = b"IDAT";
const PNG_IEND: &[u8; 4] = b"IEND";

/// Longest keyword allowed in a PNG text chunk
const PNG_KEYWORD_MAX: usize = 79;

/// A PNG `tEXt` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEntry {
    pub keyword: String,
    pub text: String,
}

impl TextEntry {
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
        }
    }
}

/// Metadata carried by a source image, captured before it is decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMetadata {
    /// Raw TIFF-structured EXIF payload
    pub exif: Option<Vec<u8>>,
    /// PNG text entries, in file order
    pub text: Vec<TextEntry>,
}

impl SourceMetadata {
    /// Capture the container of `data`. Unreadable containers count as absent.
    pub fn read(data: &[u8]) -> Self {
        if is_jpeg(data) {
            Self {
                exif: read_jpeg_exif(data).ok().flatten(),
                text: Vec::new(),
            }
        } else if is_png(data) {
            Self {
                exif: read_png_exif(data).ok().flatten(),
                text: read_png_text(data).unwrap_or_default(),
            }
        } else {
            Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exif.is_none() && self.text.is_empty()
    }
}

pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&JPEG_SOI)
}

pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

// =============================================================================
// JPEG
// =============================================================================

/// A marker segment with a length field, spanning `start..end` of the file.
#[derive(Debug, Clone, Copy)]
struct JpegSegment {
    marker: u8,
    start: usize,
    end: usize,
}

impl JpegSegment {
    fn payload<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.start + 4..self.end]
    }

    fn is_exif(&self, data: &[u8]) -> bool {
        self.marker == JPEG_APP1 && self.payload(data).starts_with(EXIF_HEADER)
    }
}

/// Split the header of a JPEG into segments. Returns the segments and the
/// offset where the entropy-coded part (SOS) begins.
fn jpeg_segments(data: &[u8]) -> Result<(Vec<JpegSegment>, usize), MetadataError> {
    if !is_jpeg(data) {
        return Err(MetadataError::malformed("jpeg", "missing SOI marker"));
    }

    let mut segments = Vec::new();
    let mut pos = 2;

    loop {
        if pos >= data.len() {
            return Ok((segments, data.len()));
        }
        if data[pos] != 0xFF {
            return Err(MetadataError::malformed(
                "jpeg",
                format!("expected marker at offset {}", pos),
            ));
        }
        if pos + 1 >= data.len() {
            return Err(MetadataError::malformed("jpeg", "truncated marker"));
        }

        let marker = data[pos + 1];
        match marker {
            // fill byte
            0xFF => pos += 1,
            JPEG_SOS | JPEG_EOI => return Ok((segments, pos)),
            0x01 | 0xD0..=0xD7 => pos += 2,
            _ => {
                if pos + 4 > data.len() {
                    return Err(MetadataError::malformed("jpeg", "truncated segment length"));
                }
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                let end = pos + 2 + len;
                if len < 2 || end > data.len() {
                    return Err(MetadataError::malformed(
                        "jpeg",
                        format!("segment 0x{:02X} overruns the file", marker),
                    ));
                }
                segments.push(JpegSegment {
                    marker,
                    start: pos,
                    end,
                });
                pos = end;
            }
        }
    }
}

/// Raw EXIF payload of the first `Exif` APP1 segment, if any.
pub fn read_jpeg_exif(data: &[u8]) -> Result<Option<Vec<u8>>, MetadataError> {
    let (segments, _) = jpeg_segments(data)?;
    Ok(segments
        .iter()
        .find(|s| s.is_exif(data))
        .map(|s| s.payload(data)[EXIF_HEADER.len()..].to_vec()))
}

/// Replace any `Exif` APP1 segments of `data` with one holding `exif`.
pub fn write_jpeg_exif(data: &[u8], exif: &[u8]) -> Result<Vec<u8>, MetadataError> {
    let segment_len = 2 + EXIF_HEADER.len() + exif.len();
    if segment_len > u16::MAX as usize {
        return Err(MetadataError::PayloadTooLarge { len: exif.len() });
    }

    let (segments, _) = jpeg_segments(data)?;

    let mut app1 = Vec::with_capacity(segment_len + 2);
    app1.extend_from_slice(&[0xFF, JPEG_APP1]);
    app1.extend_from_slice(&(segment_len as u16).to_be_bytes());
    app1.extend_from_slice(EXIF_HEADER);
    app1.extend_from_slice(exif);

    let insert_at = segments
        .iter()
        .take_while(|s| s.marker == JPEG_APP0)
        .count();

    let mut out = Vec::with_capacity(data.len() + app1.len());
    out.extend_from_slice(&JPEG_SOI);

    // Bytes between header segments (fill bytes, standalone markers) are kept
    let mut cursor = 2;
    for (idx, segment) in segments.iter().enumerate() {
        if idx == insert_at {
            out.extend_from_slice(&app1);
        }
        out.extend_from_slice(&data[cursor..segment.start]);
        if !segment.is_exif(data) {
            out.extend_from_slice(&data[segment.start..segment.end]);
        }
        cursor = segment.end;
    }
    if insert_at == segments.len() {
        out.extend_from_slice(&app1);
    }
    out.extend_from_slice(&data[cursor..]);

    Ok(out)
}

// =============================================================================
// PNG
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct PngChunk {
    kind: [u8; 4],
    start: usize,
    end: usize,
}

impl PngChunk {
    fn data<'a>(&self, png: &'a [u8]) -> &'a [u8] {
        &png[self.start + 8..self.end - 4]
    }
}

fn png_chunks(data: &[u8]) -> Result<Vec<PngChunk>, MetadataError> {
    if !is_png(data) {
        return Err(MetadataError::malformed("png", "missing signature"));
    }

    let mut chunks = Vec::new();
    let mut pos = PNG_SIGNATURE.len();

    while pos < data.len() {
        if pos + 8 > data.len() {
            return Err(MetadataError::malformed("png", "truncated chunk header"));
        }
        let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
            as usize;
        let end = pos
            .checked_add(12)
            .and_then(|p| p.checked_add(len))
            .filter(|end| *end <= data.len())
            .ok_or_else(|| MetadataError::malformed("png", "chunk overruns the file"))?;

        let mut kind = [0u8; 4];
        kind.copy_from_slice(&data[pos + 4..pos + 8]);
        chunks.push(PngChunk {
            kind,
            start: pos,
            end,
        });
        pos = end;

        if &kind == PNG_IEND {
            break;
        }
    }

    Ok(chunks)
}

fn encode_chunk(kind: &[u8; 4], payload: &[u8]) -> Result<Vec<u8>, MetadataError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| MetadataError::malformed("png", "chunk payload too large"))?;

    let mut crc = Crc::new();
    crc.update(kind);
    crc.update(payload);

    let mut chunk = Vec::with_capacity(payload.len() + 12);
    chunk.extend_from_slice(&len.to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(payload);
    chunk.extend_from_slice(&crc.sum().to_be_bytes());
    Ok(chunk)
}

/// Drop every chunk matching `remove` and insert `insert` before the first IDAT.
fn rewrite_png<F>(data: &[u8], remove: F, insert: &[Vec<u8>]) -> Result<Vec<u8>, MetadataError>
where
    F: Fn(&PngChunk, &[u8]) -> bool,
{
    let chunks = png_chunks(data)?;
    if !chunks.iter().any(|c| &c.kind == PNG_IDAT) {
        return Err(MetadataError::malformed("png", "no IDAT chunk"));
    }

    let extra: usize = insert.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(data.len() + extra);
    out.extend_from_slice(&PNG_SIGNATURE);

    let mut inserted = false;
    for chunk in &chunks {
        if !inserted && &chunk.kind == PNG_IDAT {
            for new_chunk in insert {
                out.extend_from_slice(new_chunk);
            }
            inserted = true;
        }
        if !remove(chunk, data) {
            out.extend_from_slice(&data[chunk.start..chunk.end]);
        }
    }

    Ok(out)
}

/// Payload of the `eXIf` chunk, if any.
pub fn read_png_exif(data: &[u8]) -> Result<Option<Vec<u8>>, MetadataError> {
    Ok(png_chunks(data)?
        .iter()
        .find(|c| &c.kind == PNG_EXIF)
        .map(|c| c.data(data).to_vec()))
}

/// Replace any `eXIf` chunk of `data` with one holding `exif`.
pub fn write_png_exif(data: &[u8], exif: &[u8]) -> Result<Vec<u8>, MetadataError> {
    let chunk = encode_chunk(PNG_EXIF, exif)?;
    rewrite_png(data, |c, _| &c.kind == PNG_EXIF, &[chunk])
}

fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| *b as char).collect()
}

fn latin1_encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn text_keyword(chunk: &PngChunk, data: &[u8]) -> Option<String> {
    let payload = chunk.data(data);
    let nul = payload.iter().position(|b| *b == 0)?;
    Some(latin1_decode(&payload[..nul]))
}

/// All `tEXt` entries in file order.
pub fn read_png_text(data: &[u8]) -> Result<Vec<TextEntry>, MetadataError> {
    Ok(png_chunks(data)?
        .iter()
        .filter(|c| &c.kind == PNG_TEXT)
        .filter_map(|c| {
            let payload = c.data(data);
            let nul = payload.iter().position(|b| *b == 0)?;
            Some(TextEntry::new(
                latin1_decode(&payload[..nul]),
                latin1_decode(&payload[nul + 1..]),
            ))
        })
        .collect())
}

/// Write `entries` as `tEXt` chunks, replacing existing chunks with the same keywords.
pub fn write_png_text(data: &[u8], entries: &[TextEntry]) -> Result<Vec<u8>, MetadataError> {
    let mut chunks = Vec::with_capacity(entries.len());
    for entry in entries {
        let keyword = latin1_encode(&entry.keyword);
        if keyword.is_empty() || keyword.len() > PNG_KEYWORD_MAX || keyword.contains(&0) {
            return Err(MetadataError::malformed(
                "png",
                format!("invalid text keyword '{}'", entry.keyword),
            ));
        }
        let mut payload = keyword;
        payload.push(0);
        payload.extend(latin1_encode(&entry.text).into_iter().filter(|b| *b != 0));
        chunks.push(encode_chunk(PNG_TEXT, &payload)?);
    }

    rewrite_png(
        data,
        |c, png| {
            &c.kind == PNG_TEXT
                && text_keyword(c, png)
                    .map(|k| entries.iter().any(|e| e.keyword == k))
                    .unwrap_or(false)
        },
        &chunks,
    )
}
