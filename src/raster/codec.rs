//! Source decoding and format detection

use super::buffer::{FormatClass, RasterImage};
use super::error::ImageError;
use image::io::Reader as ImageReader;
use image::ImageFormat;
use std::io::Cursor;

/// Detect the format class from the leading bytes, if they are recognizable.
pub fn detect_format(data: &[u8]) -> Option<FormatClass> {
    image::guess_format(data)
        .ok()
        .map(FormatClass::from_image_format)
}

/// Decode source bytes into a raster.
///
/// The format is sniffed from the content first; `hint` is only consulted
/// when the bytes carry no recognizable signature. Anything that cannot be
/// decoded is a [`ImageError::DecodeFailed`].
pub fn decode(data: &[u8], hint: Option<&str>) -> Result<RasterImage, ImageError> {
    if data.is_empty() {
        return Err(ImageError::decode_failed("empty input"));
    }

    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;

    if reader.format().is_none() {
        let class = hint
            .and_then(FormatClass::from_hint)
            .ok_or_else(|| ImageError::decode_failed("unrecognized image format"))?;
        reader.set_format(match class {
            FormatClass::Lossy => ImageFormat::Jpeg,
            FormatClass::Lossless => ImageFormat::Png,
        });
    }

    let format = reader
        .format()
        .map(FormatClass::from_image_format)
        .ok_or_else(|| ImageError::decode_failed("unrecognized image format"))?;

    let image = reader
        .decode()
        .map_err(|e| ImageError::decode_failed(e.to_string()))?;

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        format = %format,
        "Decoded source image"
    );

    RasterImage::from_dynamic(image, format)
}
