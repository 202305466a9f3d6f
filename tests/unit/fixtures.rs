// Shared test images

use image::{DynamicImage, ImageOutputFormat, RgbImage, RgbaImage};
use pixelguard::metadata::container::{write_jpeg_exif, write_png_text};
use pixelguard::metadata::strategy::build_exif;
use pixelguard::metadata::TextEntry;
use std::io::Cursor;

/// Smooth mid-tone gradient, so noise never saturates at 0 or 255.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (60 + (x * 120 / width.max(1))) as u8,
            (60 + (y * 120 / height.max(1))) as u8,
            128,
        ])
    })
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient_rgb(width, height))
        .write_to(&mut out, ImageOutputFormat::Jpeg(90))
        .unwrap();
    out.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient_rgb(width, height))
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let rgba = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 7) as u8, (y * 5) as u8, 200, ((x + y) * 3) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(rgba)
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Primary-IFD ASCII field.
pub fn ascii_field(tag: exif::Tag, value: &str) -> exif::Field {
    exif::Field {
        tag,
        ifd_num: exif::In::PRIMARY,
        value: exif::Value::Ascii(vec![value.as_bytes().to_vec()]),
    }
}

/// JPEG carrying an EXIF container with camera make/model and a foreign copyright.
pub fn jpeg_with_camera_exif(width: u32, height: u32) -> Vec<u8> {
    let fields = [
        ascii_field(exif::Tag::Make, "TestCam"),
        ascii_field(exif::Tag::Model, "Model 7"),
        ascii_field(exif::Tag::Copyright, "Someone Else"),
    ];
    let tiff = build_exif(fields.iter(), false).unwrap();
    write_jpeg_exif(&jpeg_bytes(width, height), &tiff).unwrap()
}

/// PNG carrying a `tEXt` chunk.
pub fn png_with_text(width: u32, height: u32) -> Vec<u8> {
    write_png_text(
        &png_bytes(width, height),
        &[TextEntry::new("Software", "fixture-writer")],
    )
    .unwrap()
}
