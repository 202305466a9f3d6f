//! Watermark compositor for blending rendered text onto images.
//!
//! Compositing always works on an RGBA copy of the source raster and only
//! converts back once the whole layer has been blended, so a failure never
//! leaves a half-marked image behind.

use super::config::{Column, WatermarkSpec};
use super::position::{anchor_point, estimate_text_width, ImageDimensions, PlacementPosition};
use super::text_renderer::{render_text, TextRenderOptions, TextWindow, Typeface};
use super::WatermarkError;
use crate::constants::SHADOW_RADIUS;
use crate::raster::RasterImage;
use image::{Rgba, RgbaImage};
use std::path::Path;

/// A rendered layer positioned on the target image.
#[derive(Clone)]
pub struct WatermarkLayer {
    /// The watermark image (RGBA).
    pub image: RgbaImage,
    /// Top-left corner of the layer on the target.
    pub position: PlacementPosition,
}

impl std::fmt::Debug for WatermarkLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .finish()
    }
}

/// Draws text watermarks with one font face.
///
/// Construction never fails: when the face cannot be loaded the compositor
/// still measures text with the width estimate, and every `composite` call
/// reports [`WatermarkError::FontUnavailable`].
#[derive(Debug, Clone)]
pub struct TextCompositor {
    typeface: Result<Typeface, WatermarkError>,
}

impl Default for TextCompositor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TextCompositor {
    /// Load the configured font file, or the embedded face.
    pub fn new(font_path: Option<&Path>) -> Self {
        let typeface = Typeface::load(font_path);
        match &typeface {
            Ok(face) => tracing::debug!(font = face.source(), "Watermark font loaded"),
            Err(e) => tracing::warn!(error = %e, "Watermark font unavailable, text watermarks disabled"),
        }
        Self { typeface }
    }

    pub fn with_typeface(typeface: Typeface) -> Self {
        Self {
            typeface: Ok(typeface),
        }
    }

    /// A compositor that has no usable face.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            typeface: Err(WatermarkError::FontUnavailable(reason.into())),
        }
    }

    pub fn is_available(&self) -> bool {
        self.typeface.is_ok()
    }

    /// Width used for anchor placement: measured when a face is loaded,
    /// estimated from the character count otherwise.
    pub fn text_width(&self, text: &str, font_size: u32) -> u32 {
        match &self.typeface {
            Ok(face) => face.measure(text, font_size as f32).width,
            Err(_) => estimate_text_width(text, font_size),
        }
    }

    /// Anchor point of `spec` on an image of the given size.
    pub fn placement(&self, spec: &WatermarkSpec, image: &ImageDimensions) -> PlacementPosition {
        let text_width = self.text_width(&spec.text, spec.font_size);
        anchor_point(spec.anchor, image, text_width, spec.font_size)
    }

    /// Composite the watermark described by `spec` onto a copy of `image`.
    ///
    /// Returns the input unchanged when `spec.text` is empty.
    pub fn composite(
        &self,
        image: &RasterImage,
        spec: &WatermarkSpec,
    ) -> Result<RasterImage, WatermarkError> {
        if spec.is_empty() {
            return Ok(image.clone());
        }
        spec.validate().map_err(WatermarkError::ConfigError)?;

        let typeface = self.typeface.as_ref().map_err(Clone::clone)?;

        let dims = ImageDimensions {
            width: image.width(),
            height: image.height(),
        };
        let anchor = self.placement(spec, &dims);
        let text_width = typeface.measure(&spec.text, spec.font_size as f32).width;

        // Center column anchors mark the middle of the text advance
        let text_start = match spec.anchor.column() {
            Column::Center => anchor.x - (text_width / 2) as i32,
            Column::Left | Column::Right => anchor.x,
        };

        let rendered = render_text(
            typeface,
            &TextRenderOptions {
                text: spec.text.clone(),
                font_size: spec.font_size as f32,
                opacity: spec.alpha(),
                shadow_radius: SHADOW_RADIUS,
                window: Some(TextWindow::for_image(
                    text_start,
                    anchor.y,
                    dims.width,
                    dims.height,
                )),
            },
        )?;

        let layer = WatermarkLayer {
            position: PlacementPosition::new(
                text_start - rendered.origin_x,
                anchor.y - rendered.baseline_y,
            ),
            image: rendered.image,
        };

        tracing::debug!(
            anchor = %spec.anchor,
            x = anchor.x,
            y = anchor.y,
            text_width = rendered.metrics.width,
            "Compositing text watermark"
        );

        let mut canvas = image.to_rgba();
        blend_layer(&mut canvas, &layer);

        image
            .with_rgba(canvas)
            .map_err(|e| WatermarkError::CompositeError(e.to_string()))
    }
}

/// Composite `spec` onto `image` with the embedded face.
pub fn composite(image: &RasterImage, spec: &WatermarkSpec) -> Result<RasterImage, WatermarkError> {
    TextCompositor::default().composite(image, spec)
}

/// Blend a single watermark layer onto the target image, clipped to its bounds.
pub fn blend_layer(target: &mut RgbaImage, layer: &WatermarkLayer) {
    let target_width = target.width() as i64;
    let target_height = target.height() as i64;

    let x0 = layer.position.x as i64;
    let y0 = layer.position.y as i64;

    let x_start = x0.max(0);
    let y_start = y0.max(0);
    let x_end = (x0 + layer.image.width() as i64).min(target_width);
    let y_end = (y0 + layer.image.height() as i64).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wm_pixel = *layer.image.get_pixel((tx - x0) as u32, (ty - y0) as u32);
            if wm_pixel[3] == 0 {
                continue;
            }

            let target_pixel = *target.get_pixel(tx as u32, ty as u32);
            target.put_pixel(
                tx as u32,
                ty as u32,
                blend_pixels(target_pixel, wm_pixel, 1.0),
            );
        }
    }
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
