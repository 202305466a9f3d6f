//! Text watermark rendering.
//!
//! Renders a label into a transparent RGBA layer: white glyphs at the
//! requested opacity over a blurred dark shadow that keeps the text legible
//! on light backgrounds. The layer records where its baseline and text start
//! sit so the compositor can place it on an anchor point.
//!
//! The default face is DejaVu Sans Bold, embedded in the binary. A TrueType
//! or OpenType file can be configured instead.

use super::compositor::blend_pixels;
use super::WatermarkError;
use crate::constants::{MAX_RENDER_PIXELS, SHADOW_ALPHA, SHADOW_RADIUS};
use ab_glyph::{Font, FontArc, FontRef, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::sync::OnceLock;

/// Embedded bold sans-serif face (DejaVu Sans Bold, Bitstream Vera license).
const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("fonts/DejaVuSans-Bold.ttf");

/// Shadow is drawn this many pixels down and to the right of the glyphs.
const SHADOW_OFFSET: i32 = 1;

static DEFAULT_FONT: OnceLock<Option<FontRef<'static>>> = OnceLock::new();

fn embedded_font() -> Result<&'static FontRef<'static>, WatermarkError> {
    DEFAULT_FONT
        .get_or_init(|| FontRef::try_from_slice(EMBEDDED_FONT_DATA).ok())
        .as_ref()
        .ok_or_else(|| {
            WatermarkError::FontUnavailable("embedded font could not be parsed".to_string())
        })
}

/// A loaded font face.
#[derive(Clone)]
pub struct Typeface {
    font: FontArc,
    source: String,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("source", &self.source)
            .finish()
    }
}

impl Typeface {
    /// The embedded bold sans-serif face.
    pub fn embedded() -> Result<Self, WatermarkError> {
        let font = embedded_font()?;
        Ok(Self {
            font: FontArc::new(font.clone()),
            source: "embedded:DejaVuSans-Bold".to_string(),
        })
    }

    /// Load a face from a font file.
    pub fn from_file(path: &Path) -> Result<Self, WatermarkError> {
        let data = std::fs::read(path).map_err(|e| {
            WatermarkError::FontUnavailable(format!("{}: {}", path.display(), e))
        })?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            WatermarkError::FontUnavailable(format!("{}: {}", path.display(), e))
        })?;

        Ok(Self {
            font: FontArc::new(font),
            source: path.display().to_string(),
        })
    }

    /// Load the configured face, or the embedded one when none is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, WatermarkError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Measure a single line of text at `font_size` pixels.
    pub fn measure(&self, text: &str, font_size: f32) -> TextMetrics {
        let scaled = self.font.as_scaled(PxScale::from(font_size));

        let mut width = 0.0f32;
        let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

        for c in text.chars() {
            let glyph_id = scaled.glyph_id(c);
            if let Some(prev) = prev_glyph {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        TextMetrics {
            width: width.max(0.0).ceil() as u32,
            ascent: scaled.ascent(),
            descent: scaled.descent(),
        }
    }
}

/// Measured extent of a line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance width in pixels, kerning included
    pub width: u32,
    /// Distance from baseline to the top of the tallest glyph
    pub ascent: f32,
    /// Distance from baseline to the bottom of the lowest glyph (negative)
    pub descent: f32,
}

impl TextMetrics {
    pub fn line_height(&self) -> u32 {
        (self.ascent - self.descent).max(0.0).ceil() as u32
    }
}

/// Options for text rendering.
#[derive(Debug, Clone)]
pub struct TextRenderOptions {
    pub text: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Opacity (0.0 to 1.0) applied to both text and shadow.
    pub opacity: f32,
    /// Blur radius of the shadow in pixels; 0 disables the shadow.
    pub shadow_radius: u32,
    /// Only this part of the layer is rasterized; `None` renders all of it.
    pub window: Option<TextWindow>,
}

impl Default for TextRenderOptions {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 24.0,
            opacity: 0.5,
            shadow_radius: SHADOW_RADIUS,
            window: None,
        }
    }
}

/// Rectangle in text coordinates: x = 0 is where the advance starts and
/// y = 0 is the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextWindow {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl TextWindow {
    /// The target image rectangle seen from a text start at `(x, y)`.
    pub fn for_image(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x: -(x as i64),
            y: -(y as i64),
            width,
            height,
        }
    }
}

/// A rendered text layer.
#[derive(Clone)]
pub struct RenderedText {
    pub image: RgbaImage,
    /// Column inside `image` where the text advance starts
    pub origin_x: i32,
    /// Row inside `image` of the text baseline
    pub baseline_y: i32,
    pub metrics: TextMetrics,
}

impl std::fmt::Debug for RenderedText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedText")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("origin_x", &self.origin_x)
            .field("baseline_y", &self.baseline_y)
            .finish()
    }
}

/// Render text to a transparent RGBA layer.
///
/// With a window the layer covers only that rectangle plus the shadow
/// reach, so text far larger than the target never allocates more than the
/// visible area. Fails when the text is empty, has no drawable glyph (for
/// example whitespace only), or a visible glyph is larger than
/// [`MAX_RENDER_PIXELS`].
pub fn render_text(
    typeface: &Typeface,
    options: &TextRenderOptions,
) -> Result<RenderedText, WatermarkError> {
    if options.text.is_empty() {
        return Err(WatermarkError::RenderError(
            "Cannot render empty text".to_string(),
        ));
    }
    if !(options.font_size.is_finite() && options.font_size > 0.0) {
        return Err(WatermarkError::ConfigError(format!(
            "font size must be positive, got {}",
            options.font_size
        )));
    }

    let scale = PxScale::from(options.font_size);
    let metrics = typeface.measure(&options.text, options.font_size);

    let pad = options.shadow_radius as i64 * 2 + SHADOW_OFFSET as i64 + 1;
    let mut left = -pad;
    let mut top = -(metrics.ascent.ceil() as i64) - pad;
    let mut right = metrics.width as i64 + pad;
    let mut bottom = top + metrics.line_height() as i64 + 2 * pad;

    if let Some(window) = options.window {
        left = left.max(window.x - pad);
        top = top.max(window.y - pad);
        right = right.min(window.x + window.width as i64 + pad);
        bottom = bottom.min(window.y + window.height as i64 + pad);
    }

    if right <= left || bottom <= top {
        // Nothing of the text reaches the window
        return Ok(RenderedText {
            image: RgbaImage::new(1, 1),
            origin_x: layer_offset(-left)?,
            baseline_y: layer_offset(-top)?,
            metrics,
        });
    }

    let canvas_width = (right - left) as u64;
    let canvas_height = (bottom - top) as u64;
    if canvas_width * canvas_height > MAX_RENDER_PIXELS {
        return Err(WatermarkError::RenderError(format!(
            "text layer of {}x{} pixels is too large",
            canvas_width, canvas_height
        )));
    }
    let canvas_width = canvas_width as u32;
    let canvas_height = canvas_height as u32;

    let origin_x = layer_offset(-left)?;
    let baseline_y = layer_offset(-top)?;

    let coverage = rasterize_coverage(
        typeface,
        &options.text,
        scale,
        origin_x as f32,
        baseline_y as f32,
        canvas_width,
        canvas_height,
    )?;

    let opacity = options.opacity.clamp(0.0, 1.0);
    let mut image = if options.shadow_radius > 0 {
        shadow_layer(&coverage, canvas_width, canvas_height, opacity, options.shadow_radius)
    } else {
        RgbaImage::new(canvas_width, canvas_height)
    };

    let text_alpha = opacity * 255.0;
    for (idx, cov) in coverage.iter().enumerate() {
        let alpha = (cov * text_alpha).round().clamp(0.0, 255.0) as u8;
        if alpha == 0 {
            continue;
        }
        let x = idx as u32 % canvas_width;
        let y = idx as u32 / canvas_width;
        let below = *image.get_pixel(x, y);
        image.put_pixel(x, y, blend_pixels(below, Rgba([255, 255, 255, alpha]), 1.0));
    }

    Ok(RenderedText {
        image,
        origin_x,
        baseline_y,
        metrics,
    })
}

fn layer_offset(value: i64) -> Result<i32, WatermarkError> {
    i32::try_from(value).map_err(|_| {
        WatermarkError::RenderError(format!("text offset {} is out of range", value))
    })
}

/// Rasterize glyph coverage (0.0-1.0) for a line of text into a row-major buffer.
///
/// Glyphs entirely outside the buffer are skipped without being drawn.
fn rasterize_coverage(
    typeface: &Typeface,
    text: &str,
    scale: PxScale,
    start_x: f32,
    baseline_y: f32,
    width: u32,
    height: u32,
) -> Result<Vec<f32>, WatermarkError> {
    let font = &typeface.font;
    let scaled = font.as_scaled(scale);
    let mut coverage = vec![0.0f32; width as usize * height as usize];

    let mut cursor_x = start_x;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;
    let mut drawable = false;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            drawable = true;
            let bounds = outlined.px_bounds();
            let visible = bounds.max.x > 0.0
                && bounds.max.y > 0.0
                && bounds.min.x < width as f32
                && bounds.min.y < height as f32;

            if visible {
                let area = (bounds.width() as f64) * (bounds.height() as f64);
                if area > MAX_RENDER_PIXELS as f64 {
                    return Err(WatermarkError::RenderError(format!(
                        "glyph '{}' at {}px is too large to rasterize",
                        c, scale.y
                    )));
                }

                outlined.draw(|px, py, cov| {
                    let x = px as i64 + bounds.min.x as i64;
                    let y = py as i64 + bounds.min.y as i64;
                    if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
                        let idx = y as usize * width as usize + x as usize;
                        coverage[idx] = (coverage[idx] + cov).min(1.0);
                    }
                });
            }
        }

        cursor_x += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    if !drawable {
        return Err(WatermarkError::RenderError(format!(
            "text '{}' produced no visible glyphs",
            text
        )));
    }

    Ok(coverage)
}

/// Dark, offset and blurred copy of the glyph coverage.
fn shadow_layer(coverage: &[f32], width: u32, height: u32, opacity: f32, radius: u32) -> RgbaImage {
    let mut shadow = RgbaImage::new(width, height);
    let max_alpha = f32::from(SHADOW_ALPHA) * opacity;

    for (idx, cov) in coverage.iter().enumerate() {
        if *cov <= 0.0 {
            continue;
        }
        let x = (idx as u32 % width) as i32 + SHADOW_OFFSET;
        let y = (idx as u32 / width) as i32 + SHADOW_OFFSET;
        if x < width as i32 && y < height as i32 {
            let alpha = (cov * max_alpha).round().clamp(0.0, 255.0) as u8;
            shadow.put_pixel(x as u32, y as u32, Rgba([0, 0, 0, alpha]));
        }
    }

    image::imageops::blur(&shadow, radius as f32 / 2.0)
}
