// Watermark placement and compositing tests

use pixelguard::raster::{FormatClass, RasterImage};
use pixelguard::watermark::{
    anchor_point, composite, estimate_text_width, Anchor, ImageDimensions, PlacementPosition,
    TextCompositor, WatermarkError, WatermarkSpec,
};
use rstest::rstest;

const W: u32 = 640;
const H: u32 = 480;
const TEXT_WIDTH: u32 = 120;
const FONT_SIZE: u32 = 36;

#[rstest]
#[case::top_left(Anchor::TopLeft, 30, 66)]
#[case::top_center(Anchor::TopCenter, 320, 66)]
#[case::top_right(Anchor::TopRight, 490, 66)]
#[case::middle_left(Anchor::MiddleLeft, 30, 240)]
#[case::middle_center(Anchor::MiddleCenter, 320, 240)]
#[case::middle_right(Anchor::MiddleRight, 490, 240)]
#[case::bottom_left(Anchor::BottomLeft, 30, 450)]
#[case::bottom_center(Anchor::BottomCenter, 320, 450)]
#[case::bottom_right(Anchor::BottomRight, 490, 450)]
fn test_anchor_table(#[case] anchor: Anchor, #[case] x: i32, #[case] y: i32) {
    let dims = ImageDimensions {
        width: W,
        height: H,
    };
    assert_eq!(
        anchor_point(anchor, &dims, TEXT_WIDTH, FONT_SIZE),
        PlacementPosition::new(x, y)
    );
}

#[test]
fn test_anchor_names_round_trip() {
    for anchor in Anchor::ALL {
        let parsed: Anchor = anchor.to_string().parse().unwrap();
        assert_eq!(parsed, anchor);
    }
    assert_eq!(Anchor::default(), Anchor::BottomRight);
}

#[test]
fn test_placement_without_font_uses_estimate() {
    let compositor = TextCompositor::unavailable("no font");
    let spec = WatermarkSpec::new("abcd", Anchor::BottomRight, 50, 20);
    let dims = ImageDimensions {
        width: 200,
        height: 100,
    };

    assert_eq!(estimate_text_width("abcd", 20), 40);
    assert_eq!(compositor.placement(&spec, &dims), PlacementPosition::new(130, 70));
}

#[test]
fn test_measured_width_is_used_when_font_loads() {
    let compositor = TextCompositor::default();
    assert!(compositor.is_available());

    let narrow = compositor.text_width("iii", 24);
    let wide = compositor.text_width("WWW", 24);
    assert!(narrow > 0);
    assert!(wide > narrow);
}

fn flat(width: u32, height: u32, channels: u8, value: u8) -> RasterImage {
    let len = (width * height * channels as u32) as usize;
    RasterImage::new(width, height, channels, FormatClass::Lossless, vec![value; len]).unwrap()
}

#[test]
fn test_composite_marks_only_the_anchor_region() {
    let image = flat(300, 200, 3, 40);
    let spec = WatermarkSpec::new("PROTECTED", Anchor::TopLeft, 100, 24);

    let marked = composite(&image, &spec).unwrap();
    assert_eq!(marked.width(), 300);
    assert_eq!(marked.channels(), 3);
    assert_eq!(marked.format(), FormatClass::Lossless);

    let changed: Vec<(u32, u32)> = (0..200u32)
        .flat_map(|y| (0..300u32).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let i = ((y * 300 + x) * 3) as usize;
            marked.samples()[i..i + 3] != image.samples()[i..i + 3]
        })
        .collect();

    assert!(!changed.is_empty());
    // top-left text sits near (30, 54) and never reaches the bottom-right quadrant
    assert!(changed.iter().all(|&(x, y)| x < 250 && y < 100));
    assert!(changed.iter().any(|&(x, y)| x >= 25 && y >= 30 && y <= 60));
}

#[test]
fn test_composite_brightens_dark_background() {
    let image = flat(200, 100, 3, 0);
    let spec = WatermarkSpec::new("W", Anchor::MiddleCenter, 100, 40);
    let marked = composite(&image, &spec).unwrap();

    let max_red = marked.samples().chunks(3).map(|px| px[0]).max().unwrap();
    assert!(max_red > 200, "white fill expected, got {}", max_red);
}

#[test]
fn test_composite_identity_cases() {
    let image = flat(64, 64, 3, 90);

    let empty = WatermarkSpec::new("", Anchor::TopLeft, 100, 24);
    assert_eq!(composite(&image, &empty).unwrap(), image);

    let invisible = WatermarkSpec::new("hidden", Anchor::TopLeft, 0, 24);
    assert_eq!(composite(&image, &invisible).unwrap(), image);
}

#[test]
fn test_text_outside_image_is_clipped() {
    let image = flat(40, 40, 3, 10);
    let spec = WatermarkSpec::new("A VERY LONG WATERMARK", Anchor::BottomRight, 80, 30);
    let marked = composite(&image, &spec).unwrap();
    assert_eq!(marked.samples().len(), image.samples().len());
}

#[test]
fn test_unavailable_font_is_a_recoverable_error() {
    let compositor = TextCompositor::unavailable("font missing");
    let spec = WatermarkSpec::new("x", Anchor::TopLeft, 50, 12);
    let err = compositor.composite(&flat(20, 20, 3, 0), &spec).unwrap_err();
    assert!(matches!(err, WatermarkError::FontUnavailable(_)));
}

#[test]
fn test_invalid_spec_is_rejected() {
    let spec = WatermarkSpec::new("x", Anchor::TopLeft, 150, 12);
    assert!(composite(&flat(20, 20, 3, 0), &spec).is_err());
}

#[rstest]
#[case::top_left(Anchor::TopLeft)]
#[case::middle_center(Anchor::MiddleCenter)]
#[case::bottom_right(Anchor::BottomRight)]
fn test_huge_font_on_small_image_never_aborts(#[case] anchor: Anchor) {
    use super::fixtures::png_bytes;
    use pixelguard::metadata::MetadataSpec;
    use pixelguard::noise::NoiseSpec;
    use pixelguard::protection::{process, PipelineState};
    use pixelguard::raster::decode;

    let source = png_bytes(64, 64);
    let spec = WatermarkSpec::new("W", anchor, 70, 100_000);
    let output = process(
        &source,
        None,
        &spec,
        &MetadataSpec::default(),
        &NoiseSpec::disabled(),
    )
    .unwrap();

    let outcome = output.report.outcome(PipelineState::Watermarked).unwrap();
    assert!(outcome.is_applied() || outcome.is_fallback(), "{:?}", outcome);
    assert_eq!((output.width, output.height), (64, 64));
    if outcome.is_fallback() {
        let before = decode(&source, None).unwrap();
        let after = decode(&output.bytes, None).unwrap();
        assert_eq!(after.samples(), before.samples());
    }
}

#[test]
fn test_glyph_too_large_to_draw_is_a_render_error() {
    let spec = WatermarkSpec::new("W", Anchor::MiddleCenter, 70, 100_000);
    let err = composite(&flat(64, 64, 3, 20), &spec).unwrap_err();
    assert!(matches!(err, WatermarkError::RenderError(_)));
}

#[test]
fn test_long_label_is_clipped_to_the_image() {
    let image = flat(64, 64, 3, 20);
    let spec = WatermarkSpec::new(&"PROTECTED ".repeat(2000), Anchor::TopLeft, 100, 36);
    let marked = composite(&image, &spec).unwrap();
    assert_ne!(marked, image);
}
