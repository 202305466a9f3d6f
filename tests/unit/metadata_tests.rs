// Metadata protector tests: strategy chain, merging and inspection

use super::fixtures::{jpeg_bytes, jpeg_with_camera_exif, png_bytes, png_with_text};
use pixelguard::constants::{ARTIST_NOTICE, COPYRIGHT_NOTICE, DESCRIPTION_NOTICE};
use pixelguard::metadata::{
    extract_metadata, protect, CanonicalExif, InjectionStrategy, MetadataError,
    MetadataProtector, MetadataSpec, PngText, SourceMetadata, TagKey,
};
use pixelguard::raster::FormatClass;

fn protect_with(
    protector: &MetadataProtector,
    source: &[u8],
    format: FormatClass,
) -> Result<Vec<u8>, MetadataError> {
    protector
        .protect(
            source,
            format,
            &SourceMetadata::read(source),
            &MetadataSpec::default(),
        )
        .map(|tagged| tagged.bytes)
}

#[test]
fn test_canonical_tags_written_without_source_container() {
    for (bytes, format) in [
        (jpeg_bytes(20, 20), FormatClass::Lossy),
        (png_bytes(20, 20), FormatClass::Lossless),
    ] {
        let tagged = protect(
            &bytes,
            format,
            &SourceMetadata::default(),
            &MetadataSpec::default(),
        )
        .unwrap();
        assert_eq!(tagged.strategy, Some("canonical-exif"));

        let snapshot = extract_metadata(&tagged.bytes).unwrap();
        assert!(snapshot.has_container);
        assert_eq!(snapshot.exif_value("Copyright"), Some(COPYRIGHT_NOTICE));
        assert_eq!(snapshot.exif_value("ImageDescription"), Some(DESCRIPTION_NOTICE));
        assert_eq!(snapshot.exif_value("Artist"), Some(ARTIST_NOTICE));
    }
}

#[test]
fn test_merge_keeps_foreign_tags_and_overrides_collisions() {
    let source = jpeg_with_camera_exif(20, 20);
    let tagged = protect(
        &source,
        FormatClass::Lossy,
        &SourceMetadata::read(&source),
        &MetadataSpec::default(),
    )
    .unwrap();
    assert_eq!(tagged.strategy, Some("merged-exif"));

    let snapshot = extract_metadata(&tagged.bytes).unwrap();
    assert_eq!(snapshot.exif_value("Make"), Some("TestCam"));
    assert_eq!(snapshot.exif_value("Copyright"), Some(COPYRIGHT_NOTICE));
    assert_eq!(
        snapshot.exif.iter().filter(|e| e.tag == "Copyright").count(),
        1
    );
}

#[test]
fn test_user_comment_is_optional() {
    let spec = MetadataSpec {
        enabled: true,
        include_user_comment: false,
    };
    let bytes = png_bytes(10, 10);
    let tagged = protect(&bytes, FormatClass::Lossless, &SourceMetadata::default(), &spec).unwrap();

    let snapshot = extract_metadata(&tagged.bytes).unwrap();
    assert_eq!(snapshot.protection_value(TagKey::UserComment), None);
    assert!(snapshot.protection_value(TagKey::Copyright).is_some());
}

#[test]
fn test_png_text_is_the_lossless_fallback() {
    let protector = MetadataProtector::new(vec![Box::new(PngText)]);
    let tagged = protect_with(&protector, &png_bytes(10, 10), FormatClass::Lossless).unwrap();

    let snapshot = extract_metadata(&tagged).unwrap();
    assert!(snapshot.exif.is_empty());
    assert_eq!(snapshot.text_value("Copyright"), Some(COPYRIGHT_NOTICE));
    assert_eq!(snapshot.text_value("Author"), Some(ARTIST_NOTICE));
    assert_eq!(snapshot.protection_value(TagKey::ImageDescription), Some(DESCRIPTION_NOTICE));
}

#[test]
fn test_lossy_output_without_exif_strategies_fails() {
    let protector = MetadataProtector::new(vec![Box::new(PngText)]);
    let err = protect_with(&protector, &jpeg_bytes(10, 10), FormatClass::Lossy).unwrap_err();
    assert!(matches!(err, MetadataError::AllStrategiesFailed(_)));
}

#[test]
fn test_existing_png_text_is_carried_over() {
    let source = png_with_text(12, 12);
    let protector = MetadataProtector::new(vec![Box::new(CanonicalExif)]);
    let tagged = protect_with(&protector, &source, FormatClass::Lossless).unwrap();

    let snapshot = extract_metadata(&tagged).unwrap();
    assert_eq!(snapshot.text_value("Software"), Some("fixture-writer"));
    assert_eq!(snapshot.exif_value("Copyright"), Some(COPYRIGHT_NOTICE));
}

#[test]
fn test_disabled_spec_preserves_container() {
    let source = jpeg_with_camera_exif(16, 16);
    let bare = jpeg_bytes(16, 16);
    let tagged = protect(
        &bare,
        FormatClass::Lossy,
        &SourceMetadata::read(&source),
        &MetadataSpec::disabled(),
    )
    .unwrap();

    assert_eq!(tagged.strategy, None);
    assert_eq!(
        SourceMetadata::read(&tagged.bytes).exif,
        SourceMetadata::read(&source).exif
    );
}

#[test]
fn test_strategy_names_in_order() {
    let names = MetadataProtector::default().strategy_names();
    assert_eq!(names, vec!["merged-exif", "canonical-exif", "png-text"]);
    assert!(!PngText.supports(FormatClass::Lossy));
}

#[test]
fn test_extract_metadata_rejects_garbage() {
    assert!(matches!(
        extract_metadata(b"GIF? no."),
        Err(MetadataError::UnrecognizedImage(_))
    ));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let source = jpeg_with_camera_exif(16, 16);
    let snapshot = extract_metadata(&source).unwrap();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["format"], "lossy");
    assert_eq!(json["width"], 16);
    assert_eq!(json["has_container"], true);
    assert!(json["exif"].as_array().unwrap().len() >= 3);
}
