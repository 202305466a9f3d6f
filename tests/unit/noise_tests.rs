// Noise synthesis tests

use pixelguard::noise::{amplitude_for, synthesize, NoiseError, NoiseMethod, NoiseSpec};
use pixelguard::raster::{FormatClass, RasterImage};
use rstest::rstest;

#[test]
fn test_amplitude_is_bounded_and_strictly_increasing() {
    let amplitudes: Vec<f64> = (1..=10u8).map(amplitude_for).collect();
    for (intensity, amplitude) in (1..=10).zip(&amplitudes) {
        let expected = intensity as f64 / 10.0 * 0.019 + 0.001;
        assert!((amplitude - expected).abs() < 1e-12);
        assert!((0.001..=0.02).contains(amplitude));
    }
    assert!(amplitudes.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_disabled_spec_has_no_amplitude() {
    assert_eq!(NoiseSpec::disabled().amplitude(), None);
    assert!(NoiseSpec::new(5, NoiseMethod::Uniform).amplitude().is_some());
}

#[rstest]
#[case(NoiseMethod::Gaussian)]
#[case(NoiseMethod::Uniform)]
#[case(NoiseMethod::Structured)]
fn test_buffer_shape_and_bounds(#[case] method: NoiseMethod) {
    let amplitude = amplitude_for(10);
    let noise = synthesize(37, 11, 3, amplitude, method).unwrap();
    assert_eq!(noise.samples().len(), 37 * 11 * 3);

    // uniform and structured are hard-bounded by amplitude*255 (plus rounding)
    let bound = (amplitude * 255.0).ceil() as i16 + 1;
    let max = (0..noise.samples().len())
        .filter_map(|i| noise.offset(i))
        .map(i16::abs)
        .max()
        .unwrap();
    match method {
        NoiseMethod::Gaussian => assert!(max <= 127),
        _ => assert!(max <= bound * 3, "offset {} exceeds {}", max, bound),
    }
}

#[test]
fn test_gaussian_noise_is_centered() {
    let noise = synthesize(200, 200, 3, amplitude_for(10), NoiseMethod::Gaussian).unwrap();
    let n = noise.samples().len() as f64;
    let mean = (0..noise.samples().len())
        .filter_map(|i| noise.offset(i))
        .map(f64::from)
        .sum::<f64>()
        / n;
    assert!(mean.abs() < 0.2, "mean offset {}", mean);
}

#[test]
fn test_structured_noise_is_deterministic_and_shared_across_channels() {
    let a = synthesize(64, 32, 4, amplitude_for(10), NoiseMethod::Structured).unwrap();
    let b = synthesize(64, 32, 4, amplitude_for(10), NoiseMethod::Structured).unwrap();
    assert_eq!(a, b);
    for pixel in a.samples().chunks(4) {
        assert!(pixel.iter().all(|s| *s == pixel[0]));
    }
}

#[test]
fn test_invalid_dimensions_are_errors() {
    assert!(matches!(
        synthesize(0, 10, 3, 0.01, NoiseMethod::Gaussian),
        Err(NoiseError::InvalidDimensions { .. })
    ));
    assert!(matches!(
        synthesize(10, 10, 0, 0.01, NoiseMethod::Uniform),
        Err(NoiseError::InvalidDimensions { .. })
    ));
    assert!(matches!(
        synthesize(10, 10, 3, f64::NAN, NoiseMethod::Uniform),
        Err(NoiseError::InvalidAmplitude(_))
    ));
}

#[test]
fn test_apply_clamps_and_skips_alpha() {
    let mut bright = RasterImage::new(8, 8, 4, FormatClass::Lossless, vec![255; 256]).unwrap();
    let noise = synthesize(8, 8, 4, amplitude_for(10), NoiseMethod::Uniform).unwrap();
    noise.apply_to(&mut bright).unwrap();

    for pixel in bright.samples().chunks(4) {
        assert_eq!(pixel[3], 255);
    }

    let mut wrong = RasterImage::new(4, 4, 3, FormatClass::Lossy, vec![0; 48]).unwrap();
    assert!(matches!(
        noise.apply_to(&mut wrong),
        Err(NoiseError::ShapeMismatch { .. })
    ));
}
