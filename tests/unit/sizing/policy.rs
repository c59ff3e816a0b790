use super::*;

fn model(binding: BindingType, cover_aspect: f64, spine_aspect: f64) -> BookModel {
    BookModel {
        binding,
        cover_aspect,
        spine_aspect,
        normalization: 1.0 / 1600.0,
    }
}

#[test]
fn fixed_width_scenario_matches_formula() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::PerfectBound, 0.75, 0.1);
    let vp = compute_viewport(&m, ScalingMode::FixedWidth, 1200.0, &calib).unwrap();

    let inv: f64 = 0.75 + 0.1 * 0.4;
    assert_eq!(vp.output_width_px, 1200);
    assert_eq!(vp.output_height_px, (1200.0 * 1.2 / inv).round() as u32);
    assert!((vp.camera_zoom - 1200.0 / inv / 1.3).abs() < 1e-9);
    assert!(!vp.clamped);
    assert!((vp.pixel_count() as f64) < calib.max_pixels);
    assert!((vp.device_pixel_ratio - 1823.0 / 600.0).abs() < 1e-9);
}

#[test]
fn fixed_height_frames_like_fixed_width() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::Hardcover, 0.7, 0.12);
    let w = compute_viewport(&m, ScalingMode::FixedWidth, 1000.0, &calib).unwrap();
    let h = compute_viewport(
        &m,
        ScalingMode::FixedHeight,
        f64::from(w.output_height_px),
        &calib,
    )
    .unwrap();
    assert!((i64::from(h.output_width_px) - i64::from(w.output_width_px)).abs() <= 1);
    assert!((h.camera_zoom - w.camera_zoom).abs() / w.camera_zoom < 1e-3);
}

#[test]
fn saddlestitch_ignores_spine_in_aggregate() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::Saddlestitch, 0.75, 0.3);
    assert_eq!(item_scaling_inv(&m, &calib), 0.75);
}

#[test]
fn oversized_square_request_is_clamped_uniformly() {
    let calib = SizingCalibration::default();
    // inv = 1.2 makes a FixedWidth 5000 request exactly 5000x5000.
    let m = model(BindingType::Saddlestitch, 1.2, 0.0);
    let raw = raw_viewport(&m, ScalingMode::FixedWidth, 5000.0, &calib).unwrap();
    assert!((raw.height - 5000.0).abs() < 1e-9);

    let vp = compute_viewport(&m, ScalingMode::FixedWidth, 5000.0, &calib).unwrap();
    assert!(vp.clamped);
    assert!(vp.pixel_count() as f64 <= calib.max_pixels);
    assert_eq!(vp.output_width_px, vp.output_height_px);

    let s = (raw.width * raw.height / calib.max_pixels).sqrt();
    assert!((vp.camera_zoom - raw.zoom / s).abs() < 1e-9);
    assert!((f64::from(vp.output_width_px) - raw.width / s).abs() < 1.0);
}

#[test]
fn clamp_preserves_aspect_for_wide_books() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::PerfectBound, 3.0, 0.2);
    let raw = raw_viewport(&m, ScalingMode::FixedHeight, 4000.0, &calib).unwrap();
    let vp = compute_viewport(&m, ScalingMode::FixedHeight, 4000.0, &calib).unwrap();
    assert!(vp.clamped);
    let before = raw.width / raw.height;
    let after = f64::from(vp.output_width_px) / f64::from(vp.output_height_px);
    assert!((before - after).abs() / before < 1e-3);
}

#[test]
fn device_pixel_ratio_never_below_one() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::PerfectBound, 0.75, 0.1);
    let vp = compute_viewport(&m, ScalingMode::FixedWidth, 200.0, &calib).unwrap();
    assert_eq!(vp.device_pixel_ratio, 1.0);
    assert_eq!(vp.viewport_width(), 200.0);
    assert_eq!(vp.logical_zoom(), vp.camera_zoom);
}

#[test]
fn large_output_previews_at_reference_size() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::PerfectBound, 0.75, 0.1);
    let vp = compute_viewport(&m, ScalingMode::FixedHeight, 2400.0, &calib).unwrap();
    assert!((vp.viewport_height() - 600.0).abs() < 1e-9);
    assert!((vp.logical_zoom() * vp.device_pixel_ratio - vp.camera_zoom).abs() < 1e-9);
}

#[test]
fn rejects_non_positive_targets() {
    let calib = SizingCalibration::default();
    let m = model(BindingType::PerfectBound, 0.75, 0.1);
    for t in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        assert!(compute_viewport(&m, ScalingMode::FixedWidth, t, &calib).is_err());
    }
}

#[test]
fn calibration_validation() {
    assert!(SizingCalibration::default().validate().is_ok());
    let bad = SizingCalibration {
        zoom_baseline: 0.0,
        ..SizingCalibration::default()
    };
    assert!(bad.validate().is_err());
    let no_spine = SizingCalibration {
        spine_blend: 0.0,
        ..SizingCalibration::default()
    };
    assert!(no_spine.validate().is_ok());
}

#[test]
fn calibration_deserializes_partial_json() {
    let c: SizingCalibration = serde_json::from_str(r#"{ "max_pixels": 1000000 }"#).unwrap();
    assert_eq!(c.max_pixels, 1_000_000.0);
    assert_eq!(c.h_ratio, 1.2);
}
