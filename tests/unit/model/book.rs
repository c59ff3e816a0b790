use super::*;
use crate::model::units::Unit;

fn bmp(w: u32, h: u32) -> Bitmap {
    Bitmap::solid(w, h, [200, 200, 200, 255]).unwrap()
}

#[test]
fn perfect_bound_takes_both_aspects() {
    let m = BookModel::derive(
        &bmp(1200, 1600),
        Some(&bmp(160, 1600)),
        BindingType::PerfectBound,
        None,
    )
    .unwrap();
    assert!((m.cover_aspect - 0.75).abs() < 1e-12);
    assert!((m.spine_aspect - 0.1).abs() < 1e-12);
    assert!((m.normalization - 1.0 / 1600.0).abs() < 1e-15);
}

#[test]
fn missing_spine_is_configuration_error() {
    for b in [BindingType::PerfectBound, BindingType::Hardcover] {
        let err = BookModel::derive(&bmp(10, 10), None, b, None).unwrap_err();
        assert!(matches!(err, BookmockError::Configuration(_)), "{b}");
    }
}

#[test]
fn saddlestitch_ignores_spine() {
    let m = BookModel::derive(
        &bmp(600, 800),
        Some(&bmp(999, 1)),
        BindingType::Saddlestitch,
        None,
    )
    .unwrap();
    assert_eq!(m.spine_aspect, 0.0);
}

#[test]
fn spiral_bound_uses_explicit_width() {
    let width = SpineWidth {
        value: 0.5,
        unit: Unit::Inches,
    };
    let m = BookModel::derive(&bmp(1500, 3000), None, BindingType::SpiralBound, Some(width))
        .unwrap();
    assert!((m.spine_aspect - 150.0 / 3000.0).abs() < 1e-12);

    assert!(matches!(
        BookModel::derive(&bmp(10, 10), None, BindingType::SpiralBound, None),
        Err(BookmockError::Configuration(_))
    ));
    let zero = SpineWidth {
        value: 0.0,
        unit: Unit::Pixels,
    };
    assert!(BookModel::derive(&bmp(10, 10), None, BindingType::SpiralBound, Some(zero)).is_err());
}

#[test]
fn extreme_aspects_stay_finite() {
    let m = BookModel::derive(
        &bmp(1000, 10),
        Some(&bmp(1, 100)),
        BindingType::Hardcover,
        None,
    )
    .unwrap();
    assert_eq!(m.cover_aspect, 100.0);
    assert_eq!(m.spine_aspect, 0.01);
}
