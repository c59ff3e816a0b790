use super::*;

#[test]
fn empty_object_is_all_defaults() {
    let cfg = MockupConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, MockupConfig::default());
    assert_eq!(cfg.units.min_px, 600.0);
    assert_eq!(cfg.sizing.max_pixels, 7_200_000.0);
    assert_eq!(cfg.render.clear_rgba, [0, 0, 0, 0]);
}

#[test]
fn partial_sections_merge_with_defaults() {
    let cfg = MockupConfig::from_json_str(
        r#"{ "render": { "shadow_samples": 4 }, "units": { "max_px": 4000 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.render.shadow_samples, Some(4));
    assert_eq!(cfg.render.shadow_map_size, 256);
    assert_eq!(cfg.units.max_px, 4000.0);
    assert_eq!(cfg.units.min_px, 600.0);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        MockupConfig::from_json_str(r#"{ "sizing": { "h_ratio": -1 } }"#),
        Err(BookmockError::Validation(_))
    ));
    assert!(MockupConfig::from_json_str(r#"{ "render": { "shadow_map_size": 2 } }"#).is_err());
    assert!(MockupConfig::from_json_str(r#"{ "render": { "shadow_samples": 0 } }"#).is_err());
    assert!(matches!(
        MockupConfig::from_json_str("{ not json"),
        Err(BookmockError::Serde(_))
    ));
}

#[test]
fn post_passes_cannot_be_switched_off() {
    for key in ["anti_alias", "ambient_occlusion", "contrast"] {
        let json = format!(r#"{{ "render": {{ "{key}": false }} }}"#);
        assert!(
            matches!(MockupConfig::from_json_str(&json), Err(BookmockError::Serde(_))),
            "{key}"
        );
    }
}

#[test]
fn shadow_sample_override() {
    let mut cfg = MockupConfig::default();
    cfg.apply_shadow_samples_override(" 12 ").unwrap();
    assert_eq!(cfg.render.shadow_samples, Some(12));
    assert!(cfg.apply_shadow_samples_override("zero").is_err());
    assert!(cfg.apply_shadow_samples_override("0").is_err());
    assert_eq!(cfg.render.shadow_samples, Some(12));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookmock.json");
    std::fs::write(&path, r#"{ "sizing": { "max_pixels": 1000000 } }"#).unwrap();
    let cfg = MockupConfig::from_path(&path).unwrap();
    assert_eq!(cfg.sizing.max_pixels, 1_000_000.0);

    let missing = MockupConfig::from_path(&dir.path().join("nope.json"));
    assert!(matches!(missing, Err(BookmockError::Other(_))));
}
