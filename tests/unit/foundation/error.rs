use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BookmockError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BookmockError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        BookmockError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        BookmockError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        BookmockError::export("x")
            .to_string()
            .contains("export error:")
    );
    assert!(
        BookmockError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BookmockError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
