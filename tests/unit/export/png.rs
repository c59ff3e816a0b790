use super::*;

fn frame() -> FrameRGBA {
    // Half-transparent red, premultiplied.
    FrameRGBA::filled(3, 2, [128, 0, 0, 128])
}

#[test]
fn label_strips_extension_and_unsafe_characters() {
    assert_eq!(export_label(Some("My Great Book.png")), "My_Great_Book");
    assert_eq!(export_label(Some("cover (final) v2.psd")), "cover_final_v2");
    assert_eq!(export_label(Some("archive.tar.gz")), "archivetar");
    assert_eq!(export_label(Some("dir/sub/front-cover.PNG")), "front-cover");
    assert_eq!(export_label(Some("Übersicht.png")), "bersicht");
}

#[test]
fn label_falls_back_to_untitled() {
    assert_eq!(export_label(None), "Untitled");
    assert_eq!(export_label(Some("")), "Untitled");
    assert_eq!(export_label(Some("日本.png")), "Untitled");
    assert_eq!(export_label(Some(".png")), "Untitled");
}

#[test]
fn png_round_trips_straight_alpha() {
    let bytes = encode_png(&frame()).unwrap();
    let img = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(2, 1).0, [255, 0, 0, 128]);
}

#[test]
fn exporting_an_empty_frame_fails() {
    let empty = FrameRGBA {
        width: 0,
        height: 0,
        data: Vec::new(),
        premultiplied: true,
    };
    assert!(matches!(encode_png(&empty), Err(BookmockError::Export(_))));
}

#[test]
fn export_file_creates_the_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("nested").join("out");
    let path = export_file(&frame(), &out_dir, "Cover_1").unwrap();
    assert_eq!(path, out_dir.join("Cover_1.png"));
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
}
