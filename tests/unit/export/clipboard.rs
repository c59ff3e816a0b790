use super::*;

#[test]
fn memory_clipboard_receives_png_and_pixels() {
    let frame = FrameRGBA::filled(2, 2, [0, 64, 0, 128]);
    let mut sink = MemoryClipboard::default();
    assert!(export_clipboard(&frame, &mut sink));
    let img = sink.last().unwrap();
    assert_eq!((img.width, img.height), (2, 2));
    assert_eq!(&img.png[1..4], b"PNG");
    assert_eq!(&img.rgba[0..4], &[0, 128, 0, 128]);
}

#[test]
fn sink_failure_returns_false() {
    let frame = FrameRGBA::filled(1, 1, [0, 0, 0, 255]);
    let mut sink = MemoryClipboard {
        fail_with: Some("clipboard busy".into()),
        ..MemoryClipboard::default()
    };
    assert!(!export_clipboard(&frame, &mut sink));
    assert!(sink.writes.is_empty());
}

#[test]
fn empty_frame_is_not_copied() {
    let frame = FrameRGBA {
        width: 0,
        height: 0,
        data: Vec::new(),
        premultiplied: true,
    };
    let mut sink = MemoryClipboard::default();
    assert!(!export_clipboard(&frame, &mut sink));
    assert!(sink.writes.is_empty());
}
