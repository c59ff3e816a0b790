use super::*;

#[test]
fn shared_instance_is_built_once() {
    let a = DefaultAssets::shared().unwrap();
    let b = DefaultAssets::shared().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn build_is_deterministic() {
    let a = DefaultAssets::build().unwrap();
    let b = DefaultAssets::build().unwrap();
    assert_eq!(a.placeholder_cover.id(), b.placeholder_cover.id());
    assert_eq!(a.placeholder_spine.id(), b.placeholder_spine.id());
    assert_eq!(a.page_edges.id(), b.page_edges.id());
    assert_eq!(a.board_normals.front.id, b.board_normals.front.id);
    assert_eq!(
        a.board_normals.front.normals[77],
        b.board_normals.front.normals[77]
    );
}

#[test]
fn placeholders_have_book_proportions() {
    let d = DefaultAssets::build().unwrap();
    assert!((d.placeholder_cover.aspect() - 0.75).abs() < 1e-12);
    assert!((d.placeholder_spine.aspect() - 0.1).abs() < 1e-12);
    assert_eq!(d.placeholder_cover.pixel(0, 0).map(|p| p[3]), Some(255));
}

#[test]
fn board_normals_are_unit_and_face_out() {
    let d = DefaultAssets::build().unwrap();
    let maps = [
        &d.board_normals.front,
        &d.board_normals.spine,
        &d.board_normals.back,
    ];
    for m in maps {
        assert_eq!(m.normals.len(), (m.width * m.height) as usize);
        for n in &m.normals {
            assert!((n.length() - 1.0).abs() < 1e-9);
            assert!(n.z > 0.0);
        }
    }
    assert_ne!(d.board_normals.front.id, d.board_normals.spine.id);
    assert_ne!(d.board_normals.spine.id, d.board_normals.back.id);
}
