use super::*;
use crate::assets::slots::SlotKind;
use crate::config::RenderConfig;
use crate::export::clipboard::MemoryClipboard;
use crate::geometry::scene::PanelRole;
use crate::model::units::{Unit, UnitLimits};

fn small_config() -> MockupConfig {
    MockupConfig {
        units: UnitLimits {
            min_px: 16.0,
            max_px: 3000.0,
        },
        render: RenderConfig {
            shadow_samples: Some(2),
            shadow_map_size: 32,
            ..RenderConfig::default()
        },
        ..MockupConfig::default()
    }
}

fn session() -> MockupSession {
    let mut s = MockupSession::new(small_config()).unwrap();
    s.set_target_size(SizeInput::px(96.0)).unwrap();
    s
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Bitmap {
    Bitmap::solid(w, h, rgba).unwrap()
}

#[test]
fn placeholders_stand_in_for_missing_uploads() {
    let mut s = session();
    let scene = s.scene().unwrap();
    let defaults = DefaultAssets::shared().unwrap();
    let placeholder_aspect = defaults.placeholder_cover.aspect();
    assert_eq!(scene.model.cover_aspect, placeholder_aspect);
    assert!(scene.has_role(PanelRole::Spine));
}

#[test]
fn scene_is_memoized_until_an_input_changes() {
    let mut s = session();
    let a = s.scene().unwrap();
    let b = s.scene().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(s.scene_builds(), 1);

    // Viewport inputs are not part of the scene key.
    s.set_scaling_mode(ScalingMode::FixedHeight);
    s.set_target_size(SizeInput::px(200.0)).unwrap();
    s.scene().unwrap();
    assert_eq!(s.scene_builds(), 1);

    s.slots_mut()
        .set(SlotKind::Cover, solid(30, 40, [1, 2, 3, 255]), None);
    let c = s.scene().unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
    assert_eq!(s.scene_builds(), 2);
}

#[test]
fn back_color_only_matters_for_hardcover() {
    let mut s = session();
    s.scene().unwrap();
    s.set_back_color("#102030".parse().unwrap());
    s.scene().unwrap();
    assert_eq!(s.scene_builds(), 1);

    s.set_binding(BindingType::Hardcover);
    s.scene().unwrap();
    s.set_back_color("#405060".parse().unwrap());
    s.scene().unwrap();
    assert_eq!(s.scene_builds(), 3);
}

#[test]
fn spiral_bound_uses_the_spine_width() {
    let mut s = session();
    s.set_binding(BindingType::SpiralBound);
    s.slots_mut()
        .set(SlotKind::Cover, solid(60, 100, [9, 9, 9, 255]), None);
    s.set_spine_width(SpineWidth {
        value: 20.0,
        unit: Unit::Pixels,
    })
    .unwrap();
    let scene = s.scene().unwrap();
    assert!((scene.model.spine_aspect - 0.2).abs() < 1e-12);
    assert!(
        s.set_spine_width(SpineWidth {
            value: 0.0,
            unit: Unit::Inches
        })
        .is_err()
    );
}

#[test]
fn viewport_follows_mode_and_clamped_target() {
    let mut s = session();
    s.slots_mut()
        .set(SlotKind::Cover, solid(75, 100, [9, 9, 9, 255]), None);
    s.slots_mut()
        .set(SlotKind::Spine, solid(10, 100, [9, 9, 9, 255]), None);
    s.set_target_size(SizeInput::px(5.0)).unwrap();
    let vp = s.viewport().unwrap();
    // Below min_px the field clamps up.
    assert_eq!(vp.output_width_px, 16);

    s.set_scaling_mode(ScalingMode::FixedHeight);
    s.set_target_size(SizeInput::inches(0.5)).unwrap();
    assert_eq!(s.viewport().unwrap().output_height_px, 150);
    assert!(s.set_target_size(SizeInput::px(-3.0)).is_err());
}

#[test]
fn render_keeps_the_frame_for_export() {
    let mut s = session();
    assert!(s.frame().is_none());
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        s.export_png(dir.path(), None),
        Err(BookmockError::Export(_))
    ));
    let mut clip = MemoryClipboard::default();
    assert!(!s.copy_to_clipboard(&mut clip));

    let (w, h) = {
        let f = s.render().unwrap();
        (f.width, f.height)
    };
    let vp = s.viewport().unwrap();
    assert_eq!((w, h), (vp.output_width_px, vp.output_height_px));

    let path = s.export_png(dir.path(), None).unwrap();
    assert_eq!(path.file_name().unwrap(), "Untitled.png");
    assert!(s.copy_to_clipboard(&mut clip));
    assert_eq!(clip.writes.len(), 1);
}

#[test]
fn export_label_comes_from_the_cover_upload() {
    let mut s = session();
    s.slots_mut().set(
        SlotKind::Cover,
        solid(3, 4, [0, 0, 0, 255]),
        Some("Summer Reads 2024.psd"),
    );
    assert_eq!(s.export_label(), "Summer_Reads_2024");
}

#[test]
fn tick_advances_the_shadow_one_sample_at_a_time() {
    let mut s = session();
    assert_eq!(s.tick().unwrap(), 1);
    assert_eq!(s.tick().unwrap(), 1);
    assert_eq!(s.tick().unwrap(), 0);
    assert!(s.renderer().shadow().is_complete());

    s.set_binding(BindingType::Hardcover);
    assert_eq!(s.tick().unwrap(), 1);
    assert_eq!(s.renderer().shadow().samples_done(), 1);
}

#[test]
fn booklet_renders_with_only_a_cover() {
    let mut s = session();
    s.set_binding(BindingType::Saddlestitch);
    s.slots_mut()
        .set(SlotKind::Cover, solid(50, 70, [200, 180, 20, 255]), Some("zine.png"));
    let scene = s.scene().unwrap();
    assert!(scene.panels.is_empty());
    assert_eq!(scene.meshes.len(), 2);
    assert!(scene.shadow_solid.is_none());
    let frame = s.render().unwrap();
    assert!(frame.data.chunks_exact(4).any(|p| p[3] == 255));
}

#[test]
fn eyedropper_sets_the_back_color() {
    let mut s = session();
    assert!(s.pick_back_color((10.0, 10.0), 5.0, 5.0).is_none());
    let (w, h) = {
        let f = s.render().unwrap();
        (f64::from(f.width), f64::from(f.height))
    };
    // Sample the middle of the preview, shown at its native size.
    let picked = s.pick_back_color((w, h), w * 0.5, h * 0.5).unwrap();
    assert_eq!(s.back_color(), picked);
    assert_eq!(picked.rgba().a, 255);
}
