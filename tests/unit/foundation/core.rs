use std::f64::consts::FRAC_PI_2;

use super::*;

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-9
}

#[test]
fn cross_follows_right_hand_rule() {
    let x = Vec3::new(1.0, 0.0, 0.0);
    let y = Vec3::new(0.0, 1.0, 0.0);
    assert!(approx(x.cross(y), Vec3::new(0.0, 0.0, 1.0)));
}

#[test]
fn spine_rotation_maps_plane_width_onto_depth() {
    let t = Transform3::default().with_rotation(Vec3::new(0.0, -FRAC_PI_2, 0.0));
    assert!(approx(
        t.apply_point(Vec3::new(1.0, 0.0, 0.0)),
        Vec3::new(0.0, 0.0, 1.0)
    ));
    assert!(approx(
        t.apply_normal(Vec3::new(0.0, 0.0, 1.0)),
        Vec3::new(-1.0, 0.0, 0.0)
    ));
}

#[test]
fn top_rotation_points_plane_normal_up() {
    let t = Transform3::default().with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0));
    assert!(approx(t.apply_normal(Vec3::new(0.0, 0.0, 1.0)), Vec3::UP));
}

#[test]
fn non_uniform_scale_keeps_normals_unit_length() {
    let t = Transform3::default().with_scale(Vec3::new(3.0, 1.0, 1.0));
    let n = t.apply_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
    assert!((n.length() - 1.0).abs() < 1e-9);
    assert!(n.y > n.x);
}

#[test]
fn normalize_zero_is_zero() {
    assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
}
