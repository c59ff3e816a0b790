use super::*;
use crate::assets::color::BackColor;
use crate::assets::defaults::DefaultAssets;
use crate::geometry::assemble::assemble;
use crate::model::binding::BindingType;
use crate::model::units::SpineWidth;

fn viewport(w: u32, h: u32, zoom: f64) -> ViewportSpec {
    ViewportSpec {
        output_width_px: w,
        output_height_px: h,
        camera_zoom: zoom,
        device_pixel_ratio: 1.0,
        clamped: false,
    }
}

fn fast_config() -> RenderConfig {
    RenderConfig {
        shadow_samples: Some(2),
        shadow_map_size: 64,
        ..RenderConfig::default()
    }
}

fn book(binding: BindingType) -> SceneGraph {
    let cover = Arc::new(Bitmap::solid(60, 80, [200, 40, 40, 255]).unwrap());
    let spine = Arc::new(Bitmap::solid(8, 80, [40, 40, 200, 255]).unwrap());
    assemble(
        &cover,
        Some(&spine),
        binding,
        Some(BackColor::default()),
        binding.uses_spine_width().then_some(SpineWidth::DEFAULT),
        &DefaultAssets::shared().unwrap(),
    )
    .unwrap()
}

#[test]
fn uv_affine_maps_corners() {
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];
    let screen = [
        Point::new(10.0, 90.0),
        Point::new(110.0, 80.0),
        Point::new(120.0, 20.0),
    ];
    let a = uv_affine(&uvs, &screen).unwrap();
    for (uv, s) in uvs.iter().zip(screen) {
        let p = a * Point::new(uv[0], uv[1]);
        assert!((p.x - s.x).abs() < 1e-9 && (p.y - s.y).abs() < 1e-9);
    }
    assert!(uv_affine(&[[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]], &screen).is_none());
}

#[test]
fn tangent_frame_follows_texture_axes() {
    let verts = [
        (Vec3::new(-1.0, -1.0, 0.0), [0.0, 1.0]),
        (Vec3::new(1.0, -1.0, 0.0), [1.0, 1.0]),
        (Vec3::new(1.0, 1.0, 0.0), [1.0, 0.0]),
    ];
    let (t, b) = tangent_frame(&verts).unwrap();
    assert!((t.x - 1.0).abs() < 1e-12);
    assert!((b.y - 1.0).abs() < 1e-12);
}

#[test]
fn render_has_exact_output_size_and_draws_the_book() {
    let mut r = CpuRenderer::new(fast_config());
    let scene = book(BindingType::PerfectBound);
    let vp = viewport(160, 200, 120.0);
    let recipe = LightingRecipe::for_binding(BindingType::PerfectBound);
    let frame = r.render(&scene, &vp, &recipe).unwrap();

    assert_eq!((frame.width, frame.height), (160, 200));
    assert_eq!(frame.data.len(), 160 * 200 * 4);
    assert!(frame.premultiplied);

    // The cover faces the camera near the center of the frame.
    let center = frame.pixel(88, 100).unwrap();
    assert_eq!(center[3], 255);
    assert!(center[0] > center[2], "cover is red: {center:?}");
    // Corners stay clear.
    assert_eq!(frame.pixel(0, 0).unwrap()[3], 0);
}

#[test]
fn every_binding_renders() {
    let vp = viewport(96, 120, 70.0);
    for binding in BindingType::ALL {
        let mut r = CpuRenderer::new(fast_config());
        let frame = r
            .render(&book(binding), &vp, &LightingRecipe::for_binding(binding))
            .unwrap();
        assert!(frame.data.chunks_exact(4).any(|p| p[3] > 0), "{binding}");
    }
}

#[test]
fn oversized_output_is_a_render_error() {
    let mut r = CpuRenderer::new(fast_config());
    let scene = book(BindingType::PerfectBound);
    let recipe = LightingRecipe::for_binding(BindingType::PerfectBound);
    let err = r
        .render(&scene, &viewport(70_000, 2, 1.0), &recipe)
        .unwrap_err();
    assert!(matches!(err, BookmockError::Render(_)));
    assert!(r.render(&scene, &viewport(0, 10, 1.0), &recipe).is_err());
}

#[test]
fn viewport_changes_keep_the_shadow_bake() {
    let mut r = CpuRenderer::new(fast_config());
    let scene = book(BindingType::Hardcover);
    let recipe = LightingRecipe::for_binding(BindingType::Hardcover);
    r.render(&scene, &viewport(80, 100, 60.0), &recipe).unwrap();
    let key = r.shadow().key();
    r.render(&scene, &viewport(120, 150, 90.0), &recipe).unwrap();
    assert_eq!(r.shadow().key(), key);
    assert_eq!(r.shadow().restarts(), 1);
    assert!(r.shadow().is_complete());
}

#[test]
fn stepping_advances_before_render_completes() {
    let mut r = CpuRenderer::new(RenderConfig {
        shadow_samples: Some(6),
        shadow_map_size: 32,
        ..RenderConfig::default()
    });
    let scene = book(BindingType::PerfectBound);
    let recipe = LightingRecipe::for_binding(BindingType::PerfectBound);
    assert_eq!(r.step_shadow(&scene, &recipe, 1).unwrap(), 1);
    assert_eq!(r.shadow().samples_done(), 1);
    r.render(&scene, &viewport(40, 50, 30.0), &recipe).unwrap();
    assert_eq!(r.shadow().samples_done(), 6);
}

#[test]
fn texture_cache_tracks_the_current_scene() {
    let mut r = CpuRenderer::new(fast_config());
    let recipe = LightingRecipe::for_binding(BindingType::PerfectBound);
    let vp = viewport(64, 80, 50.0);
    r.render(&book(BindingType::PerfectBound), &vp, &recipe).unwrap();
    // Cover, spine and page edges.
    assert_eq!(r.cached_textures(), 3);
    r.render(&book(BindingType::Hardcover), &vp, &recipe).unwrap();
    // Hardcover backs are flat color; cover, spine and page edges remain.
    assert_eq!(r.cached_textures(), 3);
}

#[test]
fn back_faces_are_never_drawn() {
    let cam = OrthoCamera::for_viewport(&viewport(120, 160, 90.0));
    let forward = cam.forward();
    for binding in BindingType::ALL {
        let scene = book(binding);
        let drawn = project_facets(collect_facets(&scene), &cam);
        assert!(!drawn.is_empty(), "{binding}");
        for f in &drawn {
            assert!(f.facet.normal.dot(forward) < 0.0, "{binding}: {:?}", f.facet.normal);
        }
        // The back cover faces -Z and must never be painted over the front.
        assert!(drawn.iter().all(|f| f.facet.normal.z > -0.5), "{binding}");
        assert!(drawn.iter().any(|f| f.facet.normal.z > 0.9), "{binding}");
    }
}

#[test]
fn booklet_back_cover_is_culled() {
    let cam = OrthoCamera::for_viewport(&viewport(120, 160, 90.0));
    let scene = book(BindingType::Saddlestitch);
    let all = collect_facets(&scene);
    let flat_backs = all.iter().filter(|f| f.normal.z < -0.999).count();
    assert_eq!(flat_backs, 2);

    let drawn = project_facets(all, &cam);
    assert!(drawn.iter().all(|f| f.facet.normal.z > -0.999));
    assert_eq!(drawn.iter().filter(|f| f.facet.normal.z > 0.999).count(), 2);
    for pair in drawn.windows(2) {
        assert!(pair[0].depth >= pair[1].depth);
    }
}
