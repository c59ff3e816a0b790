use super::*;

#[test]
fn over_matches_reference_blend() {
    let mut dst = vec![0, 0, 255, 255];
    premul_over_in_place(&mut dst, &[128, 0, 0, 128]).unwrap();
    assert_eq!(dst, vec![128, 0, 127, 255]);

    let mut short = vec![0u8; 4];
    assert!(premul_over_in_place(&mut short, &[0u8; 8]).is_err());
}

#[test]
fn contrast_zero_is_identity_and_keeps_alpha() {
    let mut f = FrameRGBA::filled(2, 2, [40, 80, 120, 200]);
    let before = f.data.clone();
    adjust_contrast(&mut f, 0.0);
    assert_eq!(f.data, before);

    adjust_contrast(&mut f, 0.5);
    for px in f.data.chunks_exact(4) {
        assert_eq!(px[3], 200);
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    }
}

#[test]
fn contrast_pushes_away_from_mid_gray() {
    let mut dark = FrameRGBA::filled(1, 1, [50, 50, 50, 255]);
    let mut light = FrameRGBA::filled(1, 1, [200, 200, 200, 255]);
    adjust_contrast(&mut dark, 0.2);
    adjust_contrast(&mut light, 0.2);
    assert!(dark.data[0] < 50);
    assert!(light.data[0] > 200);
}

#[test]
fn anti_alias_softens_hard_edges_only() {
    let mut f = FrameRGBA::filled(8, 8, [0, 0, 0, 255]);
    for y in 0..8 {
        for x in 4..8 {
            let i = (y * 8 + x) * 4;
            f.data[i..i + 3].copy_from_slice(&[255, 255, 255]);
        }
    }
    let flat_before = f.pixel(1, 4);
    anti_alias(&mut f, 0.1);
    assert_eq!(f.pixel(1, 4), flat_before);
    let edge = f.pixel(3, 4).unwrap();
    assert!(edge[0] > 0 && edge[0] < 255);
}

#[test]
fn occlusion_darkens_pixels_next_to_nearer_geometry() {
    let cam = OrthoCamera::new(400.0, 16, 16);
    let mut depth = DepthBuffer::new(16, 16);
    for y in 0..16 {
        for x in 0..16 {
            depth.depth[y * 16 + x] = if x < 8 { 10.0 } else { 10.05 };
        }
    }
    let ao = AoSettings {
        radius: 0.01,
        intensity: 1.0,
        bias: 0.001,
        range: 0.2,
        samples: 8,
    };
    let mut f = FrameRGBA::filled(16, 16, [255, 255, 255, 255]);
    ambient_occlusion(&mut f, &depth, &cam, &ao);
    // Behind the step: occluded. In front of it: untouched.
    assert!(f.pixel(9, 8).unwrap()[0] < 255);
    assert_eq!(f.pixel(6, 8).unwrap()[0], 255);
}

#[test]
fn slanted_planes_are_not_self_occluded() {
    let cam = OrthoCamera::new(400.0, 16, 16);
    let mut depth = DepthBuffer::new(16, 16);
    for y in 0..16 {
        for x in 0..16 {
            depth.depth[y * 16 + x] = 10.0 + 0.03 * y as f32;
        }
    }
    let ao = AoSettings {
        radius: 0.01,
        intensity: 1.0,
        bias: 0.001,
        range: 0.2,
        samples: 8,
    };
    let mut f = FrameRGBA::filled(16, 16, [255, 255, 255, 255]);
    ambient_occlusion(&mut f, &depth, &cam, &ao);
    assert_eq!(f.pixel(8, 8).unwrap()[0], 255);
}

#[test]
fn denoise_flattens_the_kernel_rotation_pattern() {
    let mut depth = DepthBuffer::new(16, 16);
    depth.depth.iter_mut().for_each(|d| *d = 10.0);
    let hatch: Vec<f32> = (0..16 * 16)
        .map(|i| ((i % 16 * 7 + i / 16 * 13) % 4) as f32 / 3.0)
        .collect();
    let out = denoise_occlusion(&hatch, &depth, 0.02);
    for y in 1..=13 {
        for x in 1..=13 {
            assert!((out[y * 16 + x] - 0.5).abs() < 1e-5, "({x}, {y}) = {}", out[y * 16 + x]);
        }
    }
}

#[test]
fn denoise_keeps_separate_surfaces_apart() {
    let mut depth = DepthBuffer::new(16, 4);
    let mut occ = vec![0.0f32; 16 * 4];
    for y in 0..4 {
        for x in 8..16 {
            depth.depth[y * 16 + x] = 12.0;
            occ[y * 16 + x] = 1.0;
        }
        for x in 0..8 {
            depth.depth[y * 16 + x] = 10.0;
        }
    }
    let out = denoise_occlusion(&occ, &depth, 0.02);
    assert_eq!(out[16 + 7], 0.0);
    assert_eq!(out[16 + 8], 1.0);
}
