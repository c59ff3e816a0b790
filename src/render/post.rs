use rayon::prelude::*;

use crate::{
    foundation::error::{BookmockError, BookmockResult},
    foundation::math::{mul_div255_u8, unpremultiply_px},
    render::camera::OrthoCamera,
    render::frame::FrameRGBA,
    render::lighting::{AoSettings, ShadowLight},
    render::raster::DepthBuffer,
    render::shadow::GroundCoverage,
};

/// Premultiplied source-over of `src` onto `dst`.
pub fn premul_over_in_place(dst: &mut [u8], src: &[u8]) -> BookmockResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BookmockError::render(
            "premul_over_in_place expects equal-length rgba8 buffers",
        ));
    }
    dst.par_chunks_mut(4)
        .zip(src.par_chunks(4))
        .for_each(|(d, s)| {
            let sa = s[3];
            if sa == 0 {
                return;
            }
            let inv = 255u16 - u16::from(sa);
            for c in 0..4 {
                d[c] = s[c].saturating_add(mul_div255_u8(u16::from(d[c]), inv));
            }
        });
    Ok(())
}

/// Composite black at `alpha` over one premultiplied pixel.
fn darken_px(px: &mut [u8], alpha: u8) {
    if alpha == 0 {
        return;
    }
    let inv = 255u16 - u16::from(alpha);
    px[0] = mul_div255_u8(u16::from(px[0]), inv);
    px[1] = mul_div255_u8(u16::from(px[1]), inv);
    px[2] = mul_div255_u8(u16::from(px[2]), inv);
    px[3] = alpha.saturating_add(mul_div255_u8(u16::from(px[3]), inv));
}

/// Per-pixel depth slope, taking the flatter one-sided difference on each axis.
fn depth_gradient(depth: &DepthBuffer, x: i64, y: i64, d: f64) -> (f64, f64) {
    let slope = |a: f32, b: f32| {
        let fwd = f64::from(a) - d;
        let back = d - f64::from(b);
        match (fwd.is_finite(), back.is_finite()) {
            (true, true) if fwd.abs() < back.abs() => fwd,
            (_, true) => back,
            (true, false) => fwd,
            (false, false) => 0.0,
        }
    };
    (
        slope(depth.at(x + 1, y), depth.at(x - 1, y)),
        slope(depth.at(x, y + 1), depth.at(x, y - 1)),
    )
}

fn unit_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Ground shadow: every pixel whose view ray meets the ground picks up the baked coverage.
pub fn composite_ground_shadow(
    frame: &mut FrameRGBA,
    camera: &OrthoCamera,
    coverage: GroundCoverage<'_>,
    ground_y: f64,
    light: &ShadowLight,
) {
    if coverage.samples_done() == 0 {
        return;
    }
    let w = frame.width as usize;
    frame
        .data
        .par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let Some((hit, _)) =
                    camera.hit_horizontal_plane(x as f64 + 0.5, y as f64 + 0.5, ground_y)
                else {
                    continue;
                };
                let cov = coverage.at(hit.x, hit.z);
                darken_px(px, unit_to_u8(cov * light.opacity));
            }
        });
}

/// Screen-space ambient occlusion over the frame, driven by `depth`.
pub fn ambient_occlusion(
    frame: &mut FrameRGBA,
    depth: &DepthBuffer,
    camera: &OrthoCamera,
    ao: &AoSettings,
) {
    let occ = occlusion_term(depth, camera, ao);
    let occ = denoise_occlusion(&occ, depth, ao.range * 0.1);
    let w = (frame.width as usize).max(1);
    frame
        .data
        .par_chunks_mut(w * 4)
        .zip(occ.par_chunks(w))
        .for_each(|(row, occ_row)| {
            for (px, &o) in row.chunks_exact_mut(4).zip(occ_row) {
                darken_px(px, unit_to_u8(f64::from(o) * ao.intensity));
            }
        });
}

/// Raw per-pixel occluded fraction in `0..=1`, with a rotating kernel.
fn occlusion_term(depth: &DepthBuffer, camera: &OrthoCamera, ao: &AoSettings) -> Vec<f32> {
    let samples = ao.samples.max(1) as usize;
    let radius_px = (ao.radius * camera.zoom).clamp(1.0, 48.0);
    let kernel: Vec<(f64, f64)> = (0..samples)
        .map(|i| {
            let a = std::f64::consts::TAU * (i as f64) / (samples as f64);
            // Alternating full and half radius.
            let r = if i % 2 == 0 { radius_px } else { radius_px * 0.5 };
            (a.cos() * r, a.sin() * r)
        })
        .collect();

    let w = depth.width as usize;
    let mut occ = vec![0.0f32; w * depth.height as usize];
    occ.par_chunks_mut(w.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let d = depth.at(x as i64, y as i64);
                if !d.is_finite() {
                    continue;
                }
                let d = f64::from(d);
                let (gx, gy) = depth_gradient(depth, x as i64, y as i64, d);
                let rot = ((x * 7 + y * 13) % 4) as f64 * std::f64::consts::FRAC_PI_4 * 0.5;
                let (s, c) = rot.sin_cos();
                let mut occluded = 0usize;
                for &(kx, ky) in &kernel {
                    let sx = x as f64 + kx * c - ky * s;
                    let sy = y as f64 + kx * s + ky * c;
                    let (ox, oy) = (sx.round() - x as f64, sy.round() - y as f64);
                    let nd = f64::from(depth.at(sx.round() as i64, sy.round() as i64));
                    // Measured against the local tangent plane so slanted surfaces stay clear.
                    let delta = d + gx * ox + gy * oy - nd;
                    if delta > ao.bias && delta < ao.range {
                        occluded += 1;
                    }
                }
                *out = (occluded as f64 / samples as f64) as f32;
            }
        });
    occ
}

/// 4x4 depth-aware box filter over the occlusion term. The window spans every kernel
/// rotation phase, so the rotation pattern averages out. Neighbors further than `tolerance`
/// from the local tangent plane belong to another surface and are left out.
fn denoise_occlusion(occ: &[f32], depth: &DepthBuffer, tolerance: f64) -> Vec<f32> {
    let w = depth.width as usize;
    let mut out = vec![0.0f32; occ.len()];
    out.par_chunks_mut(w.max(1))
        .enumerate()
        .for_each(|(y, row)| {
            for (x, o) in row.iter_mut().enumerate() {
                let d = depth.at(x as i64, y as i64);
                if !d.is_finite() {
                    continue;
                }
                let d = f64::from(d);
                let (gx, gy) = depth_gradient(depth, x as i64, y as i64, d);
                let mut sum = 0.0f64;
                let mut weight = 0usize;
                for ny in y as i64 - 1..=y as i64 + 2 {
                    for nx in x as i64 - 1..=x as i64 + 2 {
                        let nd = f64::from(depth.at(nx, ny));
                        let expected = d + gx * (nx - x as i64) as f64 + gy * (ny - y as i64) as f64;
                        if !nd.is_finite() || (nd - expected).abs() >= tolerance {
                            continue;
                        }
                        sum += f64::from(occ[ny as usize * w + nx as usize]);
                        weight += 1;
                    }
                }
                *o = if weight == 0 {
                    occ[y * w + x]
                } else {
                    (sum / weight as f64) as f32
                };
            }
        });
    out
}

/// Contrast around mid-gray on straight colors; `amount = 0` is the identity.
pub fn adjust_contrast(frame: &mut FrameRGBA, amount: f64) {
    if amount == 0.0 {
        return;
    }
    let f = 1.0 + amount;
    let lut: Vec<u8> = (0..=255u32)
        .map(|v| {
            let c = f64::from(v) / 255.0;
            unit_to_u8((c - 0.5) * f + 0.5)
        })
        .collect();
    frame.data.par_chunks_mut(4).for_each(|px| {
        let a = px[3];
        if a == 0 {
            return;
        }
        let s = unpremultiply_px([px[0], px[1], px[2], a]);
        for c in 0..3 {
            px[c] = mul_div255_u8(u16::from(lut[s[c] as usize]), u16::from(a));
        }
    });
}

fn luma(px: &[u8]) -> f64 {
    (0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2])) / 255.0
        + 0.25 * f64::from(px[3]) / 255.0
}

/// Luma-edge anti-aliasing: pixels on a high-contrast edge blend toward their neighbors.
pub fn anti_alias(frame: &mut FrameRGBA, threshold: f64) {
    let w = frame.width as usize;
    let h = frame.height as usize;
    if w < 3 || h < 3 {
        return;
    }
    let src = frame.data.clone();
    let at = |x: usize, y: usize| -> &[u8] {
        let i = (y * w + x) * 4;
        &src[i..i + 4]
    };
    frame
        .data
        .par_chunks_mut(w * 4)
        .enumerate()
        .for_each(|(y, row)| {
            if y == 0 || y == h - 1 {
                return;
            }
            for x in 1..w - 1 {
                let c = at(x, y);
                let n = [at(x, y - 1), at(x, y + 1), at(x - 1, y), at(x + 1, y)];
                let lc = luma(c);
                let (lo, hi) = n.iter().fold((lc, lc), |(lo, hi), p| {
                    let l = luma(p);
                    (lo.min(l), hi.max(l))
                });
                let range = hi - lo;
                if range < threshold {
                    continue;
                }
                let blend = ((range - threshold) / (1.0 - threshold).max(1e-6)).clamp(0.0, 0.5);
                let out = &mut row[x * 4..x * 4 + 4];
                for ch in 0..4 {
                    let avg = n.iter().map(|p| f64::from(p[ch])).sum::<f64>() / 4.0;
                    let v = f64::from(c[ch]) * (1.0 - blend) + avg * blend;
                    out[ch] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/render/post.rs"]
mod tests;
