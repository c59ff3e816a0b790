use std::sync::{Arc, OnceLock};

use crate::{
    assets::bitmap::Bitmap,
    assets::color::Rgba8,
    foundation::core::Vec3,
    foundation::error::BookmockResult,
    foundation::math::{Fnv1a64, SplitMix64, smoothstep},
    geometry::booklet::BookletTemplate,
    geometry::scene::NormalMap,
};

/// Flat color for a spiral-bound spine with no artwork.
pub const COIL_GRAY: Rgba8 = Rgba8::rgb(0x8a, 0x8d, 0x91);

const PLACEHOLDER_COVER: (u32, u32) = (600, 800);
const PLACEHOLDER_SPINE: (u32, u32) = (80, 800);
const PAGE_EDGE_SIZE: u32 = 64;
const BOARD_GRAIN_SIZE: u32 = 128;

/// Board-grain normal maps for the three hardcover boards.
#[derive(Clone, Debug)]
pub struct BoardNormals {
    pub front: Arc<NormalMap>,
    pub spine: Arc<NormalMap>,
    pub back: Arc<NormalMap>,
}

/// Read-only resources shared by every session in the process.
#[derive(Debug)]
pub struct DefaultAssets {
    pub placeholder_cover: Arc<Bitmap>,
    pub placeholder_spine: Arc<Bitmap>,
    pub page_edges: Arc<Bitmap>,
    pub board_normals: BoardNormals,
    pub booklet: BookletTemplate,
}

static SHARED: OnceLock<Arc<DefaultAssets>> = OnceLock::new();

impl DefaultAssets {
    /// Process-wide instance, built on first use.
    pub fn shared() -> BookmockResult<Arc<DefaultAssets>> {
        if let Some(existing) = SHARED.get() {
            return Ok(Arc::clone(existing));
        }
        let built = Arc::new(Self::build()?);
        Ok(Arc::clone(SHARED.get_or_init(|| built)))
    }

    /// Build a fresh, unshared set. Deterministic.
    pub fn build() -> BookmockResult<Self> {
        tracing::debug!("building default assets");
        Ok(Self {
            placeholder_cover: Arc::new(placeholder_cover()?),
            placeholder_spine: Arc::new(placeholder_spine()?),
            page_edges: Arc::new(page_edges()?),
            board_normals: BoardNormals {
                front: Arc::new(board_grain(0xB0A2_D001, BOARD_GRAIN_SIZE)),
                spine: Arc::new(board_grain(0xB0A2_D002, BOARD_GRAIN_SIZE)),
                back: Arc::new(board_grain(0xB0A2_D003, BOARD_GRAIN_SIZE)),
            },
            booklet: BookletTemplate::build(),
        })
    }
}

fn paint(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> BookmockResult<Bitmap> {
    let mut px = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for y in 0..height {
        for x in 0..width {
            px.extend_from_slice(&f(x, y));
        }
    }
    Bitmap::from_rgba8(width, height, px)
}

fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
    (f64::from(a) + (f64::from(b) - f64::from(a)) * t)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn placeholder_cover() -> BookmockResult<Bitmap> {
    let (w, h) = PLACEHOLDER_COVER;
    let top = Rgba8::rgb(0x3d, 0x5a, 0x80);
    let bottom = Rgba8::rgb(0x1f, 0x2d, 0x44);
    let frame = Rgba8::rgb(0xe0, 0xe1, 0xdd);
    paint(w, h, |x, y| {
        let t = f64::from(y) / f64::from(h - 1);
        let inset = 36;
        let on_frame = (x >= inset && x < w - inset && y >= inset && y < h - inset)
            && (x < inset + 4 || x >= w - inset - 4 || y < inset + 4 || y >= h - inset - 4);
        let title_band = y >= h / 4 && y < h / 4 + 90 && x >= inset + 40 && x < w - inset - 40;
        if on_frame || title_band {
            [frame.r, frame.g, frame.b, 255]
        } else {
            [
                lerp_u8(top.r, bottom.r, t),
                lerp_u8(top.g, bottom.g, t),
                lerp_u8(top.b, bottom.b, t),
                255,
            ]
        }
    })
}

fn placeholder_spine() -> BookmockResult<Bitmap> {
    let (w, h) = PLACEHOLDER_SPINE;
    let base = Rgba8::rgb(0x29, 0x3b, 0x55);
    let band = Rgba8::rgb(0xe0, 0xe1, 0xdd);
    paint(w, h, |x, y| {
        let in_band = y >= h / 5 && y < h / 5 + 200 && x >= w / 4 && x < w - w / 4;
        let c = if in_band { band } else { base };
        [c.r, c.g, c.b, 255]
    })
}

/// Stacked paper edges seen from above: pale rows varying along the block's depth.
fn page_edges() -> BookmockResult<Bitmap> {
    let mut rng = SplitMix64::new(0x9A6E_ED6E);
    let rows: Vec<u8> = (0..PAGE_EDGE_SIZE)
        .map(|_| 232 + (rng.next_f64() * 18.0) as u8)
        .collect();
    paint(PAGE_EDGE_SIZE, PAGE_EDGE_SIZE, |_, y| {
        let v = rows[y as usize];
        [v, v, v.saturating_sub(6), 255]
    })
}

/// Procedural cloth/board texture: fibers along X over low-frequency noise.
fn board_grain(seed: u64, size: u32) -> NormalMap {
    let n = size as usize;
    let mut rng = SplitMix64::new(seed);

    let lattice = 9usize;
    let grid: Vec<f64> = (0..lattice * lattice).map(|_| rng.next_f64()).collect();
    let fibers: Vec<f64> = (0..n).map(|_| rng.next_f64()).collect();
    let speckle: Vec<f64> = (0..n * n).map(|_| rng.next_f64()).collect();

    let value_noise = |x: f64, y: f64| -> f64 {
        let gx = x * (lattice - 1) as f64;
        let gy = y * (lattice - 1) as f64;
        let x0 = (gx.floor() as usize).min(lattice - 2);
        let y0 = (gy.floor() as usize).min(lattice - 2);
        let tx = smoothstep(0.0, 1.0, gx - x0 as f64);
        let ty = smoothstep(0.0, 1.0, gy - y0 as f64);
        let g = |i: usize, j: usize| grid[j * lattice + i];
        let a = g(x0, y0) + (g(x0 + 1, y0) - g(x0, y0)) * tx;
        let b = g(x0, y0 + 1) + (g(x0 + 1, y0 + 1) - g(x0, y0 + 1)) * tx;
        a + (b - a) * ty
    };

    let mut height = vec![0.0f64; n * n];
    for y in 0..n {
        for x in 0..n {
            let u = x as f64 / (n - 1) as f64;
            let v = y as f64 / (n - 1) as f64;
            height[y * n + x] =
                0.5 * value_noise(u, v) + 0.35 * fibers[y] + 0.15 * speckle[y * n + x];
        }
    }

    let strength = 1.5;
    let at = |x: isize, y: isize| -> f64 {
        let x = x.clamp(0, n as isize - 1) as usize;
        let y = y.clamp(0, n as isize - 1) as usize;
        height[y * n + x]
    };
    let mut normals = Vec::with_capacity(n * n);
    for y in 0..n as isize {
        for x in 0..n as isize {
            let dx = (at(x + 1, y) - at(x - 1, y)) * 0.5;
            // Texel rows run downward; surface +Y runs up.
            let dy = (at(x, y - 1) - at(x, y + 1)) * 0.5;
            normals.push(Vec3::new(-dx * strength, -dy * strength, 1.0).normalize());
        }
    }

    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u32(size);
    NormalMap {
        id: h.finish(),
        width: size,
        height: size,
        normals,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/defaults.rs"]
mod tests;
