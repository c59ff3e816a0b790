use rayon::prelude::*;

use crate::foundation::core::Point;
use crate::render::camera::OrthoCamera;

/// Screen-space triangle with per-vertex view depth.
#[derive(Clone, Copy, Debug)]
pub struct DepthTri {
    pub p: [Point; 3],
    pub depth: [f64; 3],
}

impl DepthTri {
    fn bounds(&self) -> (f64, f64, f64, f64) {
        let xs = self.p.map(|p| p.x);
        let ys = self.p.map(|p| p.y);
        (
            xs.iter().cloned().fold(f64::INFINITY, f64::min),
            ys.iter().cloned().fold(f64::INFINITY, f64::min),
            xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        )
    }
}

/// Per-pixel nearest view depth; `f32::INFINITY` where nothing was drawn.
#[derive(Clone, Debug)]
pub struct DepthBuffer {
    pub width: u32,
    pub height: u32,
    pub depth: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; (width as usize) * (height as usize)],
        }
    }

    pub fn at(&self, x: i64, y: i64) -> f32 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return f32::INFINITY;
        }
        self.depth[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Rasterize triangles at pixel centers, keeping the nearest depth. Rows run in parallel.
    pub fn rasterize(&mut self, tris: &[DepthTri]) {
        let prepared: Vec<(DepthTri, (f64, f64, f64, f64), f64)> = tris
            .iter()
            .filter_map(|t| {
                let area = edge(t.p[0], t.p[1], t.p[2]);
                (area.abs() > 1e-12).then(|| (*t, t.bounds(), area))
            })
            .collect();
        let w = self.width as usize;
        self.depth
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                let py = y as f64 + 0.5;
                for (t, (bx0, by0, bx1, by1), area) in &prepared {
                    if py < *by0 || py > *by1 {
                        continue;
                    }
                    let x_start = bx0.floor().max(0.0) as usize;
                    let x_end = (bx1.ceil().max(0.0) as usize).min(w);
                    for (x, slot) in row.iter_mut().enumerate().take(x_end).skip(x_start) {
                        let p = Point::new(x as f64 + 0.5, py);
                        let w0 = edge(t.p[1], t.p[2], p) / area;
                        let w1 = edge(t.p[2], t.p[0], p) / area;
                        let w2 = edge(t.p[0], t.p[1], p) / area;
                        if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                            continue;
                        }
                        let d = (w0 * t.depth[0] + w1 * t.depth[1] + w2 * t.depth[2]) as f32;
                        if d < *slot {
                            *slot = d;
                        }
                    }
                }
            });
    }

    /// Fill untouched pixels with the depth of the ground plane where the view ray meets it.
    pub fn fill_ground(&mut self, camera: &OrthoCamera, ground_y: f64) {
        let w = self.width as usize;
        self.depth
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, slot) in row.iter_mut().enumerate() {
                    if slot.is_finite() {
                        continue;
                    }
                    if let Some((_, t)) =
                        camera.hit_horizontal_plane(x as f64 + 0.5, y as f64 + 0.5, ground_y)
                    {
                        *slot = t as f32;
                    }
                }
            });
    }
}

fn edge(a: Point, b: Point, p: Point) -> f64 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}
