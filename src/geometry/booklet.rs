use std::f64::consts::PI;
use std::sync::Arc;

use crate::foundation::core::Vec3;
use crate::geometry::scene::TriangleMesh;

/// Half thickness of the closed booklet, in units of the cover height.
pub const BOOKLET_HALF_THICKNESS: f64 = 0.006;

const FOLD_SEGMENTS: usize = 6;
const FOLD_U: f64 = 0.02;
const PAGE_STRIPS: usize = 8;

/// Unit booklet: 1 wide, 1 tall, centered on the origin, cover facing +Z with the fold on -X.
/// The assembler stretches it along X to the cover's aspect.
#[derive(Clone, Debug)]
pub struct BookletTemplate {
    /// Wrap-around cover: front, fold and back, textured with the cover image.
    pub cover: Arc<TriangleMesh>,
    /// Page edges showing along the top, fanned slightly toward the fore edge.
    pub pages: Arc<TriangleMesh>,
}

impl BookletTemplate {
    pub fn build() -> Self {
        Self {
            cover: Arc::new(cover_mesh()),
            pages: Arc::new(pages_mesh()),
        }
    }
}

struct MeshBuilder {
    positions: Vec<Vec3>,
    uvs: Vec<[f64; 2]>,
    triangles: Vec<[u32; 3]>,
}

impl MeshBuilder {
    fn new() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            triangles: Vec::new(),
        }
    }

    fn vertex(&mut self, p: Vec3, uv: [f64; 2]) -> u32 {
        self.positions.push(p);
        self.uvs.push(uv);
        (self.positions.len() - 1) as u32
    }

    /// Quad `a b c d`, counter-clockwise seen from outside.
    fn quad(&mut self, v: [(Vec3, [f64; 2]); 4]) {
        let [a, b, c, d] = v.map(|(p, uv)| self.vertex(p, uv));
        self.triangles.push([a, b, c]);
        self.triangles.push([a, c, d]);
    }

    fn finish(self, name: &'static str) -> TriangleMesh {
        TriangleMesh {
            name,
            positions: self.positions,
            uvs: self.uvs,
            triangles: self.triangles,
        }
    }
}

fn cover_mesh() -> TriangleMesh {
    let t = BOOKLET_HALF_THICKNESS;
    let mut m = MeshBuilder::new();

    // Front: u runs from the fold to the fore edge.
    m.quad([
        (Vec3::new(-0.5, -0.5, t), [FOLD_U, 1.0]),
        (Vec3::new(0.5, -0.5, t), [1.0, 1.0]),
        (Vec3::new(0.5, 0.5, t), [1.0, 0.0]),
        (Vec3::new(-0.5, 0.5, t), [FOLD_U, 0.0]),
    ]);
    // Back reuses the front artwork.
    m.quad([
        (Vec3::new(0.5, -0.5, -t), [1.0, 1.0]),
        (Vec3::new(-0.5, -0.5, -t), [FOLD_U, 1.0]),
        (Vec3::new(-0.5, 0.5, -t), [FOLD_U, 0.0]),
        (Vec3::new(0.5, 0.5, -t), [1.0, 0.0]),
    ]);

    // Half-cylinder fold joining the two covers on the -X edge.
    let ring = |i: usize| {
        let a = PI * 0.5 + PI * (i as f64) / (FOLD_SEGMENTS as f64);
        let x = -0.5 + t * a.cos();
        let z = t * a.sin();
        let u = FOLD_U * (1.0 - (i as f64) / (FOLD_SEGMENTS as f64));
        (x, z, u)
    };
    for i in 0..FOLD_SEGMENTS {
        let (x0, z0, u0) = ring(i);
        let (x1, z1, u1) = ring(i + 1);
        m.quad([
            (Vec3::new(x1, -0.5, z1), [u1, 1.0]),
            (Vec3::new(x0, -0.5, z0), [u0, 1.0]),
            (Vec3::new(x0, 0.5, z0), [u0, 0.0]),
            (Vec3::new(x1, 0.5, z1), [u1, 0.0]),
        ]);
    }

    m.finish("booklet-cover")
}

fn pages_mesh() -> TriangleMesh {
    let t = BOOKLET_HALF_THICKNESS * 0.9;
    let mut m = MeshBuilder::new();

    // Top edge: strips across the thickness, each sheet sagging a little more toward the middle.
    for i in 0..PAGE_STRIPS {
        let z0 = -t + 2.0 * t * (i as f64) / (PAGE_STRIPS as f64);
        let z1 = -t + 2.0 * t * ((i + 1) as f64) / (PAGE_STRIPS as f64);
        let mid = ((z0 + z1) * 0.5 / t).abs();
        let y = 0.4985 - 0.0015 * (1.0 - mid);
        let fan = 0.002 * (1.0 - mid);
        let v0 = (i as f64) / (PAGE_STRIPS as f64);
        let v1 = ((i + 1) as f64) / (PAGE_STRIPS as f64);
        m.quad([
            (Vec3::new(-0.5 + t, y, z1), [0.0, v1]),
            (Vec3::new(0.497 - fan, y, z1), [1.0, v1]),
            (Vec3::new(0.497 - fan, y, z0), [1.0, v0]),
            (Vec3::new(-0.5 + t, y, z0), [0.0, v0]),
        ]);
    }

    // Fore edge.
    m.quad([
        (Vec3::new(0.497, -0.4985, t), [0.0, 1.0]),
        (Vec3::new(0.497, -0.4985, -t), [1.0, 1.0]),
        (Vec3::new(0.497, 0.4985, -t), [1.0, 0.0]),
        (Vec3::new(0.497, 0.4985, t), [0.0, 0.0]),
    ]);

    m.finish("booklet-pages")
}
