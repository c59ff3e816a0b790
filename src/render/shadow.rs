use std::f64::consts::TAU;

use crate::{
    foundation::core::{Affine, Vec3},
    foundation::error::{BookmockError, BookmockResult},
    foundation::math::{Fnv1a64, SplitMix64},
    geometry::scene::SceneGraph,
    render::cpu::affine_to_cpu,
    render::lighting::ShadowLight,
};

/// Axis-aligned region of the ground plane covered by the shadow map (world X/Z).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundRect {
    pub x0: f64,
    pub z0: f64,
    pub x1: f64,
    pub z1: f64,
}

/// Borrowed snapshot of the accumulated coverage. Plain data, so row passes can share it.
#[derive(Clone, Copy, Debug)]
pub struct GroundCoverage<'a> {
    domain: GroundRect,
    size: u32,
    sum: &'a [u32],
    samples_done: u32,
}

impl GroundCoverage<'_> {
    pub fn samples_done(&self) -> u32 {
        self.samples_done
    }

    /// Averaged coverage in `0..=1` at a ground point, bilinearly filtered.
    pub fn at(&self, x: f64, z: f64) -> f64 {
        if self.samples_done == 0 {
            return 0.0;
        }
        let d = self.domain;
        let n = self.size as usize;
        let fx = (x - d.x0) / (d.x1 - d.x0) * n as f64 - 0.5;
        let fz = (z - d.z0) / (d.z1 - d.z0) * n as f64 - 0.5;
        if fx < -0.5 || fz < -0.5 || fx > n as f64 - 0.5 || fz > n as f64 - 0.5 {
            return 0.0;
        }
        let x0 = fx.floor().max(0.0) as usize;
        let z0 = fz.floor().max(0.0) as usize;
        let x1 = (x0 + 1).min(n - 1);
        let z1 = (z0 + 1).min(n - 1);
        let tx = (fx - x0 as f64).clamp(0.0, 1.0);
        let tz = (fz - z0 as f64).clamp(0.0, 1.0);
        let at = |i: usize, j: usize| f64::from(self.sum[j * n + i]);
        let a = at(x0, z0) + (at(x1, z0) - at(x0, z0)) * tx;
        let b = at(x0, z1) + (at(x1, z1) - at(x0, z1)) * tx;
        let v = a + (b - a) * tz;
        (v / (255.0 * f64::from(self.samples_done))).clamp(0.0, 1.0)
    }
}

/// Soft ground shadow built up one jittered light sample at a time.
///
/// The bake is keyed by the caster geometry and the shadow light. A different key discards
/// every sample; camera and viewport changes never touch it.
pub struct ShadowAccumulator {
    size: u32,
    key: Option<u64>,
    casters: Vec<[Vec3; 3]>,
    light: Option<ShadowLight>,
    ground_y: f64,
    domain: GroundRect,
    sum: Vec<u32>,
    samples_done: u32,
    rng: SplitMix64,
    ctx: Option<vello_cpu::RenderContext>,
    restarts: u64,
}

impl std::fmt::Debug for ShadowAccumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadowAccumulator")
            .field("size", &self.size)
            .field("key", &self.key)
            .field("domain", &self.domain)
            .field("samples_done", &self.samples_done)
            .field("restarts", &self.restarts)
            .finish_non_exhaustive()
    }
}

impl ShadowAccumulator {
    /// `map_size` is the edge length of the square shadow map in texels.
    pub fn new(map_size: u32) -> Self {
        let size = map_size.clamp(8, u32::from(u16::MAX));
        Self {
            size,
            key: None,
            casters: Vec::new(),
            light: None,
            ground_y: 0.0,
            domain: GroundRect {
                x0: -1.0,
                z0: -1.0,
                x1: 1.0,
                z1: 1.0,
            },
            sum: vec![0; (size as usize) * (size as usize)],
            samples_done: 0,
            rng: SplitMix64::new(0),
            ctx: None,
            restarts: 0,
        }
    }

    /// Fingerprint of caster geometry and light.
    pub fn key_for(scene: &SceneGraph, light: &ShadowLight, map_size: u32) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(map_size);
        h.write_f64(scene.ground_y);
        light.fingerprint(&mut h);
        for tri in scene.shadow_casters() {
            for v in tri {
                h.write_f64(v.x);
                h.write_f64(v.y);
                h.write_f64(v.z);
            }
        }
        h.finish()
    }

    /// Point the accumulator at `scene` under `light`. Returns `true` when the bake restarted.
    pub fn sync(&mut self, scene: &SceneGraph, light: &ShadowLight) -> bool {
        let key = Self::key_for(scene, light, self.size);
        if self.key == Some(key) {
            return false;
        }
        self.key = Some(key);
        self.casters = scene.shadow_casters();
        self.light = Some(*light);
        self.ground_y = scene.ground_y;
        self.domain = self.compute_domain(light);
        self.sum.iter_mut().for_each(|s| *s = 0);
        self.samples_done = 0;
        self.rng = SplitMix64::new(key);
        self.restarts += 1;
        tracing::debug!(
            key,
            casters = self.casters.len(),
            samples = light.samples,
            "shadow bake restarted"
        );
        true
    }

    pub fn key(&self) -> Option<u64> {
        self.key
    }

    pub fn samples_done(&self) -> u32 {
        self.samples_done
    }

    pub fn target_samples(&self) -> u32 {
        self.light.map_or(0, |l| l.samples)
    }

    pub fn is_complete(&self) -> bool {
        self.key.is_some() && self.samples_done >= self.target_samples()
    }

    /// Number of times the bake has been discarded and restarted.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn domain(&self) -> GroundRect {
        self.domain
    }

    pub fn ground_y(&self) -> f64 {
        self.ground_y
    }

    /// Advance by up to `n` samples. Returns how many were taken.
    pub fn step(&mut self, n: u32) -> BookmockResult<u32> {
        let Some(light) = self.light else {
            return Ok(0);
        };
        let todo = n.min(light.samples.saturating_sub(self.samples_done));
        for _ in 0..todo {
            self.take_sample(&light)?;
            self.samples_done += 1;
        }
        Ok(todo)
    }

    /// Take every outstanding sample.
    pub fn complete(&mut self) -> BookmockResult<u32> {
        self.step(u32::MAX)
    }

    /// Read-only view of the bake for per-pixel lookups.
    pub fn coverage(&self) -> GroundCoverage<'_> {
        GroundCoverage {
            domain: self.domain,
            size: self.size,
            sum: &self.sum,
            samples_done: self.samples_done,
        }
    }

    /// Averaged coverage in `0..=1` at a ground point, bilinearly filtered.
    pub fn coverage_at(&self, x: f64, z: f64) -> f64 {
        self.coverage().at(x, z)
    }

    fn compute_domain(&self, light: &ShadowLight) -> GroundRect {
        let mut x0 = f64::INFINITY;
        let mut z0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut z1 = f64::NEG_INFINITY;
        let mut spread: f64 = 0.0;
        for v in self.casters.iter().flatten() {
            let p = project_to_ground(*v, light.position, self.ground_y);
            x0 = x0.min(p.x);
            z0 = z0.min(p.z);
            x1 = x1.max(p.x);
            z1 = z1.max(p.z);
            let above = (v.y - self.ground_y).max(0.0);
            let below_light = (light.position.y - v.y).max(1e-3);
            spread = spread.max(light.radius * above / below_light);
        }
        if !x0.is_finite() {
            return GroundRect {
                x0: -1.0,
                z0: -1.0,
                x1: 1.0,
                z1: 1.0,
            };
        }
        let pad = spread + 0.05;
        // Square texels keep the penumbra isotropic.
        let half = ((x1 - x0).max(z1 - z0) * 0.5 + pad).max(1e-3);
        let (cx, cz) = ((x0 + x1) * 0.5, (z0 + z1) * 0.5);
        GroundRect {
            x0: cx - half,
            z0: cz - half,
            x1: cx + half,
            z1: cz + half,
        }
    }

    fn take_sample(&mut self, light: &ShadowLight) -> BookmockResult<()> {
        let n16 = u16::try_from(self.size)
            .map_err(|_| BookmockError::render("shadow map size exceeds u16"))?;
        let r = light.radius * self.rng.next_f64().sqrt();
        let a = TAU * self.rng.next_f64();
        let lp = light.position + Vec3::new(r * a.cos(), 0.0, r * a.sin());

        let d = self.domain;
        let n = f64::from(self.size);
        let world_to_map = Affine::new([
            n / (d.x1 - d.x0),
            0.0,
            0.0,
            n / (d.z1 - d.z0),
            -d.x0 * n / (d.x1 - d.x0),
            -d.z0 * n / (d.z1 - d.z0),
        ]);

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == n16 && ctx.height() == n16 => ctx,
            _ => vello_cpu::RenderContext::new(n16, n16),
        };
        ctx.reset();
        ctx.set_transform(affine_to_cpu(world_to_map));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        for tri in &self.casters {
            let p = tri.map(|v| project_to_ground(v, lp, self.ground_y));
            let mut path = vello_cpu::kurbo::BezPath::new();
            path.move_to((p[0].x, p[0].z));
            path.line_to((p[1].x, p[1].z));
            path.line_to((p[2].x, p[2].z));
            path.close_path();
            ctx.fill_path(&path);
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(n16, n16);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        for (acc, px) in self
            .sum
            .iter_mut()
            .zip(pixmap.data_as_u8_slice().chunks_exact(4))
        {
            *acc += u32::from(px[3]);
        }
        Ok(())
    }
}

/// Central projection of `v` from a point light onto the plane `y = ground_y`.
pub fn project_to_ground(v: Vec3, light: Vec3, ground_y: f64) -> Vec3 {
    let vy = v.y.clamp(ground_y, light.y - 1e-3);
    let t = (light.y - ground_y) / (light.y - vy);
    let p = light + (Vec3::new(v.x, vy, v.z) - light) * t;
    Vec3::new(p.x, ground_y, p.z)
}

#[cfg(test)]
#[path = "../../tests/unit/render/shadow.rs"]
mod tests;
