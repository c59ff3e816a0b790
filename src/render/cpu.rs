use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    assets::bitmap::{Bitmap, BitmapId},
    assets::color::Rgba8,
    config::RenderConfig,
    foundation::core::{Affine, Point, Vec3},
    foundation::error::{BookmockError, BookmockResult},
    foundation::math::{Fnv1a64, premultiply_rgba8_in_place},
    geometry::scene::{Material, MaterialBase, NormalMap, SceneGraph},
    render::camera::OrthoCamera,
    render::frame::FrameRGBA,
    render::lighting::{LightingRecipe, ShadowLight},
    render::post,
    render::raster::{DepthBuffer, DepthTri},
    render::shadow::ShadowAccumulator,
    sizing::policy::ViewportSpec,
};

/// Planar convex polygon in world space: the unit the renderer draws.
#[derive(Clone, Debug)]
struct Facet<'a> {
    verts: Vec<(Vec3, [f64; 2])>,
    material: &'a Material,
    normal: Vec3,
    centroid: Vec3,
}

#[derive(Clone, Debug)]
struct ProjectedFacet<'a> {
    facet: Facet<'a>,
    screen: Vec<Point>,
    depths: Vec<f64>,
    depth: f64,
}

/// CPU renderer for book scenes, built on `vello_cpu`.
///
/// Owns the texture cache and the accumulated ground shadow; both survive across renders of
/// the same scene.
pub struct CpuRenderer {
    config: RenderConfig,
    ctx: Option<vello_cpu::RenderContext>,
    textures: HashMap<BitmapId, vello_cpu::Image>,
    shade_cache: HashMap<u64, vello_cpu::Image>,
    shadow: ShadowAccumulator,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("config", &self.config)
            .field("textures", &self.textures.len())
            .field("shadow", &self.shadow)
            .finish_non_exhaustive()
    }
}

impl CpuRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let shadow = ShadowAccumulator::new(config.shadow_map_size);
        Self {
            config,
            ctx: None,
            textures: HashMap::new(),
            shade_cache: HashMap::new(),
            shadow,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn shadow(&self) -> &ShadowAccumulator {
        &self.shadow
    }

    /// Number of cached texture images.
    pub fn cached_textures(&self) -> usize {
        self.textures.len()
    }

    fn shadow_light(&self, recipe: &LightingRecipe) -> ShadowLight {
        match self.config.shadow_samples {
            Some(n) => recipe.with_shadow_samples(n).shadow,
            None => recipe.shadow,
        }
    }

    /// Advance the ground shadow bake for `scene` by up to `n` samples.
    pub fn step_shadow(
        &mut self,
        scene: &SceneGraph,
        recipe: &LightingRecipe,
        n: u32,
    ) -> BookmockResult<u32> {
        let light = self.shadow_light(recipe);
        self.shadow.sync(scene, &light);
        self.shadow.step(n)
    }

    /// Render `scene` at the viewport's output resolution. Completes the shadow bake first.
    #[tracing::instrument(
        skip_all,
        fields(
            binding = %scene.binding,
            width = viewport.output_width_px,
            height = viewport.output_height_px
        )
    )]
    pub fn render(
        &mut self,
        scene: &SceneGraph,
        viewport: &ViewportSpec,
        recipe: &LightingRecipe,
    ) -> BookmockResult<FrameRGBA> {
        let (w16, h16) = output_dims(viewport)?;
        let camera = OrthoCamera::for_viewport(viewport);

        let clear = Rgba8 {
            r: self.config.clear_rgba[0],
            g: self.config.clear_rgba[1],
            b: self.config.clear_rgba[2],
            a: self.config.clear_rgba[3],
        };
        let mut frame = FrameRGBA::filled(
            viewport.output_width_px,
            viewport.output_height_px,
            clear.to_premul_bytes(),
        );

        let light = self.shadow_light(recipe);
        self.shadow.sync(scene, &light);
        let taken = self.shadow.complete()?;
        post::composite_ground_shadow(
            &mut frame,
            &camera,
            self.shadow.coverage(),
            self.shadow.ground_y(),
            &light,
        );

        let facets = project_facets(collect_facets(scene), &camera);
        self.shade_cache.clear();
        let layer = self.draw_facets(&facets, recipe, w16, h16)?;
        post::premul_over_in_place(&mut frame.data, layer.data_as_u8_slice())?;

        let mut depth = DepthBuffer::new(frame.width, frame.height);
        depth.rasterize(&depth_tris(&facets));
        depth.fill_ground(&camera, scene.ground_y);
        post::ambient_occlusion(&mut frame, &depth, &camera, &recipe.ao);
        post::adjust_contrast(&mut frame, recipe.contrast);
        post::anti_alias(&mut frame, recipe.aa_threshold);

        self.retain_textures(scene);
        tracing::debug!(
            facets = facets.len(),
            shadow_samples_taken = taken,
            "frame rendered"
        );
        Ok(frame)
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> BookmockResult<R>,
    ) -> BookmockResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_facets(
        &mut self,
        facets: &[ProjectedFacet<'_>],
        recipe: &LightingRecipe,
        width: u16,
        height: u16,
    ) -> BookmockResult<vello_cpu::Pixmap> {
        let mut dst = vello_cpu::Pixmap::new(width, height);
        self.with_ctx_mut(width, height, |this, ctx| {
            for f in facets {
                this.draw_facet(ctx, f, recipe)?;
            }
            ctx.flush();
            ctx.render_to_pixmap(&mut dst);
            Ok(())
        })?;
        Ok(dst)
    }

    fn draw_facet(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        f: &ProjectedFacet<'_>,
        recipe: &LightingRecipe,
    ) -> BookmockResult<()> {
        if polygon_area(&f.screen).abs() < 0.25 {
            return Ok(());
        }
        let uvs: Vec<[f64; 2]> = f.facet.verts.iter().map(|(_, uv)| *uv).collect();
        let uv_to_screen = uv_affine(&uvs, &f.screen);

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match (&f.facet.material.base, uv_to_screen) {
            (MaterialBase::Texture(bmp), Some(a)) => {
                let img = self.texture_for(bmp)?;
                let (w, h) = (f64::from(bmp.width()), f64::from(bmp.height()));
                ctx.set_transform(affine_to_cpu(
                    a * Affine::scale_non_uniform(1.0 / w, 1.0 / h),
                ));
                ctx.set_paint(img);
                ctx.fill_path(&polygon(uvs.iter().map(|uv| (uv[0] * w, uv[1] * h))));
            }
            (MaterialBase::Texture(bmp), None) => {
                // Degenerate texture mapping: fall back to the texel at the first vertex.
                let [u, v] = uvs[0];
                let x = ((u * f64::from(bmp.width())) as u32).min(bmp.width() - 1);
                let y = ((v * f64::from(bmp.height())) as u32).min(bmp.height() - 1);
                let px = bmp.pixel(x, y).unwrap_or([128, 128, 128, 255]);
                fill_screen(ctx, &f.screen, Rgba8 { r: px[0], g: px[1], b: px[2], a: px[3] });
            }
            (MaterialBase::Color(c), _) => fill_screen(ctx, &f.screen, *c),
        }

        let n = f.facet.normal;
        match (&f.facet.material.normal_map, uv_to_screen) {
            (Some(map), Some(a)) => {
                let Some((tangent, bitangent)) = tangent_frame(&f.facet.verts) else {
                    return Ok(());
                };
                let img = self.shade_image(map, tangent, bitangent, n, f.facet.centroid, recipe)?;
                let (w, h) = (f64::from(map.width), f64::from(map.height));
                ctx.set_transform(affine_to_cpu(
                    a * Affine::scale_non_uniform(1.0 / w, 1.0 / h),
                ));
                ctx.set_paint(img);
                ctx.fill_path(&polygon(uvs.iter().map(|uv| (uv[0] * w, uv[1] * h))));
            }
            _ => {
                let shade = recipe.shade(f.facet.centroid, n);
                if let Some(c) = overlay_color(shade, recipe.highlight) {
                    fill_screen(ctx, &f.screen, c);
                }
            }
        }
        Ok(())
    }

    fn texture_for(&mut self, bmp: &Arc<Bitmap>) -> BookmockResult<vello_cpu::Image> {
        if let Some(img) = self.textures.get(&bmp.id()) {
            return Ok(img.clone());
        }
        let mut bytes = bmp.pixels().to_vec();
        premultiply_rgba8_in_place(&mut bytes);
        let img = rgba_premul_to_image(&bytes, bmp.width(), bmp.height())?;
        self.textures.insert(bmp.id(), img.clone());
        Ok(img)
    }

    /// Per-texel lighting overlay for a normal-mapped facet.
    fn shade_image(
        &mut self,
        map: &Arc<NormalMap>,
        tangent: Vec3,
        bitangent: Vec3,
        normal: Vec3,
        at: Vec3,
        recipe: &LightingRecipe,
    ) -> BookmockResult<vello_cpu::Image> {
        let mut h = Fnv1a64::new_default();
        h.write_u64(map.id);
        for v in [tangent, bitangent, normal, at, recipe.key.position] {
            h.write_f64(v.x);
            h.write_f64(v.y);
            h.write_f64(v.z);
        }
        let key = h.finish();
        if let Some(img) = self.shade_cache.get(&key) {
            return Ok(img.clone());
        }

        let mut pixels = Vec::with_capacity(map.normals.len());
        for tn in &map.normals {
            let n = (tangent * tn.x + bitangent * tn.y + normal * tn.z).normalize();
            let c = overlay_color(recipe.shade(at, n), recipe.highlight)
                .unwrap_or(Rgba8 { r: 0, g: 0, b: 0, a: 0 });
            let p = c.to_premul_bytes();
            pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array(p));
        }
        let w = u16::try_from(map.width)
            .map_err(|_| BookmockError::render("normal map width exceeds u16"))?;
        let h = u16::try_from(map.height)
            .map_err(|_| BookmockError::render("normal map height exceeds u16"))?;
        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
        let img = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.shade_cache.insert(key, img.clone());
        Ok(img)
    }

    fn retain_textures(&mut self, scene: &SceneGraph) {
        let live: HashSet<BitmapId> = scene
            .panels
            .iter()
            .map(|p| &p.material)
            .chain(scene.meshes.iter().map(|m| &m.material))
            .filter_map(|m| match &m.base {
                MaterialBase::Texture(b) => Some(b.id()),
                MaterialBase::Color(_) => None,
            })
            .collect();
        self.textures.retain(|id, _| live.contains(id));
    }
}

fn output_dims(viewport: &ViewportSpec) -> BookmockResult<(u16, u16)> {
    let w = viewport.output_width_px;
    let h = viewport.output_height_px;
    if w == 0 || h == 0 {
        return Err(BookmockError::render(format!(
            "output size must be non-zero (got {w}x{h})"
        )));
    }
    let w16 = u16::try_from(w)
        .map_err(|_| BookmockError::render(format!("output width {w} exceeds {}", u16::MAX)))?;
    let h16 = u16::try_from(h)
        .map_err(|_| BookmockError::render(format!("output height {h} exceeds {}", u16::MAX)))?;
    Ok((w16, h16))
}

fn collect_facets(scene: &SceneGraph) -> Vec<Facet<'_>> {
    let mut out = Vec::new();
    for p in &scene.panels {
        let verts: Vec<(Vec3, [f64; 2])> = p.corners().to_vec();
        let centroid = centroid(&verts);
        out.push(Facet {
            verts,
            material: &p.material,
            normal: p.normal(),
            centroid,
        });
    }
    for m in &scene.meshes {
        for tri in m.world_triangles() {
            let n = (tri[1].0 - tri[0].0).cross(tri[2].0 - tri[0].0);
            if n.length() <= 1e-12 {
                continue;
            }
            let verts = tri.to_vec();
            let centroid = centroid(&verts);
            out.push(Facet {
                verts,
                material: &m.material,
                normal: n.normalize(),
                centroid,
            });
        }
    }
    out
}

fn centroid(verts: &[(Vec3, [f64; 2])]) -> Vec3 {
    let sum = verts.iter().fold(Vec3::ZERO, |acc, (p, _)| acc + *p);
    sum * (1.0 / verts.len().max(1) as f64)
}

/// Cull back faces, project, and sort back to front. Scene surfaces are wound outward.
fn project_facets<'a>(facets: Vec<Facet<'a>>, camera: &OrthoCamera) -> Vec<ProjectedFacet<'a>> {
    let forward = camera.forward();
    let mut out: Vec<ProjectedFacet<'a>> = facets
        .into_iter()
        .filter(|facet| facet.normal.dot(forward) < 0.0)
        .map(|facet| {
            let proj: Vec<_> = facet.verts.iter().map(|(p, _)| camera.project(*p)).collect();
            let depth = camera.project(facet.centroid).depth;
            ProjectedFacet {
                screen: proj.iter().map(|p| p.screen).collect(),
                depths: proj.iter().map(|p| p.depth).collect(),
                depth,
                facet,
            }
        })
        .filter(|f| camera.in_depth_range(f.depth))
        .collect();
    out.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    out
}

fn depth_tris(facets: &[ProjectedFacet<'_>]) -> Vec<DepthTri> {
    let mut out = Vec::new();
    for f in facets {
        for i in 1..f.screen.len().saturating_sub(1) {
            out.push(DepthTri {
                p: [f.screen[0], f.screen[i], f.screen[i + 1]],
                depth: [f.depths[0], f.depths[i], f.depths[i + 1]],
            });
        }
    }
    out
}

/// Black below 1, white above, transparent at exactly 1.
fn overlay_color(shade: f64, highlight: f64) -> Option<Rgba8> {
    let (v, a) = if shade < 1.0 {
        (0u8, 1.0 - shade)
    } else {
        (255u8, (shade - 1.0) * highlight)
    };
    let a = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
    (a > 0).then_some(Rgba8 { r: v, g: v, b: v, a })
}

/// Affine taking texture space (`u`, `v` in 0..=1) to screen pixels, solved from the first
/// three vertices. `None` when the texture coordinates are degenerate.
pub(crate) fn uv_affine(uvs: &[[f64; 2]], screen: &[Point]) -> Option<Affine> {
    if uvs.len() < 3 || screen.len() < 3 {
        return None;
    }
    let (du1, dv1) = (uvs[1][0] - uvs[0][0], uvs[1][1] - uvs[0][1]);
    let (du2, dv2) = (uvs[2][0] - uvs[0][0], uvs[2][1] - uvs[0][1]);
    let det = du1 * dv2 - du2 * dv1;
    if det.abs() < 1e-12 {
        return None;
    }
    let s1 = screen[1] - screen[0];
    let s2 = screen[2] - screen[0];
    // [s1 s2] * inverse([d1 d2])
    let inv = 1.0 / det;
    let a = (s1.x * dv2 - s2.x * dv1) * inv;
    let c = (-s1.x * du2 + s2.x * du1) * inv;
    let b = (s1.y * dv2 - s2.y * dv1) * inv;
    let d = (-s1.y * du2 + s2.y * du1) * inv;
    let e = screen[0].x - a * uvs[0][0] - c * uvs[0][1];
    let f = screen[0].y - b * uvs[0][0] - d * uvs[0][1];
    Some(Affine::new([a, b, c, d, e, f]))
}

/// World-space texture axes: +u and surface-up (-v), unit length.
fn tangent_frame(verts: &[(Vec3, [f64; 2])]) -> Option<(Vec3, Vec3)> {
    if verts.len() < 3 {
        return None;
    }
    let (p0, t0) = verts[0];
    let (p1, t1) = verts[1];
    let (p2, t2) = verts[2];
    let (du1, dv1) = (t1[0] - t0[0], t1[1] - t0[1]);
    let (du2, dv2) = (t2[0] - t0[0], t2[1] - t0[1]);
    let det = du1 * dv2 - du2 * dv1;
    if det.abs() < 1e-12 {
        return None;
    }
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let inv = 1.0 / det;
    let dpdu = (e1 * dv2 - e2 * dv1) * inv;
    let dpdv = (e2 * du1 - e1 * du2) * inv;
    Some((dpdu.normalize(), (-dpdv).normalize()))
}

fn polygon_area(pts: &[Point]) -> f64 {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let (a, b) = (pts[i], pts[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}

fn polygon(pts: impl IntoIterator<Item = (f64, f64)>) -> vello_cpu::kurbo::BezPath {
    let mut path = vello_cpu::kurbo::BezPath::new();
    for (i, p) in pts.into_iter().enumerate() {
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn fill_screen(ctx: &mut vello_cpu::RenderContext, screen: &[Point], c: Rgba8) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    ctx.fill_path(&polygon(screen.iter().map(|p| (p.x, p.y))));
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> BookmockResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| BookmockError::render(format!("texture width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| BookmockError::render(format!("texture height {height} exceeds u16")))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(BookmockError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> BookmockResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
