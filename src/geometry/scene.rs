use std::sync::Arc;

use crate::{
    assets::bitmap::Bitmap,
    assets::color::Rgba8,
    foundation::core::{Transform3, Vec3},
    model::binding::BindingType,
    model::book::BookModel,
};

/// What a panel or mesh stands for on the physical book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelRole {
    FrontCover,
    Spine,
    PageBlock,
    BackCover,
    BookletCover,
    BookletPages,
}

/// Tangent-space normal map, +Z out of the surface.
#[derive(Debug)]
pub struct NormalMap {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub normals: Vec<Vec3>,
}

/// Surface color source.
#[derive(Clone, Debug)]
pub enum MaterialBase {
    Texture(Arc<Bitmap>),
    Color(Rgba8),
}

#[derive(Clone, Debug)]
pub struct Material {
    pub base: MaterialBase,
    pub normal_map: Option<Arc<NormalMap>>,
    pub casts_shadow: bool,
}

impl Material {
    pub fn texture(bitmap: Arc<Bitmap>) -> Self {
        Self {
            base: MaterialBase::Texture(bitmap),
            normal_map: None,
            casts_shadow: true,
        }
    }

    pub fn color(c: Rgba8) -> Self {
        Self {
            base: MaterialBase::Color(c),
            normal_map: None,
            casts_shadow: true,
        }
    }

    pub fn with_normal_map(mut self, map: Arc<NormalMap>) -> Self {
        self.normal_map = Some(map);
        self
    }
}

/// A centered rectangle in its local XY plane, textured edge to edge. Only its +Z side is drawn.
#[derive(Clone, Debug)]
pub struct Panel {
    pub role: PanelRole,
    /// Local (width, height) before the node transform.
    pub size: (f64, f64),
    pub transform: Transform3,
    pub material: Material,
}

impl Panel {
    /// World-space corners, counter-clockwise from bottom-left, with their texture coordinates
    /// (`u` right, `v` down, both in 0..=1).
    pub fn corners(&self) -> [(Vec3, [f64; 2]); 4] {
        let (w, h) = (self.size.0 * 0.5, self.size.1 * 0.5);
        let local = [
            (Vec3::new(-w, -h, 0.0), [0.0, 1.0]),
            (Vec3::new(w, -h, 0.0), [1.0, 1.0]),
            (Vec3::new(w, h, 0.0), [1.0, 0.0]),
            (Vec3::new(-w, h, 0.0), [0.0, 0.0]),
        ];
        local.map(|(p, uv)| (self.transform.apply_point(p), uv))
    }

    pub fn normal(&self) -> Vec3 {
        self.transform.apply_normal(Vec3::new(0.0, 0.0, 1.0))
    }
}

/// Indexed triangle mesh with per-vertex texture coordinates (`v` down).
#[derive(Debug)]
pub struct TriangleMesh {
    pub name: &'static str,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<[f64; 2]>,
    pub triangles: Vec<[u32; 3]>,
}

#[derive(Clone, Debug)]
pub struct MeshNode {
    pub role: PanelRole,
    pub mesh: Arc<TriangleMesh>,
    pub transform: Transform3,
    pub material: Material,
}

impl MeshNode {
    /// World-space triangles with texture coordinates.
    pub fn world_triangles(&self) -> impl Iterator<Item = [(Vec3, [f64; 2]); 3]> + '_ {
        self.mesh.triangles.iter().map(move |tri| {
            tri.map(|i| {
                let i = i as usize;
                (
                    self.transform.apply_point(self.mesh.positions[i]),
                    self.mesh.uvs[i],
                )
            })
        })
    }
}

/// Invisible box that only contributes to the accumulated ground shadow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSolid {
    pub center: Vec3,
    pub size: Vec3,
}

impl ShadowSolid {
    /// The 12 triangles of the box surface.
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        let h = self.size * 0.5;
        let c = self.center;
        let v = |sx: f64, sy: f64, sz: f64| c + Vec3::new(sx * h.x, sy * h.y, sz * h.z);
        let corners = [
            v(-1.0, -1.0, -1.0),
            v(1.0, -1.0, -1.0),
            v(1.0, 1.0, -1.0),
            v(-1.0, 1.0, -1.0),
            v(-1.0, -1.0, 1.0),
            v(1.0, -1.0, 1.0),
            v(1.0, 1.0, 1.0),
            v(-1.0, 1.0, 1.0),
        ];
        const FACES: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [3, 2, 6, 7],
            [0, 3, 7, 4],
            [1, 2, 6, 5],
        ];
        FACES
            .iter()
            .flat_map(|f| {
                [
                    [corners[f[0]], corners[f[1]], corners[f[2]]],
                    [corners[f[0]], corners[f[2]], corners[f[3]]],
                ]
            })
            .collect()
    }
}

/// Retained scene for one binding configuration.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    pub binding: BindingType,
    pub model: BookModel,
    pub panels: Vec<Panel>,
    pub meshes: Vec<MeshNode>,
    pub shadow_solid: Option<ShadowSolid>,
    /// Height of the shadow-receiving ground plane.
    pub ground_y: f64,
}

impl SceneGraph {
    pub fn has_role(&self, role: PanelRole) -> bool {
        self.panels.iter().any(|p| p.role == role) || self.meshes.iter().any(|m| m.role == role)
    }

    /// Every triangle that casts onto the ground, in world space.
    pub fn shadow_casters(&self) -> Vec<[Vec3; 3]> {
        let mut out = Vec::new();
        if let Some(solid) = &self.shadow_solid {
            out.extend(solid.triangles());
        }
        for p in self.panels.iter().filter(|p| p.material.casts_shadow) {
            let c = p.corners().map(|(v, _)| v);
            out.push([c[0], c[1], c[2]]);
            out.push([c[0], c[2], c[3]]);
        }
        for m in self.meshes.iter().filter(|m| m.material.casts_shadow) {
            out.extend(m.world_triangles().map(|t| t.map(|(v, _)| v)));
        }
        out
    }

    /// Structural equivalence: same layout, same materials by identity.
    pub fn equivalent(&self, other: &SceneGraph) -> bool {
        fn same_material(a: &Material, b: &Material) -> bool {
            let base = match (&a.base, &b.base) {
                (MaterialBase::Texture(x), MaterialBase::Texture(y)) => x.id() == y.id(),
                (MaterialBase::Color(x), MaterialBase::Color(y)) => x == y,
                _ => false,
            };
            let normals = match (&a.normal_map, &b.normal_map) {
                (Some(x), Some(y)) => x.id == y.id,
                (None, None) => true,
                _ => false,
            };
            base && normals && a.casts_shadow == b.casts_shadow
        }

        self.binding == other.binding
            && self.model == other.model
            && self.shadow_solid == other.shadow_solid
            && self.ground_y == other.ground_y
            && self.panels.len() == other.panels.len()
            && self.meshes.len() == other.meshes.len()
            && self.panels.iter().zip(&other.panels).all(|(a, b)| {
                a.role == b.role
                    && a.size == b.size
                    && a.transform == b.transform
                    && same_material(&a.material, &b.material)
            })
            && self.meshes.iter().zip(&other.meshes).all(|(a, b)| {
                a.role == b.role
                    && Arc::ptr_eq(&a.mesh, &b.mesh)
                    && a.transform == b.transform
                    && same_material(&a.material, &b.material)
            })
    }
}
