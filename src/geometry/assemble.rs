use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use crate::{
    assets::bitmap::Bitmap,
    assets::color::BackColor,
    assets::defaults::{COIL_GRAY, DefaultAssets},
    foundation::core::{Transform3, Vec3},
    foundation::error::{BookmockError, BookmockResult},
    geometry::scene::{Material, MeshNode, Panel, PanelRole, SceneGraph, ShadowSolid},
    model::binding::BindingType,
    model::book::BookModel,
    model::units::SpineWidth,
};

/// World height of the ground plane (the book's base).
pub const GROUND_Y: f64 = -0.5;

/// Page block top for glued books; hardcover boards overhang the block slightly.
const PAGE_TOP_Y: f64 = 0.5;
const PAGE_TOP_Y_HARDCOVER: f64 = 0.49;

/// Booklet sits a hair below the ground to avoid z-fighting with the shadow.
const BOOKLET_DROP: f64 = 0.002;

/// Inputs that select the geometry. Borrowed from the session state for one assembly.
#[derive(Clone, Copy, Debug)]
pub struct AssembleInput<'a> {
    pub cover: &'a Arc<Bitmap>,
    pub spine: Option<&'a Arc<Bitmap>>,
    pub binding: BindingType,
    pub back_color: Option<BackColor>,
    pub spine_width: Option<SpineWidth>,
}

/// Build the scene graph for one binding configuration.
///
/// Pure: equal inputs give [`SceneGraph::equivalent`] graphs. Missing required inputs are a
/// configuration error; the session substitutes placeholders before calling this.
#[tracing::instrument(skip_all, fields(binding = %binding))]
pub fn assemble(
    cover: &Arc<Bitmap>,
    spine: Option<&Arc<Bitmap>>,
    binding: BindingType,
    back_color: Option<BackColor>,
    spine_width: Option<SpineWidth>,
    resources: &DefaultAssets,
) -> BookmockResult<SceneGraph> {
    assemble_input(
        AssembleInput {
            cover,
            spine,
            binding,
            back_color,
            spine_width,
        },
        resources,
    )
}

pub fn assemble_input(
    input: AssembleInput<'_>,
    resources: &DefaultAssets,
) -> BookmockResult<SceneGraph> {
    let binding = input.binding;
    let model = BookModel::derive(
        input.cover,
        input.spine.map(|s| s.as_ref()),
        binding,
        input.spine_width,
    )?;

    let graph = match binding {
        BindingType::Saddlestitch => booklet(model, input.cover, resources),
        BindingType::PerfectBound | BindingType::Hardcover | BindingType::SpiralBound => {
            boxed(model, &input, resources)?
        }
    };
    tracing::debug!(
        cover_aspect = model.cover_aspect,
        spine_aspect = model.spine_aspect,
        panels = graph.panels.len(),
        meshes = graph.meshes.len(),
        "scene assembled"
    );
    Ok(graph)
}

fn boxed(
    model: BookModel,
    input: &AssembleInput<'_>,
    resources: &DefaultAssets,
) -> BookmockResult<SceneGraph> {
    let binding = model.binding;
    let ca = model.cover_aspect;
    let sa = model.spine_aspect;
    let hardcover = binding == BindingType::Hardcover;

    let spine_material = match (binding, input.spine) {
        (BindingType::SpiralBound, None) => Material::color(COIL_GRAY),
        (_, Some(s)) => Material::texture(Arc::clone(s)),
        (_, None) => {
            return Err(BookmockError::configuration(format!(
                "{binding} requires a spine image"
            )));
        }
    };
    let back_material = if hardcover {
        Material::color(input.back_color.unwrap_or_default().rgba())
    } else {
        Material::texture(Arc::clone(input.cover))
    };

    let mut front = Material::texture(Arc::clone(input.cover));
    let mut spine = spine_material;
    let mut back = back_material;
    if hardcover {
        let n = &resources.board_normals;
        front = front.with_normal_map(Arc::clone(&n.front));
        spine = spine.with_normal_map(Arc::clone(&n.spine));
        back = back.with_normal_map(Arc::clone(&n.back));
    }

    let top_y = if hardcover {
        PAGE_TOP_Y_HARDCOVER
    } else {
        PAGE_TOP_Y
    };

    let panels = vec![
        Panel {
            role: PanelRole::FrontCover,
            size: (ca, 1.0),
            transform: Transform3::from_translation(Vec3::new(0.0, 0.0, sa * 0.5)),
            material: front,
        },
        Panel {
            role: PanelRole::Spine,
            size: (sa, 1.0),
            transform: Transform3::from_translation(Vec3::new(-ca * 0.5, 0.0, 0.0))
                .with_rotation(Vec3::new(0.0, -FRAC_PI_2, 0.0)),
            material: spine,
        },
        Panel {
            role: PanelRole::PageBlock,
            size: (ca, sa),
            transform: Transform3::from_translation(Vec3::new(0.0, top_y, 0.0))
                .with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
            material: Material::texture(Arc::clone(&resources.page_edges)),
        },
        Panel {
            role: PanelRole::BackCover,
            size: (ca, 1.0),
            // Turned to face -Z so the artwork reads unmirrored from behind.
            transform: Transform3::from_translation(Vec3::new(0.0, 0.0, -sa * 0.5))
                .with_rotation(Vec3::new(0.0, PI, 0.0)),
            material: back,
        },
    ];

    let shadow_solid = ShadowSolid {
        center: Vec3::new(0.0, -0.25, 0.0),
        size: Vec3::new((ca - 0.01).max(0.0), 0.5, (sa - 0.01).max(0.0)),
    };

    Ok(SceneGraph {
        binding,
        model,
        panels,
        meshes: Vec::new(),
        shadow_solid: Some(shadow_solid),
        ground_y: GROUND_Y,
    })
}

fn booklet(model: BookModel, cover: &Arc<Bitmap>, resources: &DefaultAssets) -> SceneGraph {
    let transform = Transform3::from_translation(Vec3::new(0.0, -BOOKLET_DROP, 0.0))
        .with_scale(Vec3::new(model.cover_aspect, 1.0, 1.0));
    let tpl = &resources.booklet;
    SceneGraph {
        binding: model.binding,
        model,
        panels: Vec::new(),
        meshes: vec![
            MeshNode {
                role: PanelRole::BookletCover,
                mesh: Arc::clone(&tpl.cover),
                transform,
                material: Material::texture(Arc::clone(cover)),
            },
            MeshNode {
                role: PanelRole::BookletPages,
                mesh: Arc::clone(&tpl.pages),
                transform,
                material: Material::texture(Arc::clone(&resources.page_edges)),
            },
        ],
        shadow_solid: None,
        ground_y: GROUND_Y,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/assemble.rs"]
mod tests;
