use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    assets::bitmap::{Bitmap, BitmapId},
    assets::color::{BackColor, Rgba8},
    assets::defaults::DefaultAssets,
    assets::slots::AssetSlots,
    config::MockupConfig,
    export::clipboard::{ClipboardSink, export_clipboard},
    export::png::{export_file, export_label},
    export::sample::sample_color,
    foundation::error::{BookmockError, BookmockResult},
    geometry::assemble::assemble,
    geometry::scene::SceneGraph,
    model::binding::{BindingType, ScalingMode},
    model::units::{SizeInput, SpineWidth},
    render::cpu::CpuRenderer,
    render::frame::FrameRGBA,
    render::lighting::LightingRecipe,
    sizing::policy::{ViewportSpec, compute_viewport},
};

/// Every input the scene graph depends on. Equal keys give equivalent graphs.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneKey {
    pub binding: BindingType,
    pub cover: BitmapId,
    pub spine: Option<BitmapId>,
    pub cover_aspect_bits: u64,
    pub spine_aspect_bits: u64,
    pub back_color: Option<BackColor>,
    pub spine_width: Option<SpineWidth>,
}

/// Inputs after placeholder substitution.
struct Effective {
    cover: Arc<Bitmap>,
    spine: Option<Arc<Bitmap>>,
    back_color: Option<BackColor>,
    spine_width: Option<SpineWidth>,
}

/// One interactive mockup.
///
/// Holds user inputs and owns everything derived from them. The scene graph is memoized by
/// [`SceneKey`]; the viewport is cheap and recomputed on demand.
pub struct MockupSession {
    config: MockupConfig,
    resources: Arc<DefaultAssets>,
    slots: AssetSlots,
    binding: BindingType,
    back_color: BackColor,
    spine_width: SpineWidth,
    mode: ScalingMode,
    target: SizeInput,
    renderer: CpuRenderer,
    scene: Option<(SceneKey, Arc<SceneGraph>)>,
    scene_builds: u64,
    frame: Option<FrameRGBA>,
}

impl std::fmt::Debug for MockupSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockupSession")
            .field("binding", &self.binding)
            .field("mode", &self.mode)
            .field("target", &self.target)
            .field("slots", &self.slots)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

/// Target size used until the user enters one.
pub const DEFAULT_TARGET_PX: f64 = 1200.0;

impl MockupSession {
    /// Session over the process-wide default assets.
    pub fn new(config: MockupConfig) -> BookmockResult<Self> {
        Ok(Self::with_resources(config, DefaultAssets::shared()?))
    }

    pub fn with_resources(config: MockupConfig, resources: Arc<DefaultAssets>) -> Self {
        let renderer = CpuRenderer::new(config.render.clone());
        Self {
            config,
            resources,
            slots: AssetSlots::new(),
            binding: BindingType::default(),
            back_color: BackColor::default(),
            spine_width: SpineWidth::DEFAULT,
            mode: ScalingMode::default(),
            target: SizeInput::px(DEFAULT_TARGET_PX),
            renderer,
            scene: None,
            scene_builds: 0,
            frame: None,
        }
    }

    pub fn config(&self) -> &MockupConfig {
        &self.config
    }

    pub fn slots(&self) -> &AssetSlots {
        &self.slots
    }

    /// Upload and paste entry points. Slot changes are picked up by the next [`Self::scene`].
    pub fn slots_mut(&mut self) -> &mut AssetSlots {
        &mut self.slots
    }

    pub fn binding(&self) -> BindingType {
        self.binding
    }

    pub fn set_binding(&mut self, binding: BindingType) {
        self.binding = binding;
    }

    pub fn back_color(&self) -> BackColor {
        self.back_color
    }

    pub fn set_back_color(&mut self, color: BackColor) {
        self.back_color = color;
    }

    pub fn spine_width(&self) -> SpineWidth {
        self.spine_width
    }

    pub fn set_spine_width(&mut self, width: SpineWidth) -> BookmockResult<()> {
        let px = width.to_px();
        if !px.is_finite() || px <= 0.0 {
            return Err(BookmockError::validation(format!(
                "spine width must be > 0 (got {} {})",
                width.value, width.unit
            )));
        }
        self.spine_width = width;
        Ok(())
    }

    pub fn scaling_mode(&self) -> ScalingMode {
        self.mode
    }

    pub fn set_scaling_mode(&mut self, mode: ScalingMode) {
        self.mode = mode;
    }

    pub fn target_size(&self) -> SizeInput {
        self.target
    }

    /// Set the pinned output dimension. Rejects non-positive sizes; clamping happens later.
    pub fn set_target_size(&mut self, size: SizeInput) -> BookmockResult<()> {
        size.to_clamped_px(&self.config.units)?;
        self.target = size;
        Ok(())
    }

    pub fn renderer(&self) -> &CpuRenderer {
        &self.renderer
    }

    /// Number of times the scene graph was rebuilt.
    pub fn scene_builds(&self) -> u64 {
        self.scene_builds
    }

    /// Most recent frame from [`Self::render`].
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    pub fn recipe(&self) -> LightingRecipe {
        LightingRecipe::for_binding(self.binding)
    }

    fn effective(&self) -> Effective {
        let binding = self.binding;
        let cover = match self.slots.cover() {
            Some(c) => Arc::clone(c),
            None => Arc::clone(&self.resources.placeholder_cover),
        };
        let spine = if !binding.uses_spine_image() {
            None
        } else {
            match (self.slots.spine(), binding.requires_spine_image()) {
                (Some(s), _) => Some(Arc::clone(s)),
                (None, true) => Some(Arc::clone(&self.resources.placeholder_spine)),
                (None, false) => None,
            }
        };
        Effective {
            cover,
            spine,
            back_color: binding.uses_back_color().then_some(self.back_color),
            spine_width: binding.uses_spine_width().then_some(self.spine_width),
        }
    }

    fn key_for(&self, inputs: &Effective) -> SceneKey {
        let spine_aspect = match (self.binding, &inputs.spine, inputs.spine_width) {
            (BindingType::Saddlestitch, _, _) => 0.0,
            (BindingType::SpiralBound, _, Some(w)) => w.to_px() / f64::from(inputs.cover.height()),
            (_, Some(s), _) => s.aspect(),
            _ => 0.0,
        };
        SceneKey {
            binding: self.binding,
            cover: inputs.cover.id(),
            spine: inputs.spine.as_ref().map(|s| s.id()),
            cover_aspect_bits: inputs.cover.aspect().to_bits(),
            spine_aspect_bits: spine_aspect.to_bits(),
            back_color: inputs.back_color,
            spine_width: inputs.spine_width,
        }
    }

    /// Scene graph for the current inputs, rebuilt only when its key changes.
    pub fn scene(&mut self) -> BookmockResult<Arc<SceneGraph>> {
        let inputs = self.effective();
        let key = self.key_for(&inputs);
        if let Some((cached, scene)) = &self.scene
            && *cached == key
        {
            return Ok(Arc::clone(scene));
        }
        let scene = Arc::new(assemble(
            &inputs.cover,
            inputs.spine.as_ref(),
            self.binding,
            inputs.back_color,
            inputs.spine_width,
            &self.resources,
        )?);
        self.scene_builds += 1;
        tracing::debug!(binding = %self.binding, builds = self.scene_builds, "scene rebuilt");
        self.scene = Some((key, Arc::clone(&scene)));
        Ok(scene)
    }

    /// Output resolution and zoom for the current inputs.
    pub fn viewport(&mut self) -> BookmockResult<ViewportSpec> {
        let scene = self.scene()?;
        let target_px = self.target.to_clamped_px(&self.config.units)?;
        compute_viewport(&scene.model, self.mode, target_px, &self.config.sizing)
    }

    /// Render the current mockup and keep the frame for export.
    pub fn render(&mut self) -> BookmockResult<&FrameRGBA> {
        let scene = self.scene()?;
        let viewport = self.viewport()?;
        let recipe = self.recipe();
        let frame = self.renderer.render(&scene, &viewport, &recipe)?;
        Ok(self.frame.insert(frame))
    }

    /// One animation-frame step of the ground shadow bake. Returns samples taken.
    pub fn tick(&mut self) -> BookmockResult<u32> {
        let scene = self.scene()?;
        let recipe = self.recipe();
        self.renderer.step_shadow(&scene, &recipe, 1)
    }

    /// Download name for the current cover.
    pub fn export_label(&self) -> String {
        export_label(self.slots.cover_file_name())
    }

    fn rendered_frame(&self) -> BookmockResult<&FrameRGBA> {
        self.frame
            .as_ref()
            .ok_or_else(|| BookmockError::export("no rendered frame available"))
    }

    /// Write the last frame to `<dir>/<label>.png`.
    pub fn export_png(&self, dir: &Path, label: Option<&str>) -> BookmockResult<PathBuf> {
        let frame = self.rendered_frame()?;
        let label = label.map_or_else(|| self.export_label(), str::to_owned);
        export_file(frame, dir, &label)
    }

    /// Copy the last frame. `false` when there is none or the sink failed.
    pub fn copy_to_clipboard(&self, sink: &mut dyn ClipboardSink) -> bool {
        match self.rendered_frame() {
            Ok(frame) => export_clipboard(frame, sink),
            Err(err) => {
                tracing::warn!(%err, "clipboard export skipped");
                false
            }
        }
    }

    /// Color under a point of the displayed preview.
    pub fn sample(&self, display_size: (f64, f64), x: f64, y: f64) -> Option<Rgba8> {
        sample_color(self.frame.as_ref()?, display_size, x, y)
    }

    /// Eyedropper: take the back color from the preview. Returns the picked color.
    pub fn pick_back_color(&mut self, display_size: (f64, f64), x: f64, y: f64) -> Option<BackColor> {
        let picked = BackColor::new(self.sample(display_size, x, y)?);
        self.back_color = picked;
        Some(picked)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/mockup.rs"]
mod tests;
