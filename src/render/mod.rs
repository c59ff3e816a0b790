/// Orthographic camera used for every mockup.
pub mod camera;
/// `vello_cpu` scene renderer.
pub mod cpu;
/// Rendered frame buffers.
pub mod frame;
/// Per-binding lighting recipes.
pub mod lighting;
/// Full-frame post passes: shadow composite, AO, contrast, anti-aliasing.
pub mod post;
/// Software depth rasterization.
pub mod raster;
/// Accumulated soft ground shadow.
pub mod shadow;
