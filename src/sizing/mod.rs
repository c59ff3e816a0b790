/// Viewport, zoom and pixel-budget policy.
pub mod policy;
