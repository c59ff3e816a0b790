//! Bookmock turns cover and spine artwork into a lit 3-D book mockup.
//!
//! The pipeline is headless and CPU-only:
//!
//! - Decode uploads into [`Bitmap`]s held by [`AssetSlots`]
//! - [`assemble`] a [`SceneGraph`] for the chosen [`BindingType`]
//! - [`compute_viewport`] for the requested output size and pixel budget
//! - Render with [`CpuRenderer`] into a premultiplied [`FrameRGBA`]
//! - Export as PNG, copy to a clipboard, or sample a color
//!
//! [`MockupSession`] owns all of the above for one interactive mockup.
#![forbid(unsafe_code)]

mod foundation;

/// Bitmaps, colors, decoding, default resources and upload slots.
pub mod assets;
/// JSON configuration and environment overrides.
pub mod config;
/// PNG, clipboard and color-sample exports.
pub mod export;
/// Scene graph construction per binding type.
pub mod geometry;
/// Book data model.
pub mod model;
/// CPU scene renderer and post passes.
pub mod render;
/// Session-oriented API.
pub mod session;
/// Output resolution and camera zoom policy.
pub mod sizing;

pub use crate::foundation::core::{Affine, Point, Transform3, Vec3};
pub use crate::foundation::error::{BookmockError, BookmockResult};

pub use crate::assets::bitmap::{Bitmap, BitmapId};
pub use crate::assets::color::{BackColor, Rgba8};
pub use crate::assets::decode::{AssetDecoder, AssetKind, StandardDecoder, decode_asset};
pub use crate::assets::defaults::DefaultAssets;
pub use crate::assets::slots::{AssetSlots, IntakeOutcome, PasteOutcome, PendingPaste, SlotKind};
pub use crate::config::{MockupConfig, RenderConfig};
pub use crate::export::clipboard::{ClipboardSink, MemoryClipboard, export_clipboard};
#[cfg(feature = "clipboard")]
pub use crate::export::clipboard::SystemClipboard;
pub use crate::export::png::{encode_png, export_file, export_label};
pub use crate::export::sample::sample_color;
pub use crate::geometry::assemble::assemble;
pub use crate::geometry::scene::SceneGraph;
pub use crate::model::binding::{BindingType, ScalingMode};
pub use crate::model::book::BookModel;
pub use crate::model::units::{SizeInput, SpineWidth, Unit, UnitLimits};
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::lighting::LightingRecipe;
pub use crate::session::mockup::MockupSession;
pub use crate::sizing::policy::{SizingCalibration, ViewportSpec, compute_viewport};
