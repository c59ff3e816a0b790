use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{BookmockError, BookmockResult},
    model::binding::{BindingType, ScalingMode},
    model::book::BookModel,
};

/// Calibration constants tying book proportions to the fixed orthographic camera.
///
/// Defaults come from the camera at (-4, 1.5, 10): a world unit along X projects to ~0.93
/// screen units and along Z to ~0.37, so the spine adds ~0.4 of its depth to the framed width.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingCalibration {
    /// `k`: spine depth share of the framed width.
    pub spine_blend: f64,
    /// FixedWidth: `height = target * h_ratio / item_scaling_inv`.
    pub h_ratio: f64,
    /// FixedHeight: `width = target * w_ratio * item_scaling_inv`.
    pub w_ratio: f64,
    /// FixedWidth: `zoom = target / item_scaling_inv / zoom_baseline`.
    pub zoom_baseline: f64,
    /// FixedHeight: `zoom = target / zoom_baseline_height`.
    pub zoom_baseline_height: f64,
    /// Total output pixel budget.
    pub max_pixels: f64,
    /// Output edge length previewed at device pixel ratio 1.
    pub reference_size: f64,
}

impl Default for SizingCalibration {
    fn default() -> Self {
        Self {
            spine_blend: 0.4,
            h_ratio: 1.2,
            w_ratio: 1.0 / 1.2,
            zoom_baseline: 1.3,
            zoom_baseline_height: 1.56,
            max_pixels: 7_200_000.0,
            reference_size: 600.0,
        }
    }
}

impl SizingCalibration {
    pub fn validate(&self) -> BookmockResult<()> {
        let fields = [
            ("spine_blend", self.spine_blend),
            ("h_ratio", self.h_ratio),
            ("w_ratio", self.w_ratio),
            ("zoom_baseline", self.zoom_baseline),
            ("zoom_baseline_height", self.zoom_baseline_height),
            ("max_pixels", self.max_pixels),
            ("reference_size", self.reference_size),
        ];
        for (name, v) in fields {
            let ok = v.is_finite() && if name == "spine_blend" { v >= 0.0 } else { v > 0.0 };
            if !ok {
                return Err(BookmockError::validation(format!(
                    "sizing calibration `{name}` is out of range: {v}"
                )));
            }
        }
        if self.max_pixels < 1.0 {
            return Err(BookmockError::validation("max_pixels must be >= 1"));
        }
        Ok(())
    }
}

/// Output resolution and camera framing for one render.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ViewportSpec {
    pub output_width_px: u32,
    pub output_height_px: u32,
    /// Physical output pixels per world unit.
    pub camera_zoom: f64,
    pub device_pixel_ratio: f64,
    /// True when the pixel budget reduced the requested size.
    pub clamped: bool,
}

impl ViewportSpec {
    /// Logical (on-screen preview) width.
    pub fn viewport_width(&self) -> f64 {
        f64::from(self.output_width_px) / self.device_pixel_ratio
    }

    /// Logical (on-screen preview) height.
    pub fn viewport_height(&self) -> f64 {
        f64::from(self.output_height_px) / self.device_pixel_ratio
    }

    /// Camera zoom in logical pixels per world unit.
    pub fn logical_zoom(&self) -> f64 {
        self.camera_zoom / self.device_pixel_ratio
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.output_width_px) * u64::from(self.output_height_px)
    }
}

/// Aggregate aspect used for framing: cover plus a tuned share of the spine.
pub fn item_scaling_inv(model: &BookModel, calib: &SizingCalibration) -> f64 {
    let spine = if model.binding == BindingType::Saddlestitch {
        0.0
    } else {
        model.spine_aspect * calib.spine_blend
    };
    model.cover_aspect + spine
}

/// Raw (unclamped, unrounded) output size and zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawViewport {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

/// Steps 1 and 2: derive size and zoom from the pinned dimension.
pub fn raw_viewport(
    model: &BookModel,
    mode: ScalingMode,
    target_size: f64,
    calib: &SizingCalibration,
) -> BookmockResult<RawViewport> {
    if !target_size.is_finite() || target_size <= 0.0 {
        return Err(BookmockError::validation(format!(
            "target size must be a positive number (got {target_size})"
        )));
    }
    if !(model.cover_aspect.is_finite() && model.cover_aspect > 0.0)
        || !(model.spine_aspect.is_finite() && model.spine_aspect >= 0.0)
    {
        return Err(BookmockError::validation(format!(
            "book aspects must be finite, cover > 0 and spine >= 0 (got {} / {})",
            model.cover_aspect, model.spine_aspect
        )));
    }
    let inv = item_scaling_inv(model, calib);
    if !inv.is_finite() || inv <= 0.0 {
        return Err(BookmockError::validation(format!(
            "aggregate aspect must be positive (got {inv})"
        )));
    }

    let raw = match mode {
        ScalingMode::FixedWidth => RawViewport {
            width: target_size,
            height: target_size * calib.h_ratio / inv,
            zoom: target_size / inv / calib.zoom_baseline,
        },
        ScalingMode::FixedHeight => RawViewport {
            width: target_size * calib.w_ratio * inv,
            height: target_size,
            zoom: target_size / calib.zoom_baseline_height,
        },
    };
    Ok(raw)
}

/// Derive the output resolution, camera zoom and device pixel ratio.
pub fn compute_viewport(
    model: &BookModel,
    mode: ScalingMode,
    target_size: f64,
    calib: &SizingCalibration,
) -> BookmockResult<ViewportSpec> {
    let raw = raw_viewport(model, mode, target_size, calib)?;
    let RawViewport {
        mut width,
        mut height,
        mut zoom,
    } = raw;

    let area = width * height;
    let clamped = area > calib.max_pixels;
    let (w_px, h_px) = if clamped {
        let s = (area / calib.max_pixels).sqrt();
        width /= s;
        height /= s;
        zoom /= s;
        tracing::debug!(
            requested_w = raw.width,
            requested_h = raw.height,
            scale = s,
            "pixel budget clamp"
        );
        fit_budget(to_px_floor(width), to_px_floor(height), calib.max_pixels)
    } else {
        fit_budget(to_px_round(width), to_px_round(height), calib.max_pixels)
    };

    let longest = w_px.max(h_px);
    let device_pixel_ratio = (longest / calib.reference_size).max(1.0);

    Ok(ViewportSpec {
        output_width_px: w_px as u32,
        output_height_px: h_px as u32,
        camera_zoom: zoom,
        device_pixel_ratio,
        clamped,
    })
}

fn to_px_round(v: f64) -> f64 {
    v.round().clamp(1.0, f64::from(u32::MAX))
}

fn to_px_floor(v: f64) -> f64 {
    v.floor().clamp(1.0, f64::from(u32::MAX))
}

// The 1px minimum can push a sliver past the budget; give the excess back on the long side.
fn fit_budget(w: f64, h: f64, max_pixels: f64) -> (f64, f64) {
    if w * h <= max_pixels {
        return (w, h);
    }
    if w >= h {
        ((max_pixels / h).floor().max(1.0), h)
    } else {
        (w, (max_pixels / w).floor().max(1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sizing/policy.rs"]
mod tests;
