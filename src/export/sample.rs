use crate::{assets::color::Rgba8, foundation::math::unpremultiply_px, render::frame::FrameRGBA};

/// Read the straight color under a point of the displayed preview.
///
/// `display_size` is the on-screen size of the preview; `(screen_x, screen_y)` is measured
/// from its top-left corner. The point is scaled per axis into frame pixels, then read with a
/// bottom-up row address. `None` when the point misses the frame.
pub fn sample_color(
    frame: &FrameRGBA,
    display_size: (f64, f64),
    screen_x: f64,
    screen_y: f64,
) -> Option<Rgba8> {
    let (dw, dh) = display_size;
    if frame.is_empty() || !(dw > 0.0 && dh > 0.0) || !screen_x.is_finite() || !screen_y.is_finite()
    {
        return None;
    }
    let fx = (screen_x * f64::from(frame.width) / dw).floor();
    let fy = (screen_y * f64::from(frame.height) / dh).floor();
    if fx < 0.0 || fy < 0.0 || fx >= f64::from(frame.width) || fy >= f64::from(frame.height) {
        return None;
    }
    let x = fx as u32;
    let y_up = frame.height - 1 - fy as u32;
    let px = frame.read_pixel_bottom_up(x, y_up)?;
    let [r, g, b, a] = if frame.premultiplied {
        unpremultiply_px(px)
    } else {
        px
    };
    Some(Rgba8 { r, g, b, a })
}
