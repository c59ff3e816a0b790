use crate::foundation::core::{Point, Vec3};
use crate::sizing::policy::ViewportSpec;

/// Fixed orthographic camera framing the book from the front-left, slightly above.
///
/// `zoom` is output pixels per world unit; the view is centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoCamera {
    pub position: Vec3,
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub near: f64,
    pub far: f64,
    right: Vec3,
    up: Vec3,
    forward: Vec3,
}

/// Projected point: screen position (pixels, y down) and view depth (world units).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub screen: Point,
    pub depth: f64,
}

impl OrthoCamera {
    pub const POSITION: Vec3 = Vec3::new(-4.0, 1.5, 10.0);
    pub const TARGET: Vec3 = Vec3::ZERO;
    pub const NEAR: f64 = 1.0;
    pub const FAR: f64 = 20.0;

    pub fn new(zoom: f64, width: u32, height: u32) -> Self {
        let forward = (Self::TARGET - Self::POSITION).normalize();
        let right = forward.cross(Vec3::UP).normalize();
        let up = right.cross(forward).normalize();
        Self {
            position: Self::POSITION,
            zoom,
            width,
            height,
            near: Self::NEAR,
            far: Self::FAR,
            right,
            up,
            forward,
        }
    }

    pub fn for_viewport(vp: &ViewportSpec) -> Self {
        Self::new(vp.camera_zoom, vp.output_width_px, vp.output_height_px)
    }

    /// Unit view direction (camera to target).
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Screen-right axis in world space.
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Screen-up axis in world space.
    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn project(&self, p: Vec3) -> Projected {
        let d = p - self.position;
        let x = f64::from(self.width) * 0.5 + d.dot(self.right) * self.zoom;
        let y = f64::from(self.height) * 0.5 - d.dot(self.up) * self.zoom;
        Projected {
            screen: Point::new(x, y),
            depth: d.dot(self.forward),
        }
    }

    /// World-space origin of the view ray through screen point `(sx, sy)`.
    pub fn ray_origin(&self, sx: f64, sy: f64) -> Vec3 {
        let dx = (sx - f64::from(self.width) * 0.5) / self.zoom;
        let dy = (f64::from(self.height) * 0.5 - sy) / self.zoom;
        self.position + self.right * dx + self.up * dy
    }

    /// Where the view ray through `(sx, sy)` meets the plane `y = plane_y`, with its depth.
    pub fn hit_horizontal_plane(&self, sx: f64, sy: f64, plane_y: f64) -> Option<(Vec3, f64)> {
        if self.forward.y.abs() <= f64::EPSILON {
            return None;
        }
        let o = self.ray_origin(sx, sy);
        let t = (plane_y - o.y) / self.forward.y;
        if t < self.near || t > self.far {
            return None;
        }
        Some((o + self.forward * t, t))
    }

    /// Whether a depth lies inside the clip range.
    pub fn in_depth_range(&self, depth: f64) -> bool {
        depth >= self.near && depth <= self.far
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/camera.rs"]
mod tests;
