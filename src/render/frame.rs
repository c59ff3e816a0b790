use crate::foundation::error::{BookmockError, BookmockResult};
use crate::foundation::math::unpremultiply_px;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**, rows top to bottom. The `premultiplied` flag is kept so
/// the convention stays explicit at export boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame filled with one premultiplied color.
    pub fn filled(width: u32, height: u32, premul: [u8; 4]) -> Self {
        let n = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: premul.repeat(n),
            premultiplied: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }

    /// Checks that the buffer matches the dimensions.
    pub fn validate(&self) -> BookmockResult<()> {
        if self.is_empty() {
            return Err(BookmockError::export("no rendered frame available"));
        }
        let expected = (self.width as usize) * (self.height as usize) * 4;
        if self.data.len() != expected {
            return Err(BookmockError::export(format!(
                "frame byte len {} does not match {}x{}",
                self.data.len(),
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    /// Raw pixel at `(x, y)`, top-left origin.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Raw pixel with a bottom-left origin, the way a GPU framebuffer readback addresses rows.
    pub fn read_pixel_bottom_up(&self, x: u32, y_up: u32) -> Option<[u8; 4]> {
        if y_up >= self.height {
            return None;
        }
        self.pixel(x, self.height - 1 - y_up)
    }

    /// Straight-alpha copy of the pixel data.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&unpremultiply_px([px[0], px[1], px[2], px[3]]));
        }
        out
    }
}
