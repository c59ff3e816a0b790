use std::sync::Arc;

use crate::foundation::error::{BookmockError, BookmockResult};
use crate::foundation::math::Fnv1a64;

/// Content fingerprint of a [`Bitmap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitmapId(pub u64);

/// Decoded image: straight RGBA8, row-major, top row first, tightly packed.
///
/// Bitmaps are immutable. A slot that receives a new upload swaps in a new `Arc<Bitmap>`
/// rather than touching the pixels of the old one.
#[derive(Clone, Debug)]
pub struct Bitmap {
    id: BitmapId,
    width: u32,
    height: u32,
    pixels: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Build a bitmap from straight RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> BookmockResult<Self> {
        if width == 0 || height == 0 {
            return Err(BookmockError::validation(format!(
                "bitmap dimensions must be > 0 (got {width}x{height})"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| BookmockError::validation("bitmap size overflow"))?;
        if pixels.len() != expected {
            return Err(BookmockError::validation(format!(
                "bitmap byte len {} does not match {width}x{height}x4",
                pixels.len()
            )));
        }

        let mut h = Fnv1a64::new_default();
        h.write_u32(width);
        h.write_u32(height);
        h.write_bytes(&pixels);

        Ok(Self {
            id: BitmapId(h.finish()),
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    /// Single-color bitmap.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> BookmockResult<Self> {
        let n = (width as usize).saturating_mul(height as usize);
        Self::from_rgba8(width, height, rgba.repeat(n))
    }

    /// Content fingerprint.
    pub fn id(&self) -> BitmapId {
        self.id
    }

    /// Width in pixels (always > 0).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (always > 0).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width / height`.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Straight RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Straight RGBA at `(x, y)`, top-left origin.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.width == other.width && self.height == other.height
    }
}
