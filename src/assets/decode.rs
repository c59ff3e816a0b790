use anyhow::Context;

use crate::{
    assets::bitmap::Bitmap,
    foundation::error::{BookmockError, BookmockResult},
};

/// Upload formats accepted by the intake filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// `image/png`.
    Png,
    /// Photoshop document (flattened composite).
    Psd,
}

const PSD_MIME_TYPES: &[&str] = &[
    "image/vnd.adobe.photoshop",
    "application/x-photoshop",
    "application/photoshop",
    "application/psd",
    "image/psd",
];

impl AssetKind {
    /// Map a MIME type to an accepted kind. Unsupported types return `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if mime == "image/png" {
            return Some(Self::Png);
        }
        PSD_MIME_TYPES
            .contains(&mime.as_str())
            .then_some(Self::Psd)
    }

    /// Guess from a file extension (CLI paths carry no MIME type).
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "psd" => Some(Self::Psd),
            _ => None,
        }
    }

    /// Canonical MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Psd => "image/vnd.adobe.photoshop",
        }
    }
}

/// Decoder collaborator turning uploaded bytes into a [`Bitmap`].
pub trait AssetDecoder {
    /// Decode `bytes` of the given kind.
    fn decode(&self, kind: AssetKind, bytes: &[u8]) -> BookmockResult<Bitmap>;
}

/// Default decoder: PNG through `image`, PSD through `psd`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDecoder;

impl AssetDecoder for StandardDecoder {
    fn decode(&self, kind: AssetKind, bytes: &[u8]) -> BookmockResult<Bitmap> {
        decode_asset(kind, bytes)
    }
}

/// Decode encoded bytes of a known kind into straight RGBA8.
pub fn decode_asset(kind: AssetKind, bytes: &[u8]) -> BookmockResult<Bitmap> {
    match kind {
        AssetKind::Png => decode_png(bytes),
        AssetKind::Psd => decode_psd(bytes),
    }
}

/// Decode PNG bytes.
pub fn decode_png(bytes: &[u8]) -> BookmockResult<Bitmap> {
    let dyn_img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .context("decode png from memory")
        .map_err(|e| BookmockError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Bitmap::from_rgba8(width, height, rgba.into_raw())
}

/// Decode a Photoshop document into its flattened composite.
pub fn decode_psd(bytes: &[u8]) -> BookmockResult<Bitmap> {
    check_psd_layout(bytes)?;
    // `psd` indexes slices without bounds checks on malformed input.
    let parsed = std::panic::catch_unwind(|| {
        psd::Psd::from_bytes(bytes)
            .map(|doc| (doc.width(), doc.height(), doc.rgba()))
            .map_err(|e| e.to_string())
    });
    let (width, height, rgba) = match parsed {
        Ok(Ok(decoded)) => decoded,
        Ok(Err(e)) => return Err(BookmockError::decode(format!("parse psd: {e}"))),
        Err(_) => return Err(BookmockError::decode("parse psd: malformed document")),
    };
    Bitmap::from_rgba8(width, height, rgba)
}

const PSD_HEADER_LEN: usize = 26;

fn be_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let b = bytes.get(at..at + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

fn be_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Walk the header, the three length-prefixed sections and the image data prefix.
fn check_psd_layout(bytes: &[u8]) -> BookmockResult<()> {
    let truncated = |what: &str| BookmockError::decode(format!("parse psd: truncated {what}"));
    if bytes.len() < PSD_HEADER_LEN {
        return Err(truncated("header"));
    }
    if &bytes[0..4] != b"8BPS" {
        return Err(BookmockError::decode("parse psd: missing 8BPS signature"));
    }
    let channels = be_u16(bytes, 12).map_or(0, usize::from);
    let height = be_u32(bytes, 14).map_or(0, |v| v as usize);
    let width = be_u32(bytes, 18).map_or(0, |v| v as usize);
    let depth = be_u16(bytes, 22).map_or(0, usize::from);
    if channels == 0 || width == 0 || height == 0 || depth == 0 {
        return Err(BookmockError::decode("parse psd: empty image in header"));
    }

    let mut at = PSD_HEADER_LEN;
    for section in ["color mode data", "image resources", "layer and mask info"] {
        let len = be_u32(bytes, at).ok_or_else(|| truncated(section))? as usize;
        at = at
            .checked_add(4 + len)
            .filter(|end| *end <= bytes.len())
            .ok_or_else(|| truncated(section))?;
    }

    let compression = be_u16(bytes, at).ok_or_else(|| truncated("image data"))?;
    let body = bytes.len() - at - 2;
    let needed = match compression {
        // Raw planes.
        0 => channels
            .saturating_mul(width)
            .saturating_mul(height)
            .saturating_mul(depth.div_ceil(8)),
        // RLE: one u16 byte count per row per channel.
        1 => channels.saturating_mul(height).saturating_mul(2),
        _ => 0,
    };
    if body < needed {
        return Err(truncated("image data"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
