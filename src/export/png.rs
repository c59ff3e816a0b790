use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::error::{BookmockError, BookmockResult},
    render::frame::FrameRGBA,
};

/// Label used when nothing was uploaded or the name sanitizes to nothing.
pub const UNTITLED_LABEL: &str = "Untitled";

/// Download label derived from the cover's file name.
///
/// Drops the extension, turns whitespace into `_` and keeps only `[A-Za-z0-9_-]`.
pub fn export_label(cover_file_name: Option<&str>) -> String {
    let Some(name) = cover_file_name else {
        return UNTITLED_LABEL.to_owned();
    };
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = base.rfind('.').map_or(base, |i| &base[..i]);
    let label: String = stem
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if label.is_empty() {
        UNTITLED_LABEL.to_owned()
    } else {
        label
    }
}

/// Encode a frame as PNG (straight alpha).
pub fn encode_png(frame: &FrameRGBA) -> BookmockResult<Vec<u8>> {
    frame.validate()?;
    let rgba = frame.to_straight_rgba8();
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| BookmockError::export("frame buffer does not fit its dimensions"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| BookmockError::export(format!("{e:#}")))?;
    Ok(buf)
}

/// Write `<dir>/<label>.png`, creating `dir` if needed.
pub fn export_file(frame: &FrameRGBA, dir: &Path, label: &str) -> BookmockResult<PathBuf> {
    let bytes = encode_png(frame)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;
    let path = dir.join(format!("{label}.png"));
    std::fs::write(&path, &bytes).with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(
        path = %path.display(),
        width = frame.width,
        height = frame.height,
        bytes = bytes.len(),
        "mockup exported"
    );
    Ok(path)
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
