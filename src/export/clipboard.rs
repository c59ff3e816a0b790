use crate::{
    export::png::encode_png,
    foundation::error::{BookmockError, BookmockResult},
    render::frame::FrameRGBA,
};

/// One image as handed to a clipboard: the PNG payload plus straight RGBA8 pixels for
/// platforms that only take raw bitmaps.
#[derive(Clone, Debug)]
pub struct ClipboardImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    pub rgba: Vec<u8>,
}

/// Destination for `image/png` clipboard writes.
pub trait ClipboardSink {
    fn write_image(&mut self, image: &ClipboardImage) -> BookmockResult<()>;
}

/// Records every write. Useful headless and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    pub writes: Vec<ClipboardImage>,
    /// When set, every write fails with this message.
    pub fail_with: Option<String>,
}

impl MemoryClipboard {
    pub fn last(&self) -> Option<&ClipboardImage> {
        self.writes.last()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_image(&mut self, image: &ClipboardImage) -> BookmockResult<()> {
        if let Some(msg) = &self.fail_with {
            return Err(BookmockError::export(msg.clone()));
        }
        self.writes.push(image.clone());
        Ok(())
    }
}

/// The desktop clipboard through `arboard`.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> BookmockResult<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| BookmockError::export(format!("open clipboard: {e}")))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn write_image(&mut self, image: &ClipboardImage) -> BookmockResult<()> {
        let data = arboard::ImageData {
            width: image.width as usize,
            height: image.height as usize,
            bytes: std::borrow::Cow::Borrowed(&image.rgba),
        };
        self.inner
            .set_image(data)
            .map_err(|e| BookmockError::export(format!("write clipboard image: {e}")))
    }
}

/// Copy the frame to a clipboard. Failures are logged and reported as `false`.
pub fn export_clipboard(frame: &FrameRGBA, sink: &mut dyn ClipboardSink) -> bool {
    let result = encode_png(frame).and_then(|png| {
        let image = ClipboardImage {
            width: frame.width,
            height: frame.height,
            png,
            rgba: frame.to_straight_rgba8(),
        };
        sink.write_image(&image)
    });
    match result {
        Ok(()) => {
            tracing::info!(width = frame.width, height = frame.height, "mockup copied");
            true
        }
        Err(err) => {
            tracing::warn!(%err, "clipboard export failed");
            false
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/clipboard.rs"]
mod tests;
