use std::sync::Arc;

use crate::{
    assets::bitmap::Bitmap,
    assets::decode::{AssetDecoder, AssetKind, StandardDecoder},
    foundation::error::BookmockResult,
    model::binding::BindingType,
};

/// User image slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Cover,
    Spine,
}

impl SlotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Spine => "spine",
        }
    }
}

/// Handle for one in-flight upload. Generations increase monotonically per slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTicket {
    slot: SlotKind,
    generation: u64,
    file_name: Option<String>,
}

impl UploadTicket {
    pub fn slot(&self) -> SlotKind {
        self.slot
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What an intake call did to the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// The slot now holds the new bitmap.
    Applied,
    /// Unsupported MIME type; nothing happened.
    Ignored,
    /// A later upload to the same slot was applied first.
    Superseded,
    /// Decoding failed; the slot keeps its previous bitmap.
    Rejected,
}

/// Pasted PNG bytes waiting for the user to pick a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPaste {
    bytes: Vec<u8>,
}

impl PendingPaste {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Only one slot was possible; the paste went straight into it.
    Applied(IntakeOutcome),
    /// Cover or spine? Resolve with [`AssetSlots::apply_paste`].
    NeedsSlot(PendingPaste),
}

#[derive(Clone, Debug, Default)]
struct Slot {
    bitmap: Option<Arc<Bitmap>>,
    file_name: Option<String>,
    issued: u64,
    applied: u64,
}

/// Cover and spine bitmaps plus the bookkeeping for uploads into them.
pub struct AssetSlots {
    cover: Slot,
    spine: Slot,
    decoder: Box<dyn AssetDecoder + Send + Sync>,
}

impl std::fmt::Debug for AssetSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetSlots")
            .field("cover", &self.cover.bitmap.as_ref().map(|b| b.id()))
            .field("cover_file_name", &self.cover.file_name)
            .field("spine", &self.spine.bitmap.as_ref().map(|b| b.id()))
            .finish_non_exhaustive()
    }
}

impl Default for AssetSlots {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSlots {
    pub fn new() -> Self {
        Self::with_decoder(Box::new(StandardDecoder))
    }

    pub fn with_decoder(decoder: Box<dyn AssetDecoder + Send + Sync>) -> Self {
        Self {
            cover: Slot::default(),
            spine: Slot::default(),
            decoder,
        }
    }

    pub fn cover(&self) -> Option<&Arc<Bitmap>> {
        self.cover.bitmap.as_ref()
    }

    pub fn spine(&self) -> Option<&Arc<Bitmap>> {
        self.spine.bitmap.as_ref()
    }

    /// File name of the uploaded cover, if it came from a file.
    pub fn cover_file_name(&self) -> Option<&str> {
        self.cover.file_name.as_deref()
    }

    pub fn get(&self, slot: SlotKind) -> Option<&Arc<Bitmap>> {
        self.slot(slot).bitmap.as_ref()
    }

    /// Put an already-decoded bitmap into a slot, superseding anything in flight.
    pub fn set(&mut self, slot: SlotKind, bitmap: Bitmap, file_name: Option<&str>) {
        let ticket = self.begin_upload(slot, file_name);
        self.finish_upload(ticket, Ok(bitmap));
    }

    /// Empty a slot. In-flight uploads issued earlier are discarded.
    pub fn clear(&mut self, slot: SlotKind) {
        let s = self.slot_mut(slot);
        s.issued += 1;
        s.applied = s.issued;
        s.bitmap = None;
        s.file_name = None;
    }

    /// Register an upload whose decode may finish later, possibly out of order.
    pub fn begin_upload(&mut self, slot: SlotKind, file_name: Option<&str>) -> UploadTicket {
        let s = self.slot_mut(slot);
        s.issued += 1;
        UploadTicket {
            slot,
            generation: s.issued,
            file_name: file_name.map(str::to_owned),
        }
    }

    /// Apply a finished decode unless a later upload to the slot already landed.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: BookmockResult<Bitmap>,
    ) -> IntakeOutcome {
        let s = self.slot_mut(ticket.slot);
        if ticket.generation <= s.applied {
            tracing::debug!(
                slot = ticket.slot.as_str(),
                generation = ticket.generation,
                applied = s.applied,
                "stale upload dropped"
            );
            return IntakeOutcome::Superseded;
        }
        match result {
            Ok(bitmap) => {
                tracing::debug!(
                    slot = ticket.slot.as_str(),
                    width = bitmap.width(),
                    height = bitmap.height(),
                    "slot updated"
                );
                s.bitmap = Some(Arc::new(bitmap));
                s.file_name = ticket.file_name;
                s.applied = ticket.generation;
                IntakeOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(
                    slot = ticket.slot.as_str(),
                    file = ticket.file_name.as_deref().unwrap_or(""),
                    %err,
                    "upload could not be decoded; keeping previous image"
                );
                IntakeOutcome::Rejected
            }
        }
    }

    /// Filter by MIME type, decode, and apply.
    pub fn intake_upload(
        &mut self,
        slot: SlotKind,
        mime: &str,
        bytes: &[u8],
        file_name: Option<&str>,
    ) -> IntakeOutcome {
        let Some(kind) = AssetKind::from_mime(mime) else {
            tracing::debug!(slot = slot.as_str(), mime, "unsupported upload ignored");
            return IntakeOutcome::Ignored;
        };
        let ticket = self.begin_upload(slot, file_name);
        let result = self.decoder.decode(kind, bytes);
        self.finish_upload(ticket, result)
    }

    /// Clipboard paste. Booklets have a single slot; other bindings ask which slot to fill.
    pub fn paste_png(&mut self, bytes: &[u8], binding: BindingType) -> PasteOutcome {
        if binding.image_slot_count() == 1 {
            return PasteOutcome::Applied(self.intake_upload(
                SlotKind::Cover,
                AssetKind::Png.mime(),
                bytes,
                None,
            ));
        }
        PasteOutcome::NeedsSlot(PendingPaste {
            bytes: bytes.to_vec(),
        })
    }

    pub fn apply_paste(&mut self, pending: PendingPaste, slot: SlotKind) -> IntakeOutcome {
        self.intake_upload(slot, AssetKind::Png.mime(), &pending.bytes, None)
    }

    fn slot(&self, slot: SlotKind) -> &Slot {
        match slot {
            SlotKind::Cover => &self.cover,
            SlotKind::Spine => &self.spine,
        }
    }

    fn slot_mut(&mut self, slot: SlotKind) -> &mut Slot {
        match slot {
            SlotKind::Cover => &mut self.cover,
            SlotKind::Spine => &mut self.spine,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/slots.rs"]
mod tests;
