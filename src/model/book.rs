use serde::Serialize;

use crate::{
    assets::bitmap::Bitmap,
    foundation::error::{BookmockError, BookmockResult},
    model::binding::BindingType,
    model::units::SpineWidth,
};

/// Proportions of the book derived from the current bitmaps and binding type.
///
/// World space uses the cover's height as the unit length: the book is always 1 tall,
/// `cover_aspect` wide and `spine_aspect` deep.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BookModel {
    pub binding: BindingType,
    /// Cover width / cover height.
    pub cover_aspect: f64,
    /// Spine width / spine height (0 for saddle-stitched booklets).
    pub spine_aspect: f64,
    /// World units per cover pixel (`1 / cover height`).
    pub normalization: f64,
}

impl BookModel {
    /// Derive proportions.
    ///
    /// Spiral-bound books take their depth from `spine_width` converted through the cover's
    /// pixel scale; other bindings with a spine take it from the spine bitmap.
    pub fn derive(
        cover: &Bitmap,
        spine: Option<&Bitmap>,
        binding: BindingType,
        spine_width: Option<SpineWidth>,
    ) -> BookmockResult<Self> {
        let cover_aspect = cover.aspect();
        let normalization = 1.0 / f64::from(cover.height());

        let spine_aspect = match binding {
            BindingType::Saddlestitch => 0.0,
            BindingType::PerfectBound | BindingType::Hardcover => {
                let spine = spine.ok_or_else(|| {
                    BookmockError::configuration(format!(
                        "{binding} requires a spine image"
                    ))
                })?;
                spine.aspect()
            }
            BindingType::SpiralBound => {
                let width = spine_width.ok_or_else(|| {
                    BookmockError::configuration("spiral-bound requires a spine width")
                })?;
                let px = width.to_px();
                if !px.is_finite() || px <= 0.0 {
                    return Err(BookmockError::configuration(format!(
                        "spine width must be > 0 (got {} {})",
                        width.value, width.unit
                    )));
                }
                px * normalization
            }
        };

        let model = Self {
            binding,
            cover_aspect,
            spine_aspect,
            normalization,
        };
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> BookmockResult<()> {
        let finite = self.cover_aspect.is_finite()
            && self.spine_aspect.is_finite()
            && self.normalization.is_finite();
        let spine_ok = if self.binding == BindingType::Saddlestitch {
            self.spine_aspect >= 0.0
        } else {
            self.spine_aspect > 0.0
        };
        if !finite || self.cover_aspect <= 0.0 || self.normalization <= 0.0 || !spine_ok {
            return Err(BookmockError::validation(format!(
                "degenerate book proportions: {self:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/book.rs"]
mod tests;
