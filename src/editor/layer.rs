use super::brush::{paint_segment, BrushMode, BrushSize, Point};
use crate::error::Result;
use crate::segmentation::Preprocessor;
use image::GrayImage;

/// Editable alpha mask with a pristine snapshot to reset to
///
/// `pristine` is captured once at creation and never changes. `current`
/// starts as a copy and is only touched by brush strokes or [`reset`].
///
/// [`reset`]: EditableMaskLayer::reset
#[derive(Debug, Clone)]
pub struct EditableMaskLayer {
    pristine: GrayImage,
    current: GrayImage,
}

impl EditableMaskLayer {
    /// Create a layer at `width`x`height`, resampling `alpha` if needed
    pub fn new(alpha: &GrayImage, width: u32, height: u32) -> Result<Self> {
        let pristine = Preprocessor::new(width, height).fit_mask(alpha)?;
        tracing::debug!("Created {}x{} mask layer", width, height);
        Ok(Self {
            current: pristine.clone(),
            pristine,
        })
    }

    pub fn current(&self) -> &GrayImage {
        &self.current
    }

    pub fn pristine(&self) -> &GrayImage {
        &self.pristine
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.current.dimensions()
    }

    /// Whether any stroke changed `current` since creation or the last reset
    pub fn is_modified(&self) -> bool {
        self.current != self.pristine
    }

    /// Paint one stroke segment into `current`; `width` is clamped like [`BrushSize`]
    pub fn apply_stroke(
        &mut self,
        from: Point,
        to: Point,
        mode: BrushMode,
        width: f32,
    ) -> usize {
        let width = BrushSize::new(width).get();
        paint_segment(&mut self.current, from, to, mode, width)
    }

    /// Discard all edits
    pub fn reset(&mut self) {
        self.current.clone_from(&self.pristine);
    }
}
