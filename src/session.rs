//! Per-image orchestration
//!
//! A [`Session`] owns at most one loaded image. Loading runs
//! segment -> refine -> layer -> composite -> export with a request
//! checkpoint between the stages; once ready, pointer input edits the mask,
//! every painted segment re-renders the cutout, and the export is rewritten
//! once per finished stroke.

use crate::composite::composite;
use crate::editor::{
    BrushMode, BrushSettings, BrushSize, DisplayGeometry, EditableMaskLayer, Point, PointerButton,
    StrokeTracker,
};
use crate::error::{CutoutError, Result};
use crate::output::ExportSink;
use crate::refine::{refine_mask, RefineConfig};
use crate::request::{RequestGate, RequestToken};
use crate::segmentation::{Segmentation, Segmenter};
use crate::source::SourceImage;
use image::RgbaImage;

/// Result of a successful load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOutcome {
    pub foreground_ratio: f64,
    pub width: u32,
    pub height: u32,
}

/// State that exists only while an image is ready for editing
struct Editing {
    source: SourceImage,
    layer: EditableMaskLayer,
    cutout: RgbaImage,
    stroke: StrokeTracker,
}

impl Editing {
    fn render(&mut self) {
        self.cutout = composite(&self.source.image, self.layer.current());
    }
}

pub struct Session<E: ExportSink> {
    gate: RequestGate,
    config: RefineConfig,
    brush: BrushSettings,
    exporter: E,
    editing: Option<Editing>,
}

impl<E: ExportSink> Session<E> {
    pub fn new(config: RefineConfig, exporter: E) -> Self {
        Self {
            gate: RequestGate::new(),
            config,
            brush: BrushSettings::default(),
            exporter,
            editing: None,
        }
    }

    pub fn config(&self) -> &RefineConfig {
        &self.config
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.brush.mode = mode;
    }

    /// Set the brush diameter; out-of-range values are clamped
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.size = BrushSize::new(size);
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_stroking(&self) -> bool {
        self.editing.as_ref().is_some_and(|e| e.stroke.is_stroking())
    }

    pub fn layer(&self) -> Option<&EditableMaskLayer> {
        self.editing.as_ref().map(|e| &e.layer)
    }

    /// Latest rendered cutout
    pub fn cutout(&self) -> Option<&RgbaImage> {
        self.editing.as_ref().map(|e| &e.cutout)
    }

    /// Start loading a new image.
    ///
    /// Discards the current layer and supersedes any load still in flight.
    pub fn begin_load(&mut self) -> RequestToken {
        self.editing = None;
        self.gate.begin()
    }

    /// Drop the loaded image; with `cancel_processing` also abandon any load
    /// still in flight
    pub fn reset(&mut self, cancel_processing: bool) {
        if cancel_processing {
            self.gate.cancel();
        }
        self.editing = None;
        tracing::debug!("Session reset");
    }

    /// Run the whole load for `source` under `token`
    pub fn process(
        &mut self,
        token: &RequestToken,
        segmenter: &mut dyn Segmenter,
        source: SourceImage,
    ) -> Result<LoadOutcome> {
        let result = self.run_segmenter(token, segmenter, &source);
        let result = result.and_then(|segmentation| self.install(token, source, &segmentation));
        self.settle(token, result)
    }

    fn run_segmenter(
        &self,
        token: &RequestToken,
        segmenter: &mut dyn Segmenter,
        source: &SourceImage,
    ) -> Result<Segmentation> {
        token.check()?;
        segmenter
            .prepare()
            .map_err(|e| CutoutError::Segmentation(format!("{e:#}")))?;
        token.check()?;

        let segmentation = segmenter
            .segment(&source.image)
            .map_err(|e| CutoutError::Segmentation(format!("{e:#}")))?;
        token.check()?;

        if segmentation.is_empty() {
            return Err(CutoutError::NoSubjectDetected);
        }
        Ok(segmentation)
    }

    /// Finish a load whose segmentation arrived for `token`.
    ///
    /// Nothing in the session changes unless `token` is still current at
    /// every checkpoint.
    pub fn install(
        &mut self,
        token: &RequestToken,
        source: SourceImage,
        segmentation: &Segmentation,
    ) -> Result<LoadOutcome> {
        token.check()?;
        let refined = refine_mask(segmentation, &self.config)?;
        token.check()?;

        let (width, height) = source.dimensions();
        let layer = EditableMaskLayer::new(&refined.alpha, width, height)?;
        let cutout = composite(&source.image, layer.current());
        token.check()?;

        self.exporter
            .write_cutout(&source.name, &cutout)
            .map_err(|e| CutoutError::Export(format!("{e:#}")))?;

        tracing::info!(
            "Ready for editing: {}x{}, foreground ratio {:.4}",
            width,
            height,
            refined.foreground_ratio
        );
        self.editing = Some(Editing {
            source,
            layer,
            cutout,
            stroke: StrokeTracker::new(),
        });

        Ok(LoadOutcome {
            foreground_ratio: refined.foreground_ratio,
            width,
            height,
        })
    }

    /// Failures of a superseded load are reported as stale; failures of the
    /// current load clear the results
    fn settle<T>(&mut self, token: &RequestToken, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(_) if !token.is_current() => Err(CutoutError::StaleRequest),
            Err(e) => {
                tracing::debug!("Load {} failed: {}", token.id(), e);
                self.editing = None;
                Err(e)
            }
        }
    }

    /// Pointer pressed over the render surface.
    ///
    /// Returns whether a stroke started. Ignored when not editing, for
    /// non-painting buttons, or when the position cannot be mapped.
    pub fn pointer_down(
        &mut self,
        position: Point,
        button: PointerButton,
        geometry: &DisplayGeometry,
    ) -> bool {
        let brush = self.brush;
        let Some(editing) = self.editing.as_mut() else {
            return false;
        };
        if !button.can_paint() {
            return false;
        }
        let Some(point) = geometry.to_raster(position) else {
            return false;
        };

        let (from, to) = editing.stroke.begin(point);
        editing
            .layer
            .apply_stroke(from, to, brush.mode, brush.size.get());
        editing.render();
        true
    }

    /// Pointer moved; paints a segment while a stroke is active
    pub fn pointer_move(&mut self, position: Point, geometry: &DisplayGeometry) -> bool {
        let brush = self.brush;
        let Some(editing) = self.editing.as_mut() else {
            return false;
        };
        if !editing.stroke.is_stroking() {
            return false;
        }
        let Some(point) = geometry.to_raster(position) else {
            return false;
        };
        let Some((from, to)) = editing.stroke.extend(point) else {
            return false;
        };

        editing
            .layer
            .apply_stroke(from, to, brush.mode, brush.size.get());
        editing.render();
        true
    }

    /// Pointer released or cancelled.
    ///
    /// Rewrites the export once if the stroke painted anything; returns
    /// whether an export was written.
    pub fn pointer_up(&mut self) -> Result<bool> {
        let Some(editing) = self.editing.as_mut() else {
            return Ok(false);
        };
        if !editing.stroke.finish() {
            return Ok(false);
        }

        self.exporter
            .write_cutout(&editing.source.name, &editing.cutout)
            .map_err(|e| CutoutError::Export(format!("{e:#}")))?;
        Ok(true)
    }

    /// Paint a single segment in raster coordinates with explicit brush settings
    pub fn apply_stroke(
        &mut self,
        from: Point,
        to: Point,
        mode: BrushMode,
        width: f32,
    ) -> Result<()> {
        let editing = self
            .editing
            .as_mut()
            .ok_or(CutoutError::InvalidState("no mask layer to paint on"))?;

        editing.layer.apply_stroke(from, to, mode, width);
        editing.render();
        Ok(())
    }

    /// Discard all brush edits, re-render and re-export
    pub fn reset_mask(&mut self) -> Result<()> {
        let editing = self
            .editing
            .as_mut()
            .ok_or(CutoutError::InvalidState("no mask layer to reset"))?;

        editing.stroke.clear();
        editing.layer.reset();
        editing.render();

        self.exporter
            .write_cutout(&editing.source.name, &editing.cutout)
            .map_err(|e| CutoutError::Export(format!("{e:#}")))?;
        tracing::debug!("Mask reset to its refined state");
        Ok(())
    }
}
