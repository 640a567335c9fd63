use super::preprocess::Preprocessor;
use super::types::{Segmentation, Segmenter};
use anyhow::{Context, Result};
use image::{GrayImage, RgbaImage};
use std::path::{Path, PathBuf};

/// Segmenter backed by a map image produced offline by a person-segmentation model
///
/// The map is a greyscale image where brightness encodes foreground
/// confidence. It may have a different resolution than the photo.
pub struct MapFileSegmenter {
    path: PathBuf,
    binary: bool,
    map: Option<GrayImage>,
}

impl MapFileSegmenter {
    /// # Arguments
    /// * `path` - Greyscale map image
    /// * `binary` - Treat the map as hard labels instead of probabilities
    pub fn new<P: AsRef<Path>>(path: P, binary: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            binary,
            map: None,
        }
    }
}

impl Segmenter for MapFileSegmenter {
    fn prepare(&mut self) -> Result<()> {
        if self.map.is_some() {
            return Ok(());
        }

        tracing::info!("Loading segmentation map from {}", self.path.display());
        let map = image::open(&self.path)
            .with_context(|| {
                format!("Failed to load segmentation map from {}", self.path.display())
            })?
            .to_luma8();
        tracing::debug!("Segmentation map is {}x{}", map.width(), map.height());

        self.map = Some(map);
        Ok(())
    }

    fn segment(&mut self, image: &RgbaImage) -> Result<Segmentation> {
        let _span = tracing::debug_span!("map_segment").entered();

        self.prepare()?;
        let map = self
            .map
            .as_ref()
            .context("Segmentation map not loaded")?;

        if map.dimensions() != image.dimensions() {
            tracing::debug!(
                "Map is {}x{}, image is {}x{}; mask will be resampled",
                map.width(),
                map.height(),
                image.width(),
                image.height()
            );
        }

        Ok(Preprocessor::segmentation_from_luma(map, self.binary))
    }
}
