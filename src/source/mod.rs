mod file;

pub use file::{base_name, FileSource};

use crate::error::CutoutError;
use anyhow::Result;
use image::RgbaImage;

/// A decoded photo together with the name its export is derived from
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub name: String,
    pub image: RgbaImage,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Trait for photo sources
pub trait ImageSource {
    /// Load and decode the photo
    fn load(&mut self) -> Result<SourceImage>;
}

/// Load from `source`, reporting any failure as [`CutoutError::Source`]
pub fn load_photo<S: ImageSource + ?Sized>(source: &mut S) -> crate::Result<SourceImage> {
    source
        .load()
        .map_err(|e| CutoutError::Source(format!("{e:#}")))
}
