use super::{ImageSource, SourceImage};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fallback when a file name has nothing left after stripping its extension
const DEFAULT_BASE_NAME: &str = "image";

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ImageSource for FileSource {
    fn load(&mut self) -> Result<SourceImage> {
        tracing::info!("Loading image from {}", self.path.display());

        let image = image::open(&self.path)
            .with_context(|| format!("Failed to load image from {}", self.path.display()))?
            .to_rgba8();

        tracing::info!("Image is {}x{}", image.width(), image.height());

        Ok(SourceImage::new(base_name(&self.path), image))
    }
}

/// File name with its last extension removed
pub fn base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = match file_name.rfind('.') {
        Some(dot) => &file_name[..dot],
        None => file_name.as_str(),
    };

    if stem.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        stem.to_string()
    }
}
