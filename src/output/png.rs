use super::ExportSink;
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// File name of the exported cutout for a photo named `name`
pub fn export_file_name(name: &str) -> String {
    format!("{name}-no-background.png")
}

/// Writes cutouts as PNG files into a directory
pub struct PngFileExport {
    directory: PathBuf,
    last_written: Option<PathBuf>,
}

impl PngFileExport {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            last_written: None,
        }
    }

    /// Path of the most recent export, if any
    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }
}

impl ExportSink for PngFileExport {
    fn write_cutout(&mut self, name: &str, cutout: &RgbaImage) -> Result<()> {
        let _span = tracing::debug_span!("export_png").entered();

        let path = self.directory.join(export_file_name(name));
        cutout
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write cutout to {}", path.display()))?;

        tracing::info!(
            "Wrote {}x{} cutout to {}",
            cutout.width(),
            cutout.height(),
            path.display()
        );
        self.last_written = Some(path);
        Ok(())
    }
}
