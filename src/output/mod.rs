mod png;

pub use png::{export_file_name, PngFileExport};

use anyhow::Result;
use image::RgbaImage;

/// Trait for export destinations of the finished cutout
pub trait ExportSink {
    /// Encode and store the cutout for the photo named `name`
    fn write_cutout(&mut self, name: &str, cutout: &RgbaImage) -> Result<()>;
}
