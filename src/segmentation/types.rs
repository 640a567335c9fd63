use anyhow::Result;
use image::RgbaImage;

/// Per-pixel output of a segmentation model, row-major
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationData {
    /// Hard person/background labels; any non-zero value is foreground
    Labels(Vec<u8>),
    /// Foreground confidence in `[0, 1]`
    Probabilities(Vec<f32>),
}

/// Segmentation map at the model's own resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub width: u32,
    pub height: u32,
    pub data: SegmentationData,
}

impl Segmentation {
    pub fn from_labels(width: u32, height: u32, labels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: SegmentationData::Labels(labels),
        }
    }

    pub fn from_probabilities(width: u32, height: u32, probabilities: Vec<f32>) -> Self {
        Self {
            width,
            height,
            data: SegmentationData::Probabilities(probabilities),
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            SegmentationData::Labels(v) => v.len(),
            SegmentationData::Probabilities(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Foreground probability of pixel `index`; labels map to 0.0 or 1.0
    pub fn probability(&self, index: usize) -> f32 {
        match &self.data {
            SegmentationData::Labels(v) => {
                if v[index] != 0 {
                    1.0
                } else {
                    0.0
                }
            }
            SegmentationData::Probabilities(v) => v[index].clamp(0.0, 1.0),
        }
    }
}

/// Person segmentation backend.
///
/// Implementations are opaque collaborators: a model runtime, a remote
/// service, or a precomputed map on disk.
pub trait Segmenter {
    /// Segment the person in `image`
    fn segment(&mut self, image: &RgbaImage) -> Result<Segmentation>;

    /// Make the backend ready before the first request (load weights etc.)
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }
}
