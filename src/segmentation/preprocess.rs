use crate::error::{CutoutError, Result};
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};

use super::types::Segmentation;

/// Resamples masks and images to the output resolution of a cutout
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Resample an alpha mask to the target dimensions
    ///
    /// Bilinear filtering keeps the feathered edge smooth when the model ran
    /// at a lower resolution than the photo.
    pub fn fit_mask(&self, mask: &GrayImage) -> Result<GrayImage> {
        let _span = tracing::debug_span!("fit_mask").entered();

        if self.target_width == 0 || self.target_height == 0 {
            return Err(CutoutError::MaskPreparationFailed(format!(
                "target size {}x{} is empty",
                self.target_width, self.target_height
            )));
        }
        if mask.width() == 0 || mask.height() == 0 {
            return Err(CutoutError::MaskPreparationFailed(
                "mask has no pixels".to_string(),
            ));
        }

        // If dimensions match, no resize needed
        if mask.dimensions() == self.target_size() {
            return Ok(mask.clone());
        }

        Ok(imageops::resize(
            mask,
            self.target_width,
            self.target_height,
            imageops::FilterType::Triangle,
        ))
    }

    /// Resample the source photo to the target dimensions
    pub fn fit_image(&self, image: &RgbaImage) -> RgbaImage {
        if image.dimensions() == self.target_size() {
            return image.clone();
        }

        imageops::resize(
            image,
            self.target_width,
            self.target_height,
            imageops::FilterType::Lanczos3,
        )
    }

    /// Read a greyscale map image as model output.
    ///
    /// With `binary` set, values of 128 and above become foreground labels;
    /// otherwise every value is a probability `v / 255`.
    pub fn segmentation_from_luma(map: &GrayImage, binary: bool) -> Segmentation {
        let (width, height) = map.dimensions();
        if binary {
            let labels = map.pixels().map(|p| u8::from(p[0] >= 128)).collect();
            Segmentation::from_labels(width, height, labels)
        } else {
            let probabilities = map.pixels().map(|p| p[0] as f32 / 255.0).collect();
            Segmentation::from_probabilities(width, height, probabilities)
        }
    }

    /// Convert an alpha mask to an opaque greyscale image for visualization
    pub fn matte_to_rgba(mask: &GrayImage) -> RgbaImage {
        RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
            let Luma([value]) = *mask.get_pixel(x, y);
            Rgba([value, value, value, 255])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::SegmentationData;

    #[test]
    fn fit_mask_keeps_matching_size() {
        let mask = GrayImage::from_fn(4, 3, |x, y| Luma([(x * 10 + y) as u8]));
        let fitted = Preprocessor::new(4, 3).fit_mask(&mask).unwrap();
        assert_eq!(fitted, mask);
    }

    #[test]
    fn fit_mask_scales_constant_mask() {
        let mask = GrayImage::from_pixel(10, 5, Luma([200]));
        let fitted = Preprocessor::new(40, 20).fit_mask(&mask).unwrap();
        assert_eq!(fitted.dimensions(), (40, 20));
        assert!(fitted.pixels().all(|p| p[0] == 200));
    }

    #[test]
    fn fit_mask_rejects_empty_target() {
        let mask = GrayImage::from_pixel(2, 2, Luma([255]));
        let err = Preprocessor::new(0, 5).fit_mask(&mask).unwrap_err();
        assert!(matches!(err, CutoutError::MaskPreparationFailed(_)));
    }

    #[test]
    fn luma_maps_to_labels_or_probabilities() {
        let map = GrayImage::from_raw(3, 1, vec![0, 127, 255]).unwrap();

        let labels = Preprocessor::segmentation_from_luma(&map, true);
        assert_eq!(labels.data, SegmentationData::Labels(vec![0, 0, 1]));

        let probs = Preprocessor::segmentation_from_luma(&map, false);
        assert!((probs.probability(2) - 1.0).abs() < f32::EPSILON);
        assert!((probs.probability(1) - 127.0 / 255.0).abs() < 1e-6);
    }
}
