//! Alpha feathering: segmentation map to a soft alpha raster
//!
//! 1. binarise
//! 2. morphological closing
//! 3. banding (hard labels) or confidence ramp (probabilities)
//! 4. Gaussian blur
//! 5. intensity reinforcement, `a + a * (1 - a)`

use super::config::{RefineConfig, ResolvedSizes, Thresholding};
use super::{blur, morphology};
use crate::error::{CutoutError, Result};
use crate::segmentation::Segmentation;
use image::GrayImage;

/// Alpha inside the closed silhouette
const CORE_ALPHA: u8 = 255;
/// Alpha for raw foreground removed again by the erosion step
const NEAR_EDGE_ALPHA: u8 = 210;
/// Alpha for the ring only reached by dilation
const HALO_ALPHA: u8 = 110;
/// Ceiling applied outside the dilated silhouette in ramp mode
const OUTSIDE_CEILING: u8 = 10;

/// Output of the feathering pipeline
#[derive(Debug, Clone)]
pub struct RefinedMask {
    pub alpha: GrayImage,
    pub foreground_ratio: f64,
}

impl RefinedMask {
    pub fn width(&self) -> u32 {
        self.alpha.width()
    }

    pub fn height(&self) -> u32 {
        self.alpha.height()
    }
}

/// Convert a segmentation map into a feathered alpha mask.
///
/// Fails with [`CutoutError::NoSubjectDetected`] when no pixel clears the
/// threshold or when the closed silhouette covers less than
/// `config.min_foreground_ratio` of the frame.
pub fn refine_mask(segmentation: &Segmentation, config: &RefineConfig) -> Result<RefinedMask> {
    let _span = tracing::debug_span!("refine_mask").entered();

    let (width, height) = (segmentation.width, segmentation.height);
    let total = width as usize * height as usize;
    if segmentation.is_empty() {
        return Err(CutoutError::NoSubjectDetected);
    }
    if segmentation.len() != total {
        return Err(CutoutError::MaskPreparationFailed(format!(
            "segmentation has {} values for a {}x{} map",
            segmentation.len(),
            width,
            height
        )));
    }

    let threshold = config.strategy.threshold();
    let binary: Vec<u8> = (0..total)
        .map(|i| {
            if segmentation.probability(i) >= threshold {
                morphology::FOREGROUND
            } else {
                morphology::BACKGROUND
            }
        })
        .collect();

    if !binary.iter().any(|&v| v != 0) {
        tracing::debug!("no pixel reached threshold {}", threshold);
        return Err(CutoutError::NoSubjectDetected);
    }

    let sizes = config.resolve(width, height);
    let ResolvedSizes {
        dilation,
        erosion,
        blur_radius,
    } = sizes;
    tracing::debug!(
        "refining {}x{} map: dilation={}, erosion={}, blur={}",
        width,
        height,
        dilation,
        erosion,
        blur_radius
    );

    let dilated = morphology::dilate(&binary, width, height, dilation);
    let closed = morphology::erode(&dilated, width, height, erosion);

    let foreground = closed.iter().filter(|&&v| v != 0).count();
    let foreground_ratio = foreground as f64 / total as f64;
    if foreground_ratio < config.min_foreground_ratio {
        tracing::debug!("foreground ratio {:.6} below minimum", foreground_ratio);
        return Err(CutoutError::NoSubjectDetected);
    }

    let profile = match config.strategy {
        Thresholding::HardBinary { .. } => band(&binary, &dilated, &closed),
        Thresholding::ProbabilityBand {
            threshold,
            softness,
            exponent,
        } => ramp(segmentation, &dilated, &closed, threshold, softness, exponent),
    };

    let blurred = blur::gaussian_blur(&profile, width, height, blur_radius);
    let alpha: Vec<u8> = blurred.iter().map(|&v| reinforce(v)).collect();

    let alpha = GrayImage::from_raw(width, height, alpha).ok_or_else(|| {
        CutoutError::MaskPreparationFailed("alpha buffer size mismatch".to_string())
    })?;

    tracing::info!(
        "Refined {}x{} mask, foreground ratio {:.4}",
        width,
        height,
        foreground_ratio
    );

    Ok(RefinedMask {
        alpha,
        foreground_ratio,
    })
}

/// Core / near-edge / halo / background alpha levels
fn band(binary: &[u8], dilated: &[u8], closed: &[u8]) -> Vec<u8> {
    closed
        .iter()
        .zip(binary)
        .zip(dilated)
        .map(|((&c, &b), &d)| {
            if c != 0 {
                CORE_ALPHA
            } else if b != 0 {
                NEAR_EDGE_ALPHA
            } else if d != 0 {
                HALO_ALPHA
            } else {
                0
            }
        })
        .collect()
}

/// Confidence ramp anchored to the closed silhouette.
///
/// Inside the closed region alpha is at least the near-edge level, outside
/// the dilated region it is capped near zero, and the ring in between keeps
/// the model's own gradient.
fn ramp(
    segmentation: &Segmentation,
    dilated: &[u8],
    closed: &[u8],
    threshold: f32,
    softness: f32,
    exponent: f32,
) -> Vec<u8> {
    let lower = threshold - softness;
    (0..closed.len())
        .map(|i| {
            let p = segmentation.probability(i);
            let weight = if softness > 0.0 {
                ((p - lower) / (2.0 * softness)).clamp(0.0, 1.0)
            } else if p >= threshold {
                1.0
            } else {
                0.0
            };
            let weight = weight.powf(exponent);
            let alpha = (weight.max(p) * 255.0).round().clamp(0.0, 255.0) as u8;

            if closed[i] != 0 {
                alpha.max(NEAR_EDGE_ALPHA)
            } else if dilated[i] == 0 {
                alpha.min(OUTSIDE_CEILING)
            } else {
                alpha
            }
        })
        .collect()
}

/// Composite a blurred alpha value over itself once (`a + a * (1 - a)`)
fn reinforce(value: f32) -> u8 {
    let a = (value / 255.0).clamp(0.0, 1.0);
    ((a + a * (1.0 - a)) * 255.0).round() as u8
}
