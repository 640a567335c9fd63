use super::{blur, morphology};

/// How the segmentation output is turned into the initial alpha profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Thresholding {
    /// Binarise at `threshold` and assign core / near-edge / halo bands
    HardBinary { threshold: f32 },

    /// Keep the model's confidence as a soft ramp around `threshold`,
    /// anchored by the closed silhouette
    ProbabilityBand {
        threshold: f32,
        softness: f32,
        exponent: f32,
    },
}

impl Thresholding {
    pub fn hard() -> Self {
        Thresholding::HardBinary { threshold: 0.5 }
    }

    pub fn band() -> Self {
        Thresholding::ProbabilityBand {
            threshold: 0.5,
            softness: 0.15,
            exponent: 0.75,
        }
    }

    /// Cut-off used to build the binary silhouette
    pub fn threshold(&self) -> f32 {
        match *self {
            Thresholding::HardBinary { threshold } => threshold,
            Thresholding::ProbabilityBand { threshold, .. } => threshold,
        }
    }
}

impl Default for Thresholding {
    fn default() -> Self {
        Self::hard()
    }
}

/// Parameters of the feathering pipeline.
///
/// Morphology and blur sizes left as `None` are derived from the image's
/// longest edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineConfig {
    pub strategy: Thresholding,
    pub dilation: Option<u32>,
    pub erosion: Option<u32>,
    pub blur_radius: Option<u32>,
    pub min_foreground_ratio: f64,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            strategy: Thresholding::default(),
            dilation: None,
            erosion: None,
            blur_radius: None,
            min_foreground_ratio: 0.0005,
        }
    }
}

impl RefineConfig {
    pub fn with_strategy(mut self, strategy: Thresholding) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_morphology(mut self, dilation: Option<u32>, erosion: Option<u32>) -> Self {
        self.dilation = dilation;
        self.erosion = erosion;
        self
    }

    pub fn with_blur_radius(mut self, radius: Option<u32>) -> Self {
        self.blur_radius = radius;
        self
    }

    pub fn with_min_foreground_ratio(mut self, ratio: f64) -> Self {
        self.min_foreground_ratio = ratio;
        self
    }

    /// Concrete sizes for an image of the given dimensions
    pub fn resolve(&self, width: u32, height: u32) -> ResolvedSizes {
        let (auto_dilation, auto_erosion) = morphology::iterations_for(width, height);
        let dilation = self.dilation.unwrap_or(auto_dilation);
        // An explicit dilation without an explicit erosion keeps the 3/4 ratio.
        let erosion = match (self.dilation, self.erosion) {
            (_, Some(erosion)) => erosion,
            (Some(d), None) => ((d as f64 * 0.75).round() as u32).max(1),
            (None, None) => auto_erosion,
        };

        ResolvedSizes {
            dilation,
            erosion,
            blur_radius: self
                .blur_radius
                .unwrap_or_else(|| blur::radius_for(width, height)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSizes {
    pub dilation: u32,
    pub erosion: u32,
    pub blur_radius: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_sizes_follow_image() {
        let sizes = RefineConfig::default().resolve(1400, 700);
        assert_eq!(
            sizes,
            ResolvedSizes {
                dilation: 2,
                erosion: 2,
                blur_radius: 6
            }
        );
    }

    #[test]
    fn overrides_win() {
        let config = RefineConfig::default()
            .with_morphology(Some(4), None)
            .with_blur_radius(Some(0));
        let sizes = config.resolve(100, 100);
        assert_eq!(sizes.dilation, 4);
        assert_eq!(sizes.erosion, 3);
        assert_eq!(sizes.blur_radius, 0);
    }
}
