use thiserror::Error;

/// Errors produced while turning a segmentation map into an editable cutout
#[derive(Debug, Error)]
pub enum CutoutError {
    /// Refinement found no plausible foreground
    #[error("no subject detected")]
    NoSubjectDetected,

    /// Raster allocation or resampling failed while preparing the mask
    #[error("mask preparation failed: {0}")]
    MaskPreparationFailed(String),

    /// A newer request superseded this one; the result was discarded
    #[error("request superseded by a newer one")]
    StaleRequest,

    /// The external segmenter failed
    #[error("segmentation failed: {0}")]
    Segmentation(String),

    /// The source image could not be loaded
    #[error("image source failed: {0}")]
    Source(String),

    /// Writing the export artifact failed
    #[error("export failed: {0}")]
    Export(String),

    /// An editor operation was invoked without a ready mask layer
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl CutoutError {
    /// Text shown to the user when a request ends with this error.
    ///
    /// `NoSubjectDetected` gets its own message; everything else is reported
    /// as a generic failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            CutoutError::NoSubjectDetected => {
                "No person could be detected in the image. Please choose another photo."
            }
            CutoutError::Source(_) => "The image could not be loaded.",
            _ => "Something went wrong. Please try again with another image.",
        }
    }

    /// Stale results are dropped silently rather than reported
    pub fn is_silent(&self) -> bool {
        matches!(self, CutoutError::StaleRequest)
    }
}

pub type Result<T> = std::result::Result<T, CutoutError>;
