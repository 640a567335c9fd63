//! Mask refinement: segmentation map to feathered alpha

pub mod blur;
pub mod config;
mod feather;
pub mod morphology;

pub use config::{RefineConfig, ResolvedSizes, Thresholding};
pub use feather::{refine_mask, RefinedMask};
pub use morphology::{close, dilate, erode};
