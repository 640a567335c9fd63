//! Person cutout refinement and mask editing
//!
//! Turns a segmentation model's per-pixel output into a feathered alpha
//! mask, lets the mask be touched up with a brush, and renders the masked
//! photo for export.

pub mod composite;
pub mod editor;
mod error;
pub mod output;
pub mod refine;
pub mod request;
pub mod segmentation;
pub mod session;
pub mod source;

pub use composite::composite;
pub use editor::{
    BrushMode, BrushSettings, BrushSize, DisplayGeometry, EditableMaskLayer, Point, PointerButton,
};
pub use error::{CutoutError, Result};
pub use refine::{refine_mask, RefineConfig, RefinedMask, Thresholding};
pub use request::{RequestGate, RequestToken};
pub use segmentation::{Segmentation, SegmentationData, Segmenter};
pub use session::{LoadOutcome, Session};
pub use source::{load_photo, ImageSource, SourceImage};
