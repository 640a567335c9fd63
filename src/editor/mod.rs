//! Interactive mask touch-up

pub mod brush;
mod layer;
pub mod pointer;

pub use brush::{BrushMode, BrushSettings, BrushSize, Point};
pub use layer::EditableMaskLayer;
pub use pointer::{DisplayGeometry, PointerButton, StrokeTracker};
