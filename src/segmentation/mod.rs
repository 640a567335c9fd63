mod map_file;
mod preprocess;
pub mod types;

pub use map_file::MapFileSegmenter;
pub use preprocess::Preprocessor;
pub use types::{Segmentation, SegmentationData, Segmenter};
