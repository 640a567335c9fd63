//! Cutout rendering: source photo masked by the edited alpha

use crate::segmentation::Preprocessor;
use image::{GrayImage, RgbaImage};
use rayon::prelude::*;

/// Compose `source` against `mask`.
///
/// The output has the mask's dimensions; the source is resampled to match.
/// Colour is copied and alpha becomes `source.a * mask / 255`.
pub fn composite(source: &RgbaImage, mask: &GrayImage) -> RgbaImage {
    let _span = tracing::debug_span!("composite").entered();

    let (width, height) = mask.dimensions();
    let mut out = Preprocessor::new(width, height).fit_image(source);
    if width == 0 || height == 0 {
        return out;
    }

    let mask_raw = mask.as_raw();
    let row_len = width as usize * 4;
    out.par_chunks_mut(row_len)
        .zip(mask_raw.par_chunks(width as usize))
        .for_each(|(row, mask_row)| {
            for (pixel, &m) in row.chunks_exact_mut(4).zip(mask_row) {
                pixel[3] = scale_alpha(pixel[3], m);
            }
        });

    out
}

/// `a * m / 255`, rounded
fn scale_alpha(a: u8, m: u8) -> u8 {
    ((a as u32 * m as u32 + 127) / 255) as u8
}
