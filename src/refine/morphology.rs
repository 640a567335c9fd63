//! 3x3 binary morphology over `{0, 255}` masks
//!
//! Both operations are double-buffered: every iteration reads the previous
//! buffer and writes a fresh one, so rows can be processed in parallel.
//!
//! The border rules differ on purpose:
//! - dilation ignores neighbours outside the raster
//! - erosion treats any out-of-range neighbour as background, so a
//!   full-frame mask loses its outer ring on every pass

use rayon::prelude::*;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Dilate `mask` with an 8-connected 3x3 element, `iterations` times
pub fn dilate(mask: &[u8], width: u32, height: u32, iterations: u32) -> Vec<u8> {
    let _span = tracing::debug_span!("dilate", iterations).entered();
    morph(mask, width, height, iterations, dilate_row)
}

/// Erode `mask` with an 8-connected 3x3 element, `iterations` times
pub fn erode(mask: &[u8], width: u32, height: u32, iterations: u32) -> Vec<u8> {
    let _span = tracing::debug_span!("erode", iterations).entered();
    morph(mask, width, height, iterations, erode_row)
}

/// Morphological closing: dilate then erode
pub fn close(mask: &[u8], width: u32, height: u32, dilation: u32, erosion: u32) -> Vec<u8> {
    let dilated = dilate(mask, width, height, dilation);
    erode(&dilated, width, height, erosion)
}

/// Iteration counts scaled to the image so the structuring element keeps a
/// roughly constant physical reach. Returns `(dilation, erosion)`.
pub fn iterations_for(width: u32, height: u32) -> (u32, u32) {
    let longest_edge = width.max(height) as f64;
    let dilation = ((longest_edge / 700.0).round() as u32).clamp(1, 4);
    let erosion = ((dilation as f64 * 0.75).round() as u32).max(1);
    (dilation, erosion)
}

type RowPass = fn(&[u8], usize, usize, usize, &mut [u8]);

fn morph(mask: &[u8], width: u32, height: u32, iterations: u32, pass: RowPass) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    debug_assert_eq!(mask.len(), w * h);

    let mut current = mask.to_vec();
    if iterations == 0 || w == 0 || h == 0 {
        return current;
    }

    let mut next = vec![BACKGROUND; current.len()];
    for _ in 0..iterations {
        next.par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| pass(&current, w, h, y, row));
        std::mem::swap(&mut current, &mut next);
    }

    current
}

fn dilate_row(src: &[u8], w: usize, h: usize, y: usize, row: &mut [u8]) {
    let y_lo = y.saturating_sub(1);
    let y_hi = (y + 1).min(h - 1);

    for (x, out) in row.iter_mut().enumerate() {
        let x_lo = x.saturating_sub(1);
        let x_hi = (x + 1).min(w - 1);

        let filled = (y_lo..=y_hi)
            .any(|ny| src[ny * w + x_lo..=ny * w + x_hi].iter().any(|&v| v != 0));

        *out = if filled { FOREGROUND } else { BACKGROUND };
    }
}

fn erode_row(src: &[u8], w: usize, h: usize, y: usize, row: &mut [u8]) {
    // A row touching the top or bottom edge has out-of-range neighbours.
    if y == 0 || y + 1 >= h {
        row.fill(BACKGROUND);
        return;
    }

    for (x, out) in row.iter_mut().enumerate() {
        if x == 0 || x + 1 >= w {
            *out = BACKGROUND;
            continue;
        }

        let keep = (y - 1..=y + 1)
            .all(|ny| src[ny * w + x - 1..=ny * w + x + 1].iter().all(|&v| v != 0));

        *out = if keep { FOREGROUND } else { BACKGROUND };
    }
}
