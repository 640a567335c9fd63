use rayon::prelude::*;

/// Blur radius scaled to the image: `clamp(round(longest_edge / 240), 6, 20)`
pub fn radius_for(width: u32, height: u32) -> u32 {
    let longest_edge = width.max(height) as f64;
    ((longest_edge / 240.0).round() as u32).clamp(6, 20)
}

/// Build a normalised 1-D Gaussian kernel with `sigma = radius`, truncated at 3 sigma.
fn gaussian_kernel(radius: u32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f32;
    let half = (sigma * 3.0).ceil() as usize;
    let s2 = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * half)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / s2).exp()
        })
        .collect();
    let inv = 1.0 / kernel.iter().sum::<f32>();
    for v in &mut kernel {
        *v *= inv;
    }
    kernel
}

/// Separable Gaussian blur of a single-channel raster.
///
/// Samples past the edge clamp to the nearest edge pixel. The result keeps
/// full precision (same 0..=255 scale as the input) so later stages can
/// quantise once.
pub fn gaussian_blur(src: &[u8], width: u32, height: u32, radius: u32) -> Vec<f32> {
    let _span = tracing::debug_span!("blur", radius).entered();

    let (w, h) = (width as usize, height as usize);
    let input: Vec<f32> = src.iter().map(|&v| v as f32).collect();
    if w == 0 || h == 0 || radius == 0 {
        return input;
    }

    let kernel = gaussian_kernel(radius);
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass
    let mut horizontal = vec![0.0f32; w * h];
    horizontal
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &input[y * w..(y + 1) * w];
            for (x, out) in row_out.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| {
                        let sx = (x as isize + ki as isize - half).clamp(0, w as isize - 1);
                        row_in[sx as usize] * kv
                    })
                    .sum();
            }
        });

    // Vertical pass
    let mut vertical = vec![0.0f32; w * h];
    vertical
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, row_out)| {
            for (x, out) in row_out.iter_mut().enumerate() {
                *out = kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| {
                        let sy = (y as isize + ki as isize - half).clamp(0, h as isize - 1);
                        horizontal[sy as usize * w + x] * kv
                    })
                    .sum();
            }
        });

    vertical
}
