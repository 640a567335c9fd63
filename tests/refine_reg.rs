//! Mask refinement regression test
//!
//! Exercises the morphology properties and the end-to-end feathering
//! scenarios on small synthetic maps.

use cutout::refine::morphology::{dilate, erode, iterations_for, FOREGROUND};
use cutout::{refine_mask, CutoutError, RefineConfig, Segmentation, Thresholding};

/// Deterministic pseudo-random binary mask
fn noise_mask(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
    (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            if state % 3 == 0 {
                FOREGROUND
            } else {
                0
            }
        })
        .collect()
}

#[test]
fn closing_stays_within_dilation() {
    let (w, h) = (37u32, 23u32);
    for seed in 1..6 {
        let mask = noise_mask(w, h, seed);
        for k in 1..4 {
            let dilated = dilate(&mask, w, h, k);
            let closed = erode(&dilated, w, h, k);
            for (i, (&c, &d)) in closed.iter().zip(&dilated).enumerate() {
                assert!(c == 0 || d != 0, "seed {seed}, k {k}: pixel {i} outside dilation");
            }
        }
    }
}

#[test]
fn zero_iterations_leave_masks_unchanged() {
    let mask = noise_mask(19, 11, 7);
    assert_eq!(dilate(&mask, 19, 11, 0), mask);
    assert_eq!(erode(&mask, 19, 11, 0), mask);
}

#[test]
fn full_frame_erosion_removes_the_border() {
    let (w, h) = (10u32, 10u32);
    let full = vec![FOREGROUND; 100];
    let once = erode(&full, w, h, 1);
    eprintln!(
        "  foreground after one pass: {}",
        once.iter().filter(|&&v| v != 0).count()
    );
    for y in 0..h as usize {
        for x in 0..w as usize {
            let on_border = x == 0 || y == 0 || x == 9 || y == 9;
            assert_eq!(once[y * 10 + x] == 0, on_border, "({x},{y})");
        }
    }

    // Frames only two pixels thick have no interior at all.
    let strip = vec![FOREGROUND; 2 * 10];
    assert!(erode(&strip, 10, 2, 1).iter().all(|&v| v == 0));
}

#[test]
fn single_pixel_dilates_to_block() {
    let mut mask = vec![0u8; 100];
    mask[5 * 10 + 5] = FOREGROUND;

    let block = dilate(&mask, 10, 10, 1);
    let lit: Vec<(usize, usize)> = (0..100)
        .filter(|&i| block[i] != 0)
        .map(|i| (i % 10, i / 10))
        .collect();
    assert_eq!(lit.len(), 9);
    assert!(lit.iter().all(|&(x, y)| (4..=6).contains(&x) && (4..=6).contains(&y)));

    // Only the centre has a complete foreground neighbourhood.
    let eroded = erode(&block, 10, 10, 1);
    assert_eq!(eroded.iter().filter(|&&v| v != 0).count(), 1);
    assert!(erode(&block, 10, 10, 2).iter().all(|&v| v == 0));
}

#[test]
fn iteration_counts_are_bounded() {
    for edge in [1u32, 350, 700, 1049, 1050, 2800, 10_000] {
        let (d, e) = iterations_for(edge, 1);
        assert!((1..=4).contains(&d), "edge {edge}: dilation {d}");
        assert!(e >= 1 && e <= d, "edge {edge}: erosion {e}");
    }
}

#[test]
fn all_zero_probabilities_detect_nothing() {
    let seg = Segmentation::from_probabilities(50, 40, vec![0.0; 2000]);
    for strategy in [Thresholding::hard(), Thresholding::band()] {
        let config = RefineConfig::default().with_strategy(strategy);
        assert!(matches!(
            refine_mask(&seg, &config),
            Err(CutoutError::NoSubjectDetected)
        ));
    }
}

#[test]
fn uniform_high_confidence_is_opaque() {
    let (w, h) = (64u32, 48u32);
    let seg = Segmentation::from_probabilities(w, h, vec![0.9; (w * h) as usize]);
    let refined = refine_mask(&seg, &RefineConfig::default()).unwrap();
    eprintln!("  foreground ratio: {:.4}", refined.foreground_ratio);

    // Only the eroded outer ring is missing from the closed silhouette.
    let expected = ((w - 2) * (h - 2)) as f64 / (w * h) as f64;
    assert!((refined.foreground_ratio - expected).abs() < 1e-9);
    assert!(refined.foreground_ratio > 0.9);

    let min = refined.alpha.pixels().map(|p| p[0]).min().unwrap();
    eprintln!("  minimum alpha: {}", min);
    assert!(min >= 245);
    assert_eq!(refined.alpha.get_pixel(w / 2, h / 2)[0], 255);
}

#[test]
fn feathered_edge_falls_off_smoothly() {
    // Left half foreground, right half background.
    let (w, h) = (120u32, 40u32);
    let labels: Vec<u8> = (0..w * h).map(|i| u8::from(i % w < w / 2)).collect();
    let seg = Segmentation::from_labels(w, h, labels);
    let refined = refine_mask(&seg, &RefineConfig::default()).unwrap();

    let row: Vec<u8> = (0..w).map(|x| refined.alpha.get_pixel(x, h / 2)[0]).collect();
    // The eroded frame-edge column darkens the first blur window.
    assert!(row.windows(2).skip(19).all(|p| p[1] <= p[0]), "{row:?}");
    assert_eq!(row[20], 255);
    assert_eq!(row[110], 0);
    let soft = row.iter().filter(|&&a| a > 0 && a < 255).count();
    eprintln!("  soft edge width: {} px", soft);
    assert!(soft >= 10);
}

#[test]
fn band_strategy_preserves_confidence_gradient() {
    // Horizontal confidence ramp 0..1 across the frame.
    let (w, h) = (100u32, 20u32);
    let probs: Vec<f32> = (0..w * h).map(|i| (i % w) as f32 / (w - 1) as f32).collect();
    let seg = Segmentation::from_probabilities(w, h, probs);

    let hard = refine_mask(&seg, &RefineConfig::default().with_blur_radius(Some(0))).unwrap();
    let band = refine_mask(
        &seg,
        &RefineConfig::default()
            .with_strategy(Thresholding::band())
            .with_blur_radius(Some(0)),
    )
    .unwrap();

    // Hard banding throws away everything outside the dilated silhouette.
    assert_eq!(hard.alpha.get_pixel(20, 10)[0], 0);
    // The ramp keeps a capped trace of it, and anchors the interior.
    assert!(band.alpha.get_pixel(20, 10)[0] > 0);
    assert!(band.alpha.get_pixel(20, 10)[0] <= 20);
    assert!(band.alpha.get_pixel(80, 10)[0] >= 245);
    assert!((hard.foreground_ratio - band.foreground_ratio).abs() < 1e-12);
}
