use image::GrayImage;
use std::fmt;
use std::str::FromStr;

/// Smallest brush diameter in raster pixels
pub const MIN_BRUSH_SIZE: f32 = 5.0;
/// Largest brush diameter in raster pixels
pub const MAX_BRUSH_SIZE: f32 = 150.0;
pub const DEFAULT_BRUSH_SIZE: f32 = 40.0;

/// A position in raster (or display) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Whether the brush paints foreground back in or removes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    #[default]
    Add,
    Erase,
}

impl FromStr for BrushMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(BrushMode::Add),
            "erase" => Ok(BrushMode::Erase),
            other => Err(format!("unknown brush mode '{other}', expected add or erase")),
        }
    }
}

impl fmt::Display for BrushMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrushMode::Add => f.write_str("add"),
            BrushMode::Erase => f.write_str("erase"),
        }
    }
}

/// Brush diameter, always within [`MIN_BRUSH_SIZE`, `MAX_BRUSH_SIZE`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSize(f32);

impl BrushSize {
    /// Clamp `size` into range; zero or non-finite input falls back to the default
    pub fn new(size: f32) -> Self {
        let size = if size.is_finite() && size != 0.0 {
            size
        } else {
            DEFAULT_BRUSH_SIZE
        };
        Self(size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for BrushSize {
    fn default() -> Self {
        Self(DEFAULT_BRUSH_SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrushSettings {
    pub mode: BrushMode,
    pub size: BrushSize,
}

/// Paint one round-capped segment of width `width` into `mask`.
///
/// A pixel is covered when its centre lies within `width / 2` of the segment
/// from `from` to `to`; a zero-length segment paints a dot. Add mode sets
/// covered pixels fully opaque, erase mode clears them. Returns the number of
/// covered pixels.
pub fn paint_segment(
    mask: &mut GrayImage,
    from: Point,
    to: Point,
    mode: BrushMode,
    width: f32,
) -> usize {
    let _span = tracing::debug_span!("paint_segment", %mode, width).entered();

    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 || !(width > 0.0) {
        return 0;
    }
    let radius = width / 2.0;
    let value = match mode {
        BrushMode::Add => 255,
        BrushMode::Erase => 0,
    };

    // Bounding box of the capsule, clipped to the raster.
    let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
    let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
    let max_x = (from.x.max(to.x) + radius).ceil().min(w as f32 - 1.0);
    let max_y = (from.y.max(to.y) + radius).ceil().min(h as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return 0;
    }

    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let length_sq = dx * dx + dy * dy;
    let radius_sq = radius * radius;
    let mut covered = 0;

    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;

            // Closest point on the segment
            let t = if length_sq > 0.0 {
                (((px - from.x) * dx + (py - from.y) * dy) / length_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let cx = from.x + dx * t - px;
            let cy = from.y + dy * t - py;

            if cx * cx + cy * cy <= radius_sq {
                mask.put_pixel(x, y, image::Luma([value]));
                covered += 1;
            }
        }
    }

    covered
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn size_is_clamped() {
        assert_eq!(BrushSize::new(1.0).get(), MIN_BRUSH_SIZE);
        assert_eq!(BrushSize::new(400.0).get(), MAX_BRUSH_SIZE);
        assert_eq!(BrushSize::new(0.0).get(), DEFAULT_BRUSH_SIZE);
        assert_eq!(BrushSize::new(f32::NAN).get(), DEFAULT_BRUSH_SIZE);
        assert_eq!(BrushSize::new(-3.0).get(), MIN_BRUSH_SIZE);
        assert_eq!(BrushSize::new(72.0).get(), 72.0);
    }

    #[test]
    fn mode_parses() {
        assert_eq!("add".parse::<BrushMode>(), Ok(BrushMode::Add));
        assert_eq!("erase".parse::<BrushMode>(), Ok(BrushMode::Erase));
        assert!("smudge".parse::<BrushMode>().is_err());
    }

    #[test]
    fn dot_is_round() {
        let mut mask = GrayImage::new(21, 21);
        let centre = Point::new(10.5, 10.5);
        let covered = paint_segment(&mut mask, centre, centre, BrushMode::Add, 10.0);
        assert_eq!(mask.get_pixel(10, 10)[0], 255);
        assert_eq!(mask.get_pixel(14, 10)[0], 255);
        assert_eq!(mask.get_pixel(15, 10)[0], 255);
        assert_eq!(mask.get_pixel(16, 10)[0], 0);
        // Corner of the bounding square is outside the circle.
        assert_eq!(mask.get_pixel(14, 14)[0], 0);
        assert!(covered > 60 && covered < 100);
    }

    #[test]
    fn segment_has_round_caps() {
        let mut mask = GrayImage::new(40, 20);
        let (from, to) = (Point::new(10.0, 10.0), Point::new(30.0, 10.0));
        paint_segment(&mut mask, from, to, BrushMode::Add, 6.0);
        assert_eq!(mask.get_pixel(20, 10)[0], 255);
        assert_eq!(mask.get_pixel(20, 12)[0], 255);
        assert_eq!(mask.get_pixel(20, 13)[0], 0);
        // Cap extends past the end point along the axis but not at the corners.
        assert_eq!(mask.get_pixel(31, 9)[0], 255);
        assert_eq!(mask.get_pixel(32, 12)[0], 0);
    }

    #[test]
    fn erase_clears_coverage() {
        let mut mask = GrayImage::from_pixel(20, 20, Luma([180]));
        let (from, to) = (Point::new(2.0, 10.0), Point::new(18.0, 10.0));
        paint_segment(&mut mask, from, to, BrushMode::Erase, 5.0);
        assert_eq!(mask.get_pixel(10, 10)[0], 0);
        assert_eq!(mask.get_pixel(10, 2)[0], 180);
    }

    #[test]
    fn off_canvas_segment_is_clipped() {
        let mut mask = GrayImage::new(10, 10);
        let (from, to) = (Point::new(-50.0, -50.0), Point::new(-40.0, -40.0));
        assert_eq!(paint_segment(&mut mask, from, to, BrushMode::Add, 8.0), 0);

        let (from, to) = (Point::new(-2.0, 5.0), Point::new(3.0, 5.0));
        let covered = paint_segment(&mut mask, from, to, BrushMode::Add, 4.0);
        assert!(covered > 0);
        assert_eq!(mask.get_pixel(0, 5)[0], 255);
    }
}
