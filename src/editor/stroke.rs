//! Software rasterization of brush strokes and shape outlines.
//!
//! Coordinates address pixel centers. Each call blends every covered pixel
//! exactly once, so overlapping parts of a single shape never double up.

use image::{Rgba, RgbaImage};

use crate::geometry::{Color, PixelPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintMode {
    /// Source-over blend of the stroke color.
    Over,
    /// Destination-out: covered pixels lose alpha in proportion to opacity.
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub opacity: f64,
    pub mode: PaintMode,
}

impl StrokeStyle {
    pub fn new(color: Color, width: u32, opacity_percent: u8, mode: PaintMode) -> Self {
        Self {
            color,
            width: f64::from(width.max(1)),
            opacity: f64::from(opacity_percent.min(100)) / 100.0,
            mode,
        }
    }

    fn half_width(&self) -> f64 {
        (self.width / 2.0).max(0.5)
    }
}

/// Round-capped line from `from` to `to`.
pub fn paint_segment(raster: &mut RgbaImage, from: PixelPoint, to: PixelPoint, style: StrokeStyle) {
    let radius = style.half_width();
    let (ax, ay) = center_of(from);
    let (bx, by) = center_of(to);
    let min = (ax.min(bx) - radius, ay.min(by) - radius);
    let max = (ax.max(bx) + radius, ay.max(by) + radius);

    paint_coverage(raster, min, max, style, |px, py| {
        distance_to_segment(px, py, ax, ay, bx, by) <= radius
    });
}

/// Axis-aligned rectangle outline spanning the two drag corners.
pub fn paint_rectangle(raster: &mut RgbaImage, start: PixelPoint, end: PixelPoint, style: StrokeStyle) {
    let radius = style.half_width();
    let (ax, ay) = center_of(start);
    let (bx, by) = center_of(end);
    let edges = [
        (ax, ay, bx, ay),
        (bx, ay, bx, by),
        (bx, by, ax, by),
        (ax, by, ax, ay),
    ];
    let min = (ax.min(bx) - radius, ay.min(by) - radius);
    let max = (ax.max(bx) + radius, ay.max(by) + radius);

    paint_coverage(raster, min, max, style, |px, py| {
        edges
            .iter()
            .any(|&(x0, y0, x1, y1)| distance_to_segment(px, py, x0, y0, x1, y1) <= radius)
    });
}

/// Circle outline around `center`.
pub fn paint_circle(raster: &mut RgbaImage, center: PixelPoint, radius: f64, style: StrokeStyle) {
    let half = style.half_width();
    let (cx, cy) = center_of(center);
    let reach = radius + half;
    let min = (cx - reach, cy - reach);
    let max = (cx + reach, cy + reach);

    paint_coverage(raster, min, max, style, |px, py| {
        ((px - cx).hypot(py - cy) - radius).abs() <= half
    });
}

fn paint_coverage<F>(
    raster: &mut RgbaImage,
    min: (f64, f64),
    max: (f64, f64),
    style: StrokeStyle,
    covers: F,
) where
    F: Fn(f64, f64) -> bool,
{
    if raster.width() == 0 || raster.height() == 0 || style.opacity <= 0.0 {
        return;
    }
    let Some((x0, x1)) = pixel_span(min.0, max.0, raster.width()) else {
        return;
    };
    let Some((y0, y1)) = pixel_span(min.1, max.1, raster.height()) else {
        return;
    };

    for y in y0..=y1 {
        for x in x0..=x1 {
            let (px, py) = (f64::from(x) + 0.5, f64::from(y) + 0.5);
            if !covers(px, py) {
                continue;
            }
            let pixel = raster.get_pixel_mut(x, y);
            *pixel = match style.mode {
                PaintMode::Over => blend_over(*pixel, style.color, style.opacity),
                PaintMode::Erase => erase(*pixel, style.opacity),
            };
        }
    }
}

fn pixel_span(min: f64, max: f64, extent: u32) -> Option<(u32, u32)> {
    let last = f64::from(extent) - 1.0;
    let start = min.floor().max(0.0);
    let end = max.ceil().min(last);
    if end < 0.0 || start > last || start > end {
        return None;
    }
    Some((start as u32, end as u32))
}

fn center_of(point: PixelPoint) -> (f64, f64) {
    (f64::from(point.x) + 0.5, f64::from(point.y) + 0.5)
}

fn distance_to_segment(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let (dx, dy) = (bx - ax, by - ay);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return (px - ax).hypot(py - ay);
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / length_sq).clamp(0.0, 1.0);
    (px - (ax + t * dx)).hypot(py - (ay + t * dy))
}

pub(crate) fn blend_over(dst: Rgba<u8>, color: Color, opacity: f64) -> Rgba<u8> {
    let [dr, dg, db, da] = dst.0;
    let src_a = opacity;
    let dst_a = f64::from(da) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mix = |s: u8, d: u8| {
        let value = (f64::from(s) * src_a + f64::from(d) * dst_a * (1.0 - src_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(color.r, dr),
        mix(color.g, dg),
        mix(color.b, db),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

fn erase(dst: Rgba<u8>, opacity: f64) -> Rgba<u8> {
    let [r, g, b, a] = dst.0;
    let remaining = (f64::from(a) * (1.0 - opacity)).round().clamp(0.0, 255.0) as u8;
    Rgba([r, g, b, remaining])
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn canvas() -> RgbaImage {
        RgbaImage::from_pixel(20, 20, WHITE)
    }

    fn solid(color: Color, width: u32) -> StrokeStyle {
        StrokeStyle::new(color, width, 100, PaintMode::Over)
    }

    #[test]
    fn one_pixel_segment_covers_exactly_the_row() {
        let mut raster = canvas();
        paint_segment(
            &mut raster,
            PixelPoint::new(2, 5),
            PixelPoint::new(8, 5),
            solid(Color::BLACK, 1),
        );

        for x in 0..20 {
            let expected = if (2..=8).contains(&x) { Rgba([0, 0, 0, 255]) } else { WHITE };
            assert_eq!(*raster.get_pixel(x, 5), expected, "x={x}");
            assert_eq!(*raster.get_pixel(x, 4), WHITE);
            assert_eq!(*raster.get_pixel(x, 6), WHITE);
        }
    }

    #[test]
    fn translucent_segment_blends_once_per_pixel() {
        let mut raster = canvas();
        paint_segment(
            &mut raster,
            PixelPoint::new(5, 5),
            PixelPoint::new(10, 5),
            StrokeStyle::new(Color::BLACK, 6, 50, PaintMode::Over),
        );
        assert_eq!(*raster.get_pixel(7, 5), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn eraser_removes_alpha_by_opacity() {
        let mut raster = canvas();
        paint_segment(
            &mut raster,
            PixelPoint::new(3, 3),
            PixelPoint::new(3, 3),
            StrokeStyle::new(Color::BLACK, 3, 100, PaintMode::Erase),
        );
        assert_eq!(raster.get_pixel(3, 3)[3], 0);
        assert_eq!(raster.get_pixel(10, 10)[3], 255);

        paint_segment(
            &mut raster,
            PixelPoint::new(10, 10),
            PixelPoint::new(10, 10),
            StrokeStyle::new(Color::BLACK, 1, 50, PaintMode::Erase),
        );
        assert_eq!(raster.get_pixel(10, 10)[3], 128);
    }

    #[test]
    fn rectangle_outline_leaves_interior_untouched() {
        let mut raster = canvas();
        paint_rectangle(
            &mut raster,
            PixelPoint::new(12, 12),
            PixelPoint::new(2, 2),
            solid(Color::new(255, 0, 0), 1),
        );
        assert_eq!(*raster.get_pixel(2, 7), Rgba([255, 0, 0, 255]));
        assert_eq!(*raster.get_pixel(7, 12), Rgba([255, 0, 0, 255]));
        assert_eq!(*raster.get_pixel(7, 7), WHITE);
        assert_eq!(*raster.get_pixel(15, 15), WHITE);
    }

    #[test]
    fn circle_outline_hits_radius_and_skips_center() {
        let mut raster = canvas();
        paint_circle(
            &mut raster,
            PixelPoint::new(10, 10),
            5.0,
            solid(Color::new(0, 0, 255), 2),
        );
        assert_eq!(*raster.get_pixel(15, 10), Rgba([0, 0, 255, 255]));
        assert_eq!(*raster.get_pixel(10, 5), Rgba([0, 0, 255, 255]));
        assert_eq!(*raster.get_pixel(10, 10), WHITE);
    }

    #[test]
    fn shapes_clip_to_raster_bounds() {
        let mut raster = canvas();
        paint_segment(
            &mut raster,
            PixelPoint::new(-50, -50),
            PixelPoint::new(-40, -40),
            solid(Color::BLACK, 4),
        );
        assert!(raster.pixels().all(|p| *p == WHITE));

        paint_circle(&mut raster, PixelPoint::new(0, 0), 100.0, solid(Color::BLACK, 2));
        assert!(raster.pixels().all(|p| *p == WHITE));
    }
}
