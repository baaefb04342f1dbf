use image::{Rgba, RgbaImage};

use crate::geometry::{Color, PixelPoint};

use super::bounds_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// Seed lay outside the raster; nothing was touched.
    OutOfBounds,
    Filled { pixels: usize },
}

impl FillOutcome {
    pub const fn filled_pixels(self) -> usize {
        match self {
            Self::OutOfBounds => 0,
            Self::Filled { pixels } => pixels,
        }
    }
}

/// Paint-bucket fill of the 4-connected region sharing the seed pixel's exact RGBA value.
///
/// Filled pixels are always written fully opaque, whatever alpha the region had.
/// The traversal uses an explicit stack plus a visited mask, so it terminates even
/// when `color` matches the seed pixel.
pub fn flood_fill(raster: &mut RgbaImage, seed: PixelPoint, color: Color) -> FillOutcome {
    if !bounds_of(raster).contains(seed) {
        return FillOutcome::OutOfBounds;
    }

    let width = raster.width() as usize;
    let height = raster.height() as usize;
    let seed_x = seed.x as usize;
    let seed_y = seed.y as usize;
    let target = *raster.get_pixel(seed.x as u32, seed.y as u32);
    let replacement = color.to_rgba(255);

    let pixels: &mut [u8] = &mut *raster;
    let mut visited = vec![false; width * height];
    let mut stack: Vec<usize> = Vec::with_capacity(1024);
    let mut filled = 0_usize;

    let seed_idx = seed_y * width + seed_x;
    visited[seed_idx] = true;
    stack.push(seed_idx);

    while let Some(idx) = stack.pop() {
        write_pixel(pixels, idx, replacement);
        filled += 1;

        let x = idx % width;
        let y = idx / width;
        let mut visit = |neighbor: usize| {
            if !visited[neighbor] && read_pixel(pixels, neighbor) == target {
                visited[neighbor] = true;
                stack.push(neighbor);
            }
        };

        if x + 1 < width {
            visit(idx + 1);
        }
        if x > 0 {
            visit(idx - 1);
        }
        if y + 1 < height {
            visit(idx + width);
        }
        if y > 0 {
            visit(idx - width);
        }
    }

    FillOutcome::Filled { pixels: filled }
}

#[inline]
fn read_pixel(pixels: &[u8], idx: usize) -> Rgba<u8> {
    let o = idx * 4;
    Rgba([pixels[o], pixels[o + 1], pixels[o + 2], pixels[o + 3]])
}

#[inline]
fn write_pixel(pixels: &mut [u8], idx: usize, value: Rgba<u8>) {
    let o = idx * 4;
    pixels[o..o + 4].copy_from_slice(&value.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, value: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(value))
    }

    #[test]
    fn fill_uniform_raster_covers_every_pixel_with_opaque_color() {
        let mut raster = uniform(17, 9, [10, 20, 30, 255]);
        let outcome = flood_fill(&mut raster, PixelPoint::new(4, 4), Color::new(200, 0, 0));

        assert_eq!(outcome, FillOutcome::Filled { pixels: 17 * 9 });
        assert!(raster.pixels().all(|p| *p == Rgba([200, 0, 0, 255])));
    }

    #[test]
    fn fill_out_of_bounds_seed_leaves_raster_unchanged() {
        let mut raster = uniform(5, 5, [1, 2, 3, 4]);
        let before = raster.clone();

        for seed in [
            PixelPoint::new(-1, 0),
            PixelPoint::new(0, -1),
            PixelPoint::new(5, 0),
            PixelPoint::new(0, 5),
        ] {
            let outcome = flood_fill(&mut raster, seed, Color::new(9, 9, 9));
            assert_eq!(outcome, FillOutcome::OutOfBounds);
        }
        assert_eq!(raster.as_raw(), before.as_raw());
    }

    #[test]
    fn fill_with_seed_color_terminates_and_keeps_pixels() {
        let mut raster = uniform(64, 64, [12, 34, 56, 255]);
        let outcome = flood_fill(&mut raster, PixelPoint::new(0, 0), Color::new(12, 34, 56));

        assert_eq!(outcome.filled_pixels(), 64 * 64);
        assert!(raster.pixels().all(|p| *p == Rgba([12, 34, 56, 255])));
    }

    #[test]
    fn fill_forces_alpha_to_opaque_even_for_translucent_regions() {
        let mut raster = uniform(3, 3, [0, 0, 0, 0]);
        flood_fill(&mut raster, PixelPoint::new(1, 1), Color::new(0, 0, 0));
        assert!(raster.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn fill_stops_at_differently_colored_border_and_ignores_diagonals() {
        // Vertical wall at x == 2 splits the raster; (3,0)..(4,4) must stay untouched.
        let mut raster = uniform(5, 5, [255, 255, 255, 255]);
        for y in 0..5 {
            raster.put_pixel(2, y, Rgba([0, 0, 0, 255]));
        }
        let outcome = flood_fill(&mut raster, PixelPoint::new(0, 0), Color::new(0, 0, 255));

        assert_eq!(outcome.filled_pixels(), 10);
        for y in 0..5 {
            assert_eq!(*raster.get_pixel(0, y), Rgba([0, 0, 255, 255]));
            assert_eq!(*raster.get_pixel(1, y), Rgba([0, 0, 255, 255]));
            assert_eq!(*raster.get_pixel(2, y), Rgba([0, 0, 0, 255]));
            assert_eq!(*raster.get_pixel(3, y), Rgba([255, 255, 255, 255]));
        }
    }

    #[test]
    fn fill_requires_exact_alpha_match() {
        let mut raster = uniform(2, 1, [50, 50, 50, 255]);
        raster.put_pixel(1, 0, Rgba([50, 50, 50, 254]));
        let outcome = flood_fill(&mut raster, PixelPoint::new(0, 0), Color::new(1, 1, 1));

        assert_eq!(outcome.filled_pixels(), 1);
        assert_eq!(*raster.get_pixel(1, 0), Rgba([50, 50, 50, 254]));
    }

    #[test]
    fn fill_large_raster_does_not_overflow_stack() {
        let mut raster = uniform(1024, 1024, [0, 0, 0, 255]);
        let outcome = flood_fill(&mut raster, PixelPoint::new(512, 512), Color::WHITE);
        assert_eq!(outcome.filled_pixels(), 1024 * 1024);
    }
}
