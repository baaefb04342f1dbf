//! Raster surfaces and the pixel routines that edit them.

pub mod fill;
pub mod filters;

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::geometry::ImageBounds;

pub use fill::{flood_fill, FillOutcome};
pub use filters::{apply_filters, FilterPreset, FilterState, NEUTRAL_ADJUSTMENT};

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("raster dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to encode png: {0}")]
    Encode(#[source] image::ImageError),
}

pub type RasterResult<T> = std::result::Result<T, RasterError>;

/// Opaque white surface, the starting state of a blank drawing canvas.
pub fn blank_canvas(width: u32, height: u32) -> RasterResult<RgbaImage> {
    ensure_dimensions(width, height)?;
    Ok(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
}

pub fn bounds_of(raster: &RgbaImage) -> ImageBounds {
    ImageBounds::new(raster.width(), raster.height())
}

pub fn clear(raster: &mut RgbaImage) {
    for pixel in raster.pixels_mut() {
        *pixel = TRANSPARENT;
    }
}

pub fn load_png(path: &Path) -> RasterResult<RgbaImage> {
    let image = image::open(path).map_err(|source| RasterError::Decode {
        path: path.display().to_string(),
        source,
    })?;
    let raster = image.to_rgba8();
    ensure_dimensions(raster.width(), raster.height())?;
    Ok(raster)
}

/// Flattens the raster into PNG bytes; nothing but pixel data is written.
pub fn encode_png(raster: &RgbaImage) -> RasterResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    raster
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(RasterError::Encode)?;
    Ok(bytes.into_inner())
}

fn ensure_dimensions(width: u32, height: u32) -> RasterResult<()> {
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyDimensions { width, height });
    }
    Ok(())
}
