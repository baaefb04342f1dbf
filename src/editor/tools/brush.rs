use super::Color;
use crate::editor::stroke::{PaintMode, StrokeStyle};

pub const BRUSH_MIN_SIZE: u32 = 1;
pub const BRUSH_MAX_SIZE: u32 = 100;
pub const BRUSH_MIN_OPACITY: u8 = 1;
pub const BRUSH_MAX_OPACITY: u8 = 100;

/// Color, width and opacity shared by the brush, eraser and shape tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushOptions {
    pub color: Color,
    pub size: u32,
    pub opacity: u8,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 5,
            opacity: 100,
        }
    }
}

impl BrushOptions {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = size.clamp(BRUSH_MIN_SIZE, BRUSH_MAX_SIZE);
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.opacity = opacity.clamp(BRUSH_MIN_OPACITY, BRUSH_MAX_OPACITY);
    }

    pub fn style(&self, mode: PaintMode) -> StrokeStyle {
        StrokeStyle::new(self.color, self.size, self.opacity, mode)
    }
}
