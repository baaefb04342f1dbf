//! Text rasterization onto a surface with system fonts.

use std::collections::HashMap;
use std::fmt;

use ab_glyph::{point, Font as _, FontArc, GlyphId, ScaleFont as _};
use font_kit::family_name::FamilyName;
use font_kit::properties::{Properties, Style, Weight};
use font_kit::source::SystemSource;
use image::RgbaImage;

use super::stroke;
use super::tools::{TextFontFamily, TextOptions};
use crate::geometry::Color;

/// Horizontal placement of a text run relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Center,
}

/// How one run of text is painted. `origin` is the baseline anchor in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub origin: (f32, f32),
    pub size: f32,
    pub anchor: TextAnchor,
    pub color: Color,
    pub opacity_percent: u8,
}

/// Loads the best system match for a generic family. `None` when the system
/// has no usable font.
pub fn load_system_font(family: TextFontFamily, bold: bool, italic: bool) -> Option<FontArc> {
    let mut properties = Properties::new();
    if bold {
        properties.weight = Weight::BOLD;
    }
    if italic {
        properties.style = Style::Italic;
    }

    let handle = SystemSource::new()
        .select_best_match(&[family_name(family)], &properties)
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    FontArc::try_from_vec((*data).clone()).ok()
}

fn family_name(family: TextFontFamily) -> FamilyName {
    match family {
        TextFontFamily::Sans => FamilyName::SansSerif,
        TextFontFamily::Serif => FamilyName::Serif,
        TextFontFamily::Monospace => FamilyName::Monospace,
    }
}

type FontKey = (TextFontFamily, bool, bool);

/// Fonts already looked up, including failed lookups.
#[derive(Clone, Default)]
pub struct FontCache {
    fonts: HashMap<FontKey, Option<FontArc>>,
}

impl fmt::Debug for FontCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontCache")
            .field("looked_up", &self.fonts.len())
            .finish()
    }
}

impl FontCache {
    pub fn font_for(&mut self, options: &TextOptions) -> Option<FontArc> {
        let key = (options.family, options.bold, options.italic);
        self.fonts
            .entry(key)
            .or_insert_with(|| {
                let font = load_system_font(options.family, options.bold, options.italic);
                if font.is_none() {
                    tracing::warn!(
                        font = %options.font_spec(),
                        "no system font found; text is kept but not painted"
                    );
                }
                font
            })
            .clone()
    }
}

fn layout(font: &FontArc, text: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(size);
    let mut caret = 0.0_f32;
    let mut previous: Option<GlyphId> = None;
    let mut glyphs = Vec::with_capacity(text.len());

    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push((id, caret));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }
    (glyphs, caret)
}

/// Paints `text` source-over, scaling glyph coverage by the style opacity.
/// Returns whether any pixel was touched.
pub fn paint_text(surface: &mut RgbaImage, font: &FontArc, text: &str, style: TextStyle) -> bool {
    let (glyphs, width) = layout(font, text, style.size);
    let (origin_x, baseline) = style.origin;
    let start_x = match style.anchor {
        TextAnchor::Start => origin_x,
        TextAnchor::Center => origin_x - width / 2.0,
    };
    let opacity = f64::from(style.opacity_percent.min(100)) / 100.0;
    let (surface_w, surface_h) = (i64::from(surface.width()), i64::from(surface.height()));
    let mut painted = false;

    for (id, offset) in glyphs {
        let glyph = id.with_scale_and_position(style.size, point(start_x + offset, baseline));
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
        outlined.draw(|gx, gy, coverage| {
            let (x, y) = (left + i64::from(gx), top + i64::from(gy));
            if coverage <= 0.0 || x < 0 || y < 0 || x >= surface_w || y >= surface_h {
                return;
            }
            let pixel = surface.get_pixel_mut(x as u32, y as u32);
            *pixel = stroke::blend_over(
                *pixel,
                style.color,
                opacity * f64::from(coverage.min(1.0)),
            );
            painted = true;
        });
    }
    painted
}
