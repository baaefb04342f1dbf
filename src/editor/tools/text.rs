use super::{Color, PixelPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextFontFamily {
    #[default]
    Sans,
    Serif,
    Monospace,
}

impl TextFontFamily {
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Sans => "sans-serif",
            Self::Serif => "serif",
            Self::Monospace => "monospace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    pub color: Color,
    pub size: u16,
    pub family: TextFontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 16,
            family: TextFontFamily::Sans,
            bold: false,
            italic: false,
        }
    }
}

impl TextOptions {
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_size(&mut self, size: u16) {
        self.size = size.max(1);
    }

    pub fn set_family(&mut self, family: TextFontFamily) {
        self.family = family;
    }

    pub fn toggle_bold(&mut self) {
        self.bold = !self.bold;
    }

    pub fn toggle_italic(&mut self) {
        self.italic = !self.italic;
    }

    /// CSS font shorthand the UI shell hands to its text renderer.
    pub fn font_spec(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if self.italic {
            parts.push("italic".to_string());
        }
        if self.bold {
            parts.push("bold".to_string());
        }
        parts.push(format!("{}px", self.size));
        parts.push(self.family.css_name().to_string());
        parts.join(" ")
    }
}

/// Committed text label. Its glyphs are painted into the surface when a system
/// font is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAnnotation {
    pub position: PixelPoint,
    pub content: String,
    pub options: TextOptions,
    pub opacity: u8,
}
