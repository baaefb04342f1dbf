mod brush;
mod text;

use image::RgbaImage;

use super::stroke::PaintMode;

pub use crate::geometry::{Color, PixelPoint};
pub use brush::{
    BrushOptions, BRUSH_MAX_OPACITY, BRUSH_MAX_SIZE, BRUSH_MIN_OPACITY, BRUSH_MIN_SIZE,
};
pub use text::{TextAnnotation, TextFontFamily, TextOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOptionVisibility {
    pub has_color: bool,
    pub has_brush_size: bool,
    pub has_opacity: bool,
    pub has_text_controls: bool,
}

impl ToolOptionVisibility {
    pub const fn has_any(&self) -> bool {
        let Self {
            has_color,
            has_brush_size,
            has_opacity,
            has_text_controls,
        } = *self;
        has_color || has_brush_size || has_opacity || has_text_controls
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    Crosshair,
    Cell,
    Text,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Line,
    Text,
    Fill,
}

impl ToolKind {
    pub const ALL: [Self; 7] = [
        Self::Brush,
        Self::Eraser,
        Self::Rectangle,
        Self::Circle,
        Self::Line,
        Self::Text,
        Self::Fill,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brush => "brush",
            Self::Eraser => "eraser",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Text => "text",
            Self::Fill => "fill",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub const fn shape(self) -> Option<ShapeKind> {
        match self {
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Circle => Some(ShapeKind::Circle),
            Self::Line => Some(ShapeKind::Line),
            _ => None,
        }
    }

    pub const fn cursor(self) -> CursorStyle {
        match self {
            Self::Brush | Self::Eraser => CursorStyle::Crosshair,
            Self::Fill => CursorStyle::Cell,
            Self::Text => CursorStyle::Text,
            Self::Rectangle | Self::Circle | Self::Line => CursorStyle::Default,
        }
    }

    pub const fn option_visibility(self) -> ToolOptionVisibility {
        match self {
            Self::Brush | Self::Rectangle | Self::Circle | Self::Line => ToolOptionVisibility {
                has_color: true,
                has_brush_size: true,
                has_opacity: true,
                has_text_controls: false,
            },
            Self::Eraser => ToolOptionVisibility {
                has_color: false,
                has_brush_size: true,
                has_opacity: true,
                has_text_controls: false,
            },
            Self::Text => ToolOptionVisibility {
                has_color: true,
                has_brush_size: false,
                has_opacity: true,
                has_text_controls: true,
            },
            Self::Fill => ToolOptionVisibility {
                has_color: true,
                has_brush_size: false,
                has_opacity: false,
                has_text_controls: false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
}

/// Pointer gesture in progress on the live surface.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Paint mode is fixed when the stroke starts.
    Freehand {
        last: PixelPoint,
        mode: PaintMode,
    },
    Shape {
        kind: ShapeKind,
        start: PixelPoint,
        base: Box<RgbaImage>,
    },
}

impl Gesture {
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorTools {
    active_tool: ToolKind,
    brush: BrushOptions,
    text_options: TextOptions,
    gesture: Gesture,
    pending_text: Option<PixelPoint>,
}

impl EditorTools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brush(brush: BrushOptions) -> Self {
        let mut tools = Self::default();
        tools.text_options.set_color(brush.color);
        tools.brush = brush;
        tools
    }

    pub const fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    /// Leaving the text tool drops any unfinished text entry.
    pub fn select_tool(&mut self, tool: ToolKind) {
        self.active_tool = tool;
        if tool != ToolKind::Text {
            self.pending_text = None;
        }
    }

    pub const fn brush(&self) -> BrushOptions {
        self.brush
    }

    pub const fn text_options(&self) -> TextOptions {
        self.text_options
    }

    pub fn text_options_mut(&mut self) -> &mut TextOptions {
        &mut self.text_options
    }

    pub fn set_color(&mut self, color: Color) {
        self.brush.set_color(color);
        self.text_options.set_color(color);
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_size(size);
    }

    pub fn set_opacity(&mut self, opacity: u8) {
        self.brush.set_opacity(opacity);
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn begin_gesture(&mut self, gesture: Gesture) {
        self.gesture = gesture;
    }

    pub fn take_gesture(&mut self) -> Gesture {
        std::mem::take(&mut self.gesture)
    }

    pub fn update_freehand_point(&mut self, point: PixelPoint) {
        if let Gesture::Freehand { last, .. } = &mut self.gesture {
            *last = point;
        }
    }

    pub const fn pending_text(&self) -> Option<PixelPoint> {
        self.pending_text
    }

    pub fn open_text_entry(&mut self, at: PixelPoint) {
        self.pending_text = Some(at);
    }

    pub fn take_pending_text(&mut self) -> Option<PixelPoint> {
        self.pending_text.take()
    }
}
