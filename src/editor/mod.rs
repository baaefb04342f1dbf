//! Edit session over a captured map raster and the commands that drive it.

pub mod glyphs;
pub mod stroke;
pub mod tools;

use image::RgbaImage;
use thiserror::Error;

use crate::geometry::{Color, PixelPoint};
use crate::history::History;
use crate::raster::{self, FillOutcome, FilterPreset, FilterState, RasterError};
use glyphs::{FontCache, TextAnchor, TextStyle};
use stroke::PaintMode;

pub use tools::{
    BrushOptions, CursorStyle, EditorTools, Gesture, ShapeKind, TextAnnotation, TextFontFamily,
    TextOptions, ToolKind,
};

/// Discrete editor input, already translated into raster pixel space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorCommand {
    SelectTool(ToolKind),
    SetColor(Color),
    SetBrushSize(u32),
    SetOpacity(u8),
    PointerDown(PixelPoint),
    PointerMove(PixelPoint),
    PointerUp,
    PointerLeave,
    CommitText(String),
    CancelText,
    SetFilterPreset(FilterPreset),
    SetBrightness(i32),
    SetContrast(i32),
    SetSaturation(i32),
    ResetFilters,
    Undo,
    Redo,
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// What the UI shell has to refresh after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Unchanged,
    ToolSelected {
        tool: ToolKind,
        cursor: CursorStyle,
    },
    OptionsChanged,
    /// Live surface changed but nothing was committed yet (stroke or shape preview).
    SurfaceChanged,
    Committed(HistoryState),
    HistoryMoved(HistoryState),
    TextEntryOpened {
        at: PixelPoint,
    },
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("no text entry is open")]
    NoPendingText,
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub brush: BrushOptions,
    pub history_limit: Option<usize>,
}

/// One undo step: the raster and the text labels painted into it.
#[derive(Debug, Clone)]
struct Snapshot {
    surface: RgbaImage,
    texts: Vec<TextAnnotation>,
}

/// Owns the live raster, the pristine capture, filter settings and history.
#[derive(Debug, Clone)]
pub struct EditSession {
    surface: RgbaImage,
    original: RgbaImage,
    filters: FilterState,
    history: History<Snapshot>,
    tools: EditorTools,
    texts: Vec<TextAnnotation>,
    fonts: FontCache,
}

impl EditSession {
    /// Starts a session over a captured map image. The capture becomes the filter source
    /// and the first history entry.
    pub fn from_capture(capture: RgbaImage, options: SessionOptions) -> EditorResult<Self> {
        if capture.width() == 0 || capture.height() == 0 {
            return Err(RasterError::EmptyDimensions {
                width: capture.width(),
                height: capture.height(),
            }
            .into());
        }

        let mut history = History::with_limit(options.history_limit);
        history.commit(Snapshot {
            surface: capture.clone(),
            texts: Vec::new(),
        });
        tracing::info!(
            width = capture.width(),
            height = capture.height(),
            "edit session started"
        );

        Ok(Self {
            surface: capture.clone(),
            original: capture,
            filters: FilterState::new(),
            history,
            tools: EditorTools::with_brush(options.brush),
            texts: Vec::new(),
            fonts: FontCache::default(),
        })
    }

    pub fn blank(width: u32, height: u32, options: SessionOptions) -> EditorResult<Self> {
        Self::from_capture(raster::blank_canvas(width, height)?, options)
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn original(&self) -> &RgbaImage {
        &self.original
    }

    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub const fn tools(&self) -> &EditorTools {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut EditorTools {
        &mut self.tools
    }

    /// Labels committed into the current surface.
    pub fn text_annotations(&self) -> &[TextAnnotation] {
        &self.texts
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }

    pub fn dispatch(&mut self, command: EditorCommand) -> EditorResult<EditorEvent> {
        tracing::debug!(?command, tool = ?self.tools.active_tool(), "dispatch editor command");
        match command {
            EditorCommand::SelectTool(tool) => {
                self.tools.select_tool(tool);
                Ok(EditorEvent::ToolSelected {
                    tool,
                    cursor: tool.cursor(),
                })
            }
            EditorCommand::SetColor(color) => {
                self.tools.set_color(color);
                Ok(EditorEvent::OptionsChanged)
            }
            EditorCommand::SetBrushSize(size) => {
                self.tools.set_brush_size(size);
                Ok(EditorEvent::OptionsChanged)
            }
            EditorCommand::SetOpacity(opacity) => {
                self.tools.set_opacity(opacity);
                Ok(EditorEvent::OptionsChanged)
            }
            EditorCommand::PointerDown(at) => Ok(self.pointer_down(at)),
            EditorCommand::PointerMove(to) => Ok(self.pointer_move(to)),
            EditorCommand::PointerUp | EditorCommand::PointerLeave => Ok(self.pointer_up()),
            EditorCommand::CommitText(content) => self.commit_text(content),
            EditorCommand::CancelText => {
                self.tools.take_pending_text();
                Ok(EditorEvent::Unchanged)
            }
            EditorCommand::SetFilterPreset(preset) => {
                self.filters.set_preset(preset);
                Ok(self.apply_filters())
            }
            EditorCommand::SetBrightness(value) => {
                self.filters.set_brightness(value);
                Ok(self.apply_filters())
            }
            EditorCommand::SetContrast(value) => {
                self.filters.set_contrast(value);
                Ok(self.apply_filters())
            }
            EditorCommand::SetSaturation(value) => {
                self.filters.set_saturation(value);
                Ok(self.apply_filters())
            }
            EditorCommand::ResetFilters => Ok(self.reset_filters()),
            EditorCommand::Undo => Ok(self.undo()),
            EditorCommand::Redo => Ok(self.redo()),
            EditorCommand::Clear => {
                self.tools.take_gesture();
                raster::clear(&mut self.surface);
                self.texts.clear();
                Ok(self.commit())
            }
        }
    }

    /// Paint-bucket at `seed`. Out-of-bounds seeds leave surface and history alone.
    pub fn fill(&mut self, seed: PixelPoint, color: Color) -> EditorEvent {
        match raster::flood_fill(&mut self.surface, seed, color) {
            FillOutcome::OutOfBounds => {
                tracing::debug!(x = seed.x, y = seed.y, "fill seed outside surface; ignored");
                EditorEvent::Unchanged
            }
            FillOutcome::Filled { pixels } => {
                tracing::debug!(x = seed.x, y = seed.y, pixels, "flood fill applied");
                self.commit()
            }
        }
    }

    /// Recomputes the surface from the original capture with the current filter state.
    pub fn apply_filters(&mut self) -> EditorEvent {
        self.tools.take_gesture();
        self.surface = raster::apply_filters(&self.original, &self.filters);
        self.texts.clear();
        self.commit()
    }

    pub fn reset_filters(&mut self) -> EditorEvent {
        self.tools.take_gesture();
        self.filters.reset();
        self.surface = self.original.clone();
        self.texts.clear();
        self.commit()
    }

    pub fn undo(&mut self) -> EditorEvent {
        match self.history.undo() {
            Some(snapshot) => {
                self.surface.clone_from(&snapshot.surface);
                self.texts.clone_from(&snapshot.texts);
                self.tools.take_gesture();
                tracing::debug!("undo applied");
                EditorEvent::HistoryMoved(self.history_state())
            }
            None => {
                tracing::debug!("undo stack empty");
                EditorEvent::Unchanged
            }
        }
    }

    pub fn redo(&mut self) -> EditorEvent {
        match self.history.redo() {
            Some(snapshot) => {
                self.surface.clone_from(&snapshot.surface);
                self.texts.clone_from(&snapshot.texts);
                self.tools.take_gesture();
                tracing::debug!("redo applied");
                EditorEvent::HistoryMoved(self.history_state())
            }
            None => {
                tracing::debug!("redo stack empty");
                EditorEvent::Unchanged
            }
        }
    }

    fn commit(&mut self) -> EditorEvent {
        self.history.commit(Snapshot {
            surface: self.surface.clone(),
            texts: self.texts.clone(),
        });
        EditorEvent::Committed(self.history_state())
    }

    fn pointer_down(&mut self, at: PixelPoint) -> EditorEvent {
        let tool = self.tools.active_tool();
        match tool {
            ToolKind::Fill => self.fill(at, self.tools.brush().color),
            ToolKind::Text => {
                self.tools.open_text_entry(at);
                EditorEvent::TextEntryOpened { at }
            }
            ToolKind::Brush | ToolKind::Eraser => {
                let mode = if tool == ToolKind::Eraser {
                    PaintMode::Erase
                } else {
                    PaintMode::Over
                };
                self.tools.begin_gesture(Gesture::Freehand { last: at, mode });
                EditorEvent::Unchanged
            }
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Line => {
                let Some(kind) = tool.shape() else {
                    return EditorEvent::Unchanged;
                };
                self.tools.begin_gesture(Gesture::Shape {
                    kind,
                    start: at,
                    base: Box::new(self.surface.clone()),
                });
                EditorEvent::Unchanged
            }
        }
    }

    fn pointer_move(&mut self, to: PixelPoint) -> EditorEvent {
        let brush = self.tools.brush();
        match self.tools.gesture() {
            Gesture::Idle => EditorEvent::Unchanged,
            Gesture::Freehand { last, mode } => {
                stroke::paint_segment(&mut self.surface, *last, to, brush.style(*mode));
                self.tools.update_freehand_point(to);
                EditorEvent::SurfaceChanged
            }
            Gesture::Shape { kind, start, base } => {
                let (kind, start) = (*kind, *start);
                self.surface.clone_from(base);
                let style = brush.style(PaintMode::Over);
                match kind {
                    ShapeKind::Line => stroke::paint_segment(&mut self.surface, start, to, style),
                    ShapeKind::Rectangle => {
                        stroke::paint_rectangle(&mut self.surface, start, to, style)
                    }
                    ShapeKind::Circle => {
                        stroke::paint_circle(&mut self.surface, start, start.distance_to(to), style)
                    }
                }
                EditorEvent::SurfaceChanged
            }
        }
    }

    fn pointer_up(&mut self) -> EditorEvent {
        if self.tools.take_gesture().is_active() {
            self.commit()
        } else {
            EditorEvent::Unchanged
        }
    }

    fn commit_text(&mut self, content: String) -> EditorResult<EditorEvent> {
        let position = self
            .tools
            .take_pending_text()
            .ok_or(EditorError::NoPendingText)?;
        let annotation = TextAnnotation {
            position,
            content,
            options: self.tools.text_options(),
            opacity: self.tools.brush().opacity,
        };

        if let Some(font) = self.fonts.font_for(&annotation.options) {
            let style = TextStyle {
                origin: (position.x as f32, position.y as f32),
                size: f32::from(annotation.options.size),
                anchor: TextAnchor::Start,
                color: annotation.options.color,
                opacity_percent: annotation.opacity,
            };
            glyphs::paint_text(&mut self.surface, &font, &annotation.content, style);
        }
        self.texts.push(annotation);
        Ok(self.commit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn session(width: u32, height: u32) -> EditSession {
        EditSession::blank(width, height, SessionOptions::default()).expect("blank session")
    }

    fn dispatch(session: &mut EditSession, command: EditorCommand) -> EditorEvent {
        session.dispatch(command).expect("command should succeed")
    }

    #[test]
    fn new_session_has_single_history_entry_and_no_undo() {
        let session = session(8, 8);
        assert_eq!(session.history_len(), 1);
        assert_eq!(
            session.history_state(),
            HistoryState {
                can_undo: false,
                can_redo: false
            }
        );
        assert_eq!(session.tools().active_tool(), ToolKind::Brush);
    }

    #[test]
    fn session_rejects_empty_capture() {
        let err = EditSession::from_capture(RgbaImage::new(0, 3), SessionOptions::default())
            .expect_err("empty capture should fail");
        assert!(matches!(
            err,
            EditorError::Raster(RasterError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn fill_tool_fills_region_and_commits() {
        let mut session = session(6, 6);
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Fill));
        dispatch(&mut session, EditorCommand::SetColor(Color::new(0, 128, 0)));

        let event = dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(2, 2)));
        assert_eq!(
            event,
            EditorEvent::Committed(HistoryState {
                can_undo: true,
                can_redo: false
            })
        );
        assert!(session.surface().pixels().all(|p| *p == Rgba([0, 128, 0, 255])));
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn fill_outside_surface_does_not_commit() {
        let mut session = session(4, 4);
        let event = session.fill(PixelPoint::new(9, 9), Color::BLACK);
        assert_eq!(event, EditorEvent::Unchanged);
        assert_eq!(session.history_len(), 1);
        assert!(session.surface().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn brush_stroke_paints_on_move_and_commits_on_release() {
        let mut session = session(20, 20);
        dispatch(&mut session, EditorCommand::SetBrushSize(1));
        dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(2, 2)));
        assert_eq!(session.history_len(), 1);

        let event = dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(10, 2)));
        assert_eq!(event, EditorEvent::SurfaceChanged);
        assert_eq!(*session.surface().get_pixel(6, 2), Rgba([0, 0, 0, 255]));

        dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(10, 10)));
        assert_eq!(*session.surface().get_pixel(10, 6), Rgba([0, 0, 0, 255]));

        let event = dispatch(&mut session, EditorCommand::PointerUp);
        assert!(matches!(event, EditorEvent::Committed(_)));
        assert_eq!(session.history_len(), 2);

        let event = dispatch(&mut session, EditorCommand::PointerLeave);
        assert_eq!(event, EditorEvent::Unchanged);
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn move_without_pointer_down_is_ignored() {
        let mut session = session(10, 10);
        let event = dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(3, 3)));
        assert_eq!(event, EditorEvent::Unchanged);
        assert!(session.surface().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn eraser_clears_alpha_along_stroke() {
        let mut session = session(10, 10);
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Eraser));
        dispatch(&mut session, EditorCommand::SetBrushSize(1));
        dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(1, 5)));
        dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(8, 5)));
        assert_eq!(session.surface().get_pixel(4, 5)[3], 0);
        assert_eq!(session.surface().get_pixel(4, 6)[3], 255);
    }

    #[test]
    fn shape_preview_restores_base_between_moves() {
        let mut session = session(20, 20);
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Line));
        dispatch(&mut session, EditorCommand::SetBrushSize(1));
        dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(0, 0)));
        dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(19, 0)));
        assert_eq!(*session.surface().get_pixel(10, 0), Rgba([0, 0, 0, 255]));

        dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(0, 19)));
        assert_eq!(*session.surface().get_pixel(10, 0), WHITE);
        assert_eq!(*session.surface().get_pixel(0, 10), Rgba([0, 0, 0, 255]));

        dispatch(&mut session, EditorCommand::PointerUp);
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn text_entry_commits_annotation_and_history() {
        let mut session = session(10, 10);
        let err = session
            .dispatch(EditorCommand::CommitText("Delhi".to_string()))
            .expect_err("no entry open yet");
        assert!(matches!(err, EditorError::NoPendingText));

        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Text));
        let event = dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(3, 4)));
        assert_eq!(
            event,
            EditorEvent::TextEntryOpened {
                at: PixelPoint::new(3, 4)
            }
        );

        dispatch(&mut session, EditorCommand::CommitText("Delhi".to_string()));
        assert_eq!(session.text_annotations().len(), 1);
        assert_eq!(session.text_annotations()[0].content, "Delhi");
        assert_eq!(session.text_annotations()[0].position, PixelPoint::new(3, 4));
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.tools().pending_text(), None);
    }

    #[test]
    fn undo_removes_committed_text_and_redo_restores_it() {
        let mut session = session(60, 30);
        let blank = session.surface().clone();
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Text));
        dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(3, 20)));
        dispatch(&mut session, EditorCommand::CommitText("Delhi".to_string()));

        let font_found = glyphs::load_system_font(TextFontFamily::Sans, false, false).is_some();
        assert_eq!(session.surface() != &blank, font_found);
        let lettered = session.surface().clone();

        assert!(matches!(
            dispatch(&mut session, EditorCommand::Undo),
            EditorEvent::HistoryMoved(_)
        ));
        assert!(session.text_annotations().is_empty());
        assert_eq!(session.surface(), &blank);

        dispatch(&mut session, EditorCommand::Redo);
        assert_eq!(session.text_annotations().len(), 1);
        assert_eq!(session.surface(), &lettered);
    }

    #[test]
    fn filters_and_clear_drop_painted_text() {
        let mut session = session(10, 10);
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Text));
        dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(1, 8)));
        dispatch(&mut session, EditorCommand::CommitText("Goa".to_string()));
        dispatch(&mut session, EditorCommand::SetFilterPreset(FilterPreset::Grayscale));
        assert!(session.text_annotations().is_empty());

        dispatch(&mut session, EditorCommand::Undo);
        assert_eq!(session.text_annotations().len(), 1);
        dispatch(&mut session, EditorCommand::Clear);
        assert!(session.text_annotations().is_empty());
    }

    #[test]
    fn stroke_keeps_its_paint_mode_when_tool_changes_mid_drag() {
        let mut session = session(12, 12);
        dispatch(&mut session, EditorCommand::SetBrushSize(1));
        dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(1, 6)));
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Eraser));
        dispatch(&mut session, EditorCommand::PointerMove(PixelPoint::new(10, 6)));
        assert_eq!(*session.surface().get_pixel(5, 6), Rgba([0, 0, 0, 255]));

        let event = dispatch(&mut session, EditorCommand::PointerUp);
        assert!(matches!(event, EditorEvent::Committed(_)));
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn filters_recompute_from_original_and_commit_each_change() {
        let capture = RgbaImage::from_pixel(2, 2, Rgba([100, 150, 200, 255]));
        let mut session =
            EditSession::from_capture(capture.clone(), SessionOptions::default()).expect("session");

        dispatch(&mut session, EditorCommand::SetBrightness(150));
        let brightened = session.surface().clone();
        dispatch(&mut session, EditorCommand::SetBrightness(150));
        assert_eq!(session.surface(), &brightened, "filters must not chain");

        dispatch(&mut session, EditorCommand::SetFilterPreset(FilterPreset::Invert));
        assert_eq!(session.filters().brightness(), 100);
        assert_eq!(*session.surface().get_pixel(0, 0), Rgba([155, 105, 55, 255]));

        dispatch(&mut session, EditorCommand::ResetFilters);
        assert_eq!(session.surface(), &capture);
        assert!(session.filters().is_neutral());
        assert_eq!(session.history_len(), 5);
    }

    #[test]
    fn undo_redo_walk_history_and_commit_truncates_redo() {
        let mut session = session(4, 4);
        dispatch(&mut session, EditorCommand::SelectTool(ToolKind::Fill));
        for shade in [10_u8, 20, 30] {
            dispatch(&mut session, EditorCommand::SetColor(Color::new(shade, shade, shade)));
            dispatch(&mut session, EditorCommand::PointerDown(PixelPoint::new(0, 0)));
        }
        assert_eq!(session.history_len(), 4);

        for _ in 0..3 {
            assert!(matches!(
                dispatch(&mut session, EditorCommand::Undo),
                EditorEvent::HistoryMoved(_)
            ));
        }
        assert!(session.surface().pixels().all(|p| *p == WHITE));
        assert_eq!(dispatch(&mut session, EditorCommand::Undo), EditorEvent::Unchanged);

        for _ in 0..3 {
            dispatch(&mut session, EditorCommand::Redo);
        }
        assert_eq!(*session.surface().get_pixel(0, 0), Rgba([30, 30, 30, 255]));
        assert_eq!(dispatch(&mut session, EditorCommand::Redo), EditorEvent::Unchanged);

        dispatch(&mut session, EditorCommand::Undo);
        dispatch(&mut session, EditorCommand::Clear);
        assert!(!session.history_state().can_redo);
        assert_eq!(dispatch(&mut session, EditorCommand::Redo), EditorEvent::Unchanged);
        assert!(session.surface().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn session_options_seed_brush_and_history_limit() {
        let mut brush = BrushOptions::default();
        brush.set_color(Color::new(200, 10, 10));
        brush.set_size(12);
        let options = SessionOptions {
            brush,
            history_limit: Some(2),
        };
        let mut session = EditSession::blank(4, 4, options).expect("session");
        assert_eq!(session.tools().brush().size, 12);
        assert_eq!(session.tools().text_options().color, Color::new(200, 10, 10));

        session.dispatch(EditorCommand::Clear).expect("clear");
        session.dispatch(EditorCommand::Clear).expect("clear");
        assert_eq!(session.history_len(), 2);
    }
}
