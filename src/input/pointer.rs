use crate::editor::EditorCommand;
use crate::geometry::PixelPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Leave,
}

/// Raw pointer event in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub const fn new(kind: PointerEventKind, client_x: f64, client_y: f64) -> Self {
        Self {
            kind,
            client_x,
            client_y,
        }
    }
}

/// Where the canvas sits in the viewport and how far it is scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPlacement {
    pub left: f64,
    pub top: f64,
    pub scale: f64,
}

impl Default for CanvasPlacement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale: 1.0,
        }
    }
}

impl CanvasPlacement {
    pub fn to_pixel(&self, client_x: f64, client_y: f64) -> PixelPoint {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let x = ((client_x - self.left) / scale).floor();
        let y = ((client_y - self.top) / scale).floor();
        PixelPoint::new(saturate_i32(x), saturate_i32(y))
    }
}

fn saturate_i32(value: f64) -> i32 {
    value.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Turns raw pointer traffic into editor commands, dropping moves and releases
/// that arrive while no button is held.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    placement: CanvasPlacement,
    pressed: bool,
}

impl PointerTracker {
    pub fn new(placement: CanvasPlacement) -> Self {
        Self {
            placement,
            pressed: false,
        }
    }

    pub fn set_placement(&mut self, placement: CanvasPlacement) {
        self.placement = placement;
    }

    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn translate(&mut self, event: PointerEvent) -> Option<EditorCommand> {
        let point = self.placement.to_pixel(event.client_x, event.client_y);
        match event.kind {
            PointerEventKind::Down => {
                self.pressed = true;
                Some(EditorCommand::PointerDown(point))
            }
            PointerEventKind::Move if self.pressed => Some(EditorCommand::PointerMove(point)),
            PointerEventKind::Move => None,
            PointerEventKind::Up if self.pressed => {
                self.pressed = false;
                Some(EditorCommand::PointerUp)
            }
            PointerEventKind::Leave if self.pressed => {
                self.pressed = false;
                Some(EditorCommand::PointerLeave)
            }
            PointerEventKind::Up | PointerEventKind::Leave => None,
        }
    }
}
