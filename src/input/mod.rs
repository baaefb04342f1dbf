mod pointer;
mod shortcut;

pub use pointer::{CanvasPlacement, PointerEvent, PointerEventKind, PointerTracker};
pub use shortcut::{
    resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
