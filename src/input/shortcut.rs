use crate::editor::{EditorCommand, ToolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self { ctrl, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    /// A text field (including the canvas text entry) owns the keyboard.
    pub text_input_active: bool,
    pub in_editor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    TextCommit,
    TextCancel,
    EditorUndo,
    EditorRedo,
    EditorSelectTool(ToolKind),
}

impl ShortcutAction {
    /// Editor command for actions the session handles directly. Text commit needs the
    /// typed content, so the shell builds that command itself.
    pub fn editor_command(self) -> Option<EditorCommand> {
        match self {
            Self::EditorUndo => Some(EditorCommand::Undo),
            Self::EditorRedo => Some(EditorCommand::Redo),
            Self::EditorSelectTool(tool) => Some(EditorCommand::SelectTool(tool)),
            Self::TextCancel => Some(EditorCommand::CancelText),
            Self::TextCommit => None,
        }
    }
}

fn resolve_text_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    match key {
        ShortcutKey::Enter => Some(ShortcutAction::TextCommit),
        ShortcutKey::Escape => Some(ShortcutAction::TextCancel),
        ShortcutKey::Character(_) => None,
    }
}

fn resolve_editor_tool_shortcut(key: ShortcutKey) -> Option<ShortcutAction> {
    let ShortcutKey::Character(c) = key else {
        return None;
    };
    let tool = match c.to_ascii_lowercase() {
        'b' => ToolKind::Brush,
        'e' => ToolKind::Eraser,
        'r' => ToolKind::Rectangle,
        'c' => ToolKind::Circle,
        'l' => ToolKind::Line,
        't' => ToolKind::Text,
        'f' => ToolKind::Fill,
        _ => return None,
    };
    Some(ShortcutAction::EditorSelectTool(tool))
}

fn resolve_editor_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
) -> Option<ShortcutAction> {
    match (key, modifiers.ctrl, modifiers.shift) {
        (ShortcutKey::Character('z' | 'Z'), true, false) => Some(ShortcutAction::EditorUndo),
        (ShortcutKey::Character('z' | 'Z'), true, true) => Some(ShortcutAction::EditorRedo),
        (ShortcutKey::Character('y' | 'Y'), true, false) => Some(ShortcutAction::EditorRedo),
        (_, false, _) => resolve_editor_tool_shortcut(key),
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.text_input_active {
        return resolve_text_shortcut(key);
    }
    if context.in_editor {
        return resolve_editor_shortcut(key, modifiers);
    }
    None
}
