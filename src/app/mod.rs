use std::path::PathBuf;

use image::RgbaImage;

use crate::capture::{
    capture_map_with, spawn_capture, CaptureRequest, CaptureResult, MapRenderer, PendingCapture,
};
use crate::config::AppConfig;
use crate::editor::{EditSession, EditorCommand, EditorEvent};
use crate::error::{AppError, AppResult};
use crate::input::{
    resolve_shortcut, CanvasPlacement, InputContext, PointerEvent, PointerTracker, ShortcutAction,
    ShortcutKey, ShortcutModifiers,
};
use crate::notification::Notifier;
use crate::state::{AppEvent, AppState, StateMachine};
use crate::storage::StorageService;

mod cli;

pub use cli::{parse_args, run_cli, CliArgs, CliMode, EditArgs, RenderMapArgs};

const CAPTURE_FAILED_NOTICE: &str = "Map capture failed";

/// Headless application core: the map view, capture lifecycle and the open edit session.
#[derive(Debug)]
pub struct App {
    machine: StateMachine,
    config: AppConfig,
    session: Option<EditSession>,
    pointer: PointerTracker,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            machine: StateMachine::new(),
            config,
            session: None,
            pointer: PointerTracker::default(),
        }
    }

    pub fn state(&self) -> &StateMachine {
        &self.machine
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    pub fn capture_request(&self, width: u32, height: u32) -> CaptureRequest {
        CaptureRequest::new(width, height).with_settle_delay(self.config.settle_delay())
    }

    /// Captures on the calling thread and opens the editor on success.
    pub fn capture_with<R: MapRenderer + ?Sized>(
        &mut self,
        renderer: &R,
        width: u32,
        height: u32,
        notifier: &dyn Notifier,
    ) -> AppResult<()> {
        let request = self.capture_request(width, height);
        self.machine.transition(AppEvent::CaptureRequested)?;
        let result = capture_map_with(renderer, request);
        self.finish_capture(result, notifier)
    }

    /// Starts a capture on a worker thread. Feed the outcome back through
    /// [`App::finish_capture`].
    pub fn capture_in_background<R>(
        &mut self,
        renderer: R,
        width: u32,
        height: u32,
    ) -> AppResult<PendingCapture>
    where
        R: MapRenderer + Send + 'static,
    {
        let request = self.capture_request(width, height);
        self.machine.transition(AppEvent::CaptureRequested)?;
        Ok(spawn_capture(renderer, request))
    }

    pub fn finish_capture(
        &mut self,
        result: CaptureResult<RgbaImage>,
        notifier: &dyn Notifier,
    ) -> AppResult<()> {
        let session = result
            .map_err(AppError::from)
            .and_then(|capture| {
                EditSession::from_capture(capture, self.config.session_options())
                    .map_err(AppError::from)
            });

        match session {
            Ok(session) => {
                self.machine.transition(AppEvent::CaptureSucceeded)?;
                self.session = Some(session);
                self.pointer = PointerTracker::default();
                tracing::info!("editor opened");
                Ok(())
            }
            Err(err) => {
                self.machine.transition(AppEvent::CaptureFailed)?;
                self.session = None;
                tracing::warn!(?err, "capture failed; back to map view");
                notifier.notify(&format!("{CAPTURE_FAILED_NOTICE}: {err}"));
                Err(err)
            }
        }
    }

    /// Leaves the editor. The session and its history are discarded.
    pub fn back(&mut self) -> AppResult<()> {
        self.machine.transition(AppEvent::BackToMap)?;
        self.session = None;
        Ok(())
    }

    pub fn dispatch(&mut self, command: EditorCommand) -> AppResult<EditorEvent> {
        let session = self.session.as_mut().ok_or(AppError::NoSession)?;
        Ok(session.dispatch(command)?)
    }

    pub fn set_canvas_placement(&mut self, placement: CanvasPlacement) {
        self.pointer.set_placement(placement);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> AppResult<EditorEvent> {
        if self.session.is_none() {
            return Ok(EditorEvent::Unchanged);
        }
        match self.pointer.translate(event) {
            Some(command) => self.dispatch(command),
            None => Ok(EditorEvent::Unchanged),
        }
    }

    pub fn input_context(&self) -> InputContext {
        InputContext {
            text_input_active: self
                .session
                .as_ref()
                .is_some_and(|session| session.tools().pending_text().is_some()),
            in_editor: self.machine.state() == AppState::Editor,
        }
    }

    /// Resolves a key press and applies it. `text` is the content of the canvas
    /// text entry, consumed when the key commits it.
    pub fn handle_shortcut(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
        text: &str,
    ) -> AppResult<Option<EditorEvent>> {
        let Some(action) = resolve_shortcut(key, modifiers, self.input_context()) else {
            return Ok(None);
        };
        tracing::debug!(?action, "shortcut resolved");
        let command = match action {
            ShortcutAction::TextCommit => EditorCommand::CommitText(text.to_string()),
            other => match other.editor_command() {
                Some(command) => command,
                None => return Ok(None),
            },
        };
        self.dispatch(command).map(Some)
    }

    pub fn export(&self, storage: &StorageService, file_name: &str) -> AppResult<PathBuf> {
        let session = self.session.as_ref().ok_or(AppError::NoSession)?;
        Ok(storage.export_png(session.surface(), file_name)?)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
