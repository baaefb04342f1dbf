#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Interactive map is shown; no edit session exists.
    #[default]
    MapView,
    Capturing,
    Editor,
}
