use crate::annotation::AnnotationError;
use crate::capture::CaptureError;
use crate::editor::EditorError;
use crate::raster::RasterError;
use crate::state::StateError;
use crate::storage::StorageError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("{0}")]
    Usage(String),
    #[error("no edit session is open")]
    NoSession,
}
