//! One-shot snapshots of the interactive map, taken through a renderer collaborator.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use image::RgbaImage;
use thiserror::Error;

use crate::raster;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("map renderer failed: {message}")]
    RenderFailed { message: String },
    #[error("invalid capture size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("renderer returned {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("failed to read map image {path}: {message}")]
    ImageReadFailed { path: PathBuf, message: String },
    #[error("capture worker exited without a result")]
    WorkerDisconnected,
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

/// Source of rendered map imagery. Implementations own tile loading and drawing.
pub trait MapRenderer {
    fn snapshot(&self, width: u32, height: u32) -> CaptureResult<RgbaImage>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub width: u32,
    pub height: u32,
    pub settle_delay: Duration,
}

impl CaptureRequest {
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub const fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

/// Waits for background tiles to settle, then takes a single snapshot. No retries.
pub fn capture_map_with<R: MapRenderer + ?Sized>(
    renderer: &R,
    request: CaptureRequest,
) -> CaptureResult<RgbaImage> {
    let CaptureRequest {
        width,
        height,
        settle_delay,
    } = request;
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidSize { width, height });
    }

    tracing::info!(width, height, delay_ms = settle_delay.as_millis() as u64, "capturing map");
    if !settle_delay.is_zero() {
        std::thread::sleep(settle_delay);
    }

    let snapshot = renderer.snapshot(width, height).inspect_err(|err| {
        tracing::warn!(?err, "map snapshot failed");
    })?;
    if snapshot.dimensions() != (width, height) {
        return Err(CaptureError::SizeMismatch {
            width,
            height,
            actual_width: snapshot.width(),
            actual_height: snapshot.height(),
        });
    }

    tracing::info!(width, height, "map capture complete");
    Ok(snapshot)
}

/// Capture running on a worker thread. Dropping the handle discards its result.
#[derive(Debug)]
pub struct PendingCapture {
    rx: mpsc::Receiver<CaptureResult<RgbaImage>>,
}

impl PendingCapture {
    /// Non-blocking poll; `None` while the worker is still busy.
    pub fn try_result(&self) -> Option<CaptureResult<RgbaImage>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(CaptureError::WorkerDisconnected)),
        }
    }

    pub fn wait(self) -> CaptureResult<RgbaImage> {
        self.rx
            .recv()
            .unwrap_or(Err(CaptureError::WorkerDisconnected))
    }
}

pub fn spawn_capture<R>(renderer: R, request: CaptureRequest) -> PendingCapture
where
    R: MapRenderer + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let result = capture_map_with(&renderer, request);
        let _ = tx.send(result);
    });
    PendingCapture { rx }
}

/// Renderer backed by a pre-rendered map image on disk.
#[derive(Debug, Clone)]
pub struct ImageFileRenderer {
    path: PathBuf,
}

impl ImageFileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn dimensions(&self) -> CaptureResult<(u32, u32)> {
        image::image_dimensions(&self.path).map_err(|err| CaptureError::ImageReadFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }
}

impl MapRenderer for ImageFileRenderer {
    fn snapshot(&self, width: u32, height: u32) -> CaptureResult<RgbaImage> {
        let image = raster::load_png(&self.path).map_err(|err| CaptureError::ImageReadFailed {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        if image.dimensions() != (width, height) {
            return Err(CaptureError::SizeMismatch {
                width,
                height,
                actual_width: image.width(),
                actual_height: image.height(),
            });
        }
        Ok(image)
    }
}
