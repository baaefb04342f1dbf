use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::annotation::{AnnotationError, MapDocument, DEFAULT_MAP_FILE_NAME};
use crate::raster::{self, RasterError};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "map.png";
const PICTURES_SUBDIR: &str = "Pictures";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("file name is empty")]
    MissingFileName,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Annotation(#[from] AnnotationError),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Where exported images and saved map documents land.
#[derive(Debug, Clone)]
pub struct StorageService {
    output_dir: PathBuf,
}

impl StorageService {
    pub const fn with_output_dir(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Uses `configured` when given, otherwise `$HOME/Pictures`.
    pub fn with_default_paths(configured: Option<&Path>) -> StorageResult<Self> {
        let output_dir = match configured {
            Some(dir) => dir.to_path_buf(),
            None => {
                let home =
                    std::env::var_os("HOME").ok_or(StorageError::MissingHomeDirectory)?;
                PathBuf::from(home).join(PICTURES_SUBDIR)
            }
        };
        Ok(Self::with_output_dir(output_dir))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn target_path(&self, file_name: &str) -> StorageResult<PathBuf> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(StorageError::MissingFileName);
        }
        Ok(self.output_dir.join(file_name))
    }

    /// Writes the flattened raster; no history or metadata is embedded.
    pub fn export_png(&self, raster: &RgbaImage, file_name: &str) -> StorageResult<PathBuf> {
        let target = self.target_path(file_name)?;
        let bytes = raster::encode_png(raster)?;
        write_overwrite(&target, &bytes)?;
        tracing::info!(path = %target.display(), bytes = bytes.len(), "exported png");
        Ok(target)
    }

    pub fn save_map(&self, document: &MapDocument, file_name: &str) -> StorageResult<PathBuf> {
        let target = self.target_path(file_name)?;
        let json = document.to_json()?;
        write_overwrite(&target, json.as_bytes())?;
        tracing::info!(path = %target.display(), "saved map document");
        Ok(target)
    }

    pub fn save_map_default(&self, document: &MapDocument) -> StorageResult<PathBuf> {
        self.save_map(document, DEFAULT_MAP_FILE_NAME)
    }

    pub fn load_map(&self, path: &Path) -> StorageResult<MapDocument> {
        let contents = fs::read_to_string(path)?;
        Ok(MapDocument::from_json(&contents)?)
    }
}

fn write_overwrite(destination: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(destination, bytes)?;
    Ok(())
}
