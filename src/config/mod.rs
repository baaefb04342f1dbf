use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::editor::{BrushOptions, SessionOptions};
use crate::geometry::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "mapsketch";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Settings from `config.json`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capture_settle_delay_ms: u64,
    pub brush_size: u32,
    pub brush_opacity: u8,
    pub brush_color: String,
    pub history_limit: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub desktop_notifications: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let brush = BrushOptions::default();
        Self {
            capture_settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            brush_size: brush.size,
            brush_opacity: brush.opacity,
            brush_color: brush.color.to_hex(),
            history_limit: None,
            output_dir: None,
            desktop_notifications: true,
        }
    }
}

impl AppConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.capture_settle_delay_ms)
    }

    pub fn session_options(&self) -> SessionOptions {
        let mut brush = BrushOptions::default();
        brush.set_color(Color::parse_css(&self.brush_color));
        brush.set_size(self.brush_size);
        brush.set_opacity(self.brush_opacity);
        SessionOptions {
            brush,
            history_limit: self.history_limit,
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    load_app_config_from(&path)
}

fn load_app_config_from(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
