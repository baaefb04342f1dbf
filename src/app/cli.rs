use std::path::{Path, PathBuf};

use clap::Parser;

use crate::annotation::MapCreator;
use crate::capture::ImageFileRenderer;
use crate::config::AppConfig;
use crate::editor::{EditorCommand, ToolKind};
use crate::error::{AppError, AppResult};
use crate::geometry::{Color, PixelPoint};
use crate::notification::Notifier;
use crate::raster::FilterPreset;
use crate::storage::{StorageService, DEFAULT_EXPORT_FILE_NAME};

use super::App;

const DEFAULT_RENDER_SIZE: &str = "1024x768";

/// Headless map editing: apply filters and fills to a captured map, or render
/// a saved region/place document.
#[derive(Parser, Debug)]
#[command(
    name = "mapsketch",
    version,
    about = "Edit captured map images and render saved map documents",
    long_about = "Edit captured map images and render saved map documents.\n\n\
                  Filters run before fills, since filters always start again from the\n\
                  captured image. Without an output path the result is written as\n\
                  map.png in the configured output directory ($HOME/Pictures by default)."
)]
pub struct CliArgs {
    /// Captured map image, or a map JSON document with --render-map.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output PNG path.
    #[arg(value_name = "OUTPUT.png")]
    pub output: Option<PathBuf>,

    /// Render INPUT as a region/place document instead of editing an image.
    #[arg(long)]
    pub render_map: bool,

    /// Canvas size for --render-map.
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = DEFAULT_RENDER_SIZE, value_parser = parse_size)]
    pub size: (u32, u32),

    /// Filter preset: none, grayscale, sepia, invert.
    #[arg(long, value_parser = parse_preset)]
    pub preset: Option<FilterPreset>,

    /// Brightness percentage, 100 is unchanged.
    #[arg(long, allow_negative_numbers = true)]
    pub brightness: Option<i32>,

    /// Contrast percentage, 100 is unchanged.
    #[arg(long, allow_negative_numbers = true)]
    pub contrast: Option<i32>,

    /// Saturation percentage, 100 is unchanged.
    #[arg(long, allow_negative_numbers = true)]
    pub saturation: Option<i32>,

    /// Paint-bucket fill at pixel X,Y. Repeatable; fills run in order.
    #[arg(long = "fill", value_name = "X,Y,#rrggbb", value_parser = parse_fill)]
    pub fills: Vec<(PixelPoint, Color)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    /// Editor commands in the order they run: filters first, then fills.
    pub commands: Vec<EditorCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderMapArgs {
    pub document: PathBuf,
    pub output: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliMode {
    Edit(EditArgs),
    RenderMap(RenderMapArgs),
}

fn parse_preset(value: &str) -> Result<FilterPreset, String> {
    FilterPreset::parse(value).ok_or_else(|| {
        let names: Vec<_> = FilterPreset::ALL.iter().map(|preset| preset.as_str()).collect();
        format!("unknown preset `{value}`, expected one of: {}", names.join(", "))
    })
}

fn parse_fill(value: &str) -> Result<(PixelPoint, Color), String> {
    let mut parts = value.splitn(3, ',');
    let (Some(x), Some(y), Some(color)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected X,Y,#rrggbb, got `{value}`"));
    };
    let coordinate = |part: &str| {
        part.trim()
            .parse::<i32>()
            .map_err(|_| format!("`{part}` is not a pixel coordinate"))
    };
    let seed = PixelPoint::new(coordinate(x)?, coordinate(y)?);
    let color = Color::from_hex(color).ok_or_else(|| format!("`{color}` is not #rrggbb"))?;
    Ok((seed, color))
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    value
        .split_once(|c: char| c.eq_ignore_ascii_case(&'x'))
        .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)))
        .filter(|&(w, h)| w > 0 && h > 0)
        .ok_or_else(|| format!("expected WIDTHxHEIGHT with non-zero sides, got `{value}`"))
}

impl CliArgs {
    pub fn into_mode(self) -> AppResult<CliMode> {
        let has_edits = self.preset.is_some()
            || self.brightness.is_some()
            || self.contrast.is_some()
            || self.saturation.is_some()
            || !self.fills.is_empty();

        if self.render_map {
            if has_edits {
                return Err(AppError::Usage(
                    "--render-map takes no filter or fill options".to_string(),
                ));
            }
            let (width, height) = self.size;
            return Ok(CliMode::RenderMap(RenderMapArgs {
                document: self.input,
                output: self.output,
                width,
                height,
            }));
        }

        let mut commands = Vec::new();
        commands.extend(self.preset.map(EditorCommand::SetFilterPreset));
        commands.extend(self.brightness.map(EditorCommand::SetBrightness));
        commands.extend(self.contrast.map(EditorCommand::SetContrast));
        commands.extend(self.saturation.map(EditorCommand::SetSaturation));
        if !self.fills.is_empty() {
            commands.push(EditorCommand::SelectTool(ToolKind::Fill));
            for (seed, color) in self.fills {
                commands.push(EditorCommand::SetColor(color));
                commands.push(EditorCommand::PointerDown(seed));
                commands.push(EditorCommand::PointerUp);
            }
        }

        Ok(CliMode::Edit(EditArgs {
            input: self.input,
            output: self.output,
            commands,
        }))
    }
}

/// Parses the arguments after the program name.
pub fn parse_args<I>(args: I) -> AppResult<CliMode>
where
    I: IntoIterator<Item = String>,
{
    let argv = std::iter::once("mapsketch".to_string()).chain(args);
    CliArgs::try_parse_from(argv)?.into_mode()
}

fn storage_for(output: Option<&Path>, config: &AppConfig) -> AppResult<(StorageService, String)> {
    let Some(output) = output else {
        let storage = StorageService::with_default_paths(config.output_dir.as_deref())?;
        return Ok((storage, DEFAULT_EXPORT_FILE_NAME.to_string()));
    };
    let file_name = output
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::Usage(format!("bad output path: {}", output.display())))?;
    let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok((StorageService::with_output_dir(dir), file_name.to_string()))
}

/// Runs one headless job and returns the written file.
pub fn run_cli(mode: CliMode, config: AppConfig, notifier: &dyn Notifier) -> AppResult<PathBuf> {
    match mode {
        CliMode::Edit(args) => run_edit(args, config, notifier),
        CliMode::RenderMap(args) => run_render_map(args, &config),
    }
}

fn run_edit(args: EditArgs, config: AppConfig, notifier: &dyn Notifier) -> AppResult<PathBuf> {
    let renderer = ImageFileRenderer::new(&args.input);
    let (width, height) = renderer.dimensions()?;
    let (storage, file_name) = storage_for(args.output.as_deref(), &config)?;

    let mut app = App::new(config);
    app.capture_with(&renderer, width, height, notifier)?;
    for command in args.commands {
        app.dispatch(command)?;
    }

    let path = app.export(&storage, &file_name)?;
    app.back()?;
    Ok(path)
}

fn run_render_map(args: RenderMapArgs, config: &AppConfig) -> AppResult<PathBuf> {
    let mut creator = MapCreator::new(args.width, args.height);
    creator.load(&args.document)?;
    let canvas = creator.render()?;

    let (storage, file_name) = storage_for(args.output.as_deref(), config)?;
    Ok(storage.export_png(&canvas, &file_name)?)
}
