pub mod annotation;
pub mod app;
pub mod capture;
mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod logging;
pub mod notification;
pub mod raster;
pub mod state;
pub mod storage;
pub use config::{load_app_config, AppConfig};
pub use error::{AppError, AppResult};

/// Entrypoint used by the command-line binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting mapsketch");

    let mode = match app::parse_args(std::env::args().skip(1)) {
        Ok(mode) => mode,
        // --help and --version are reported by clap on stdout.
        Err(AppError::Cli(err)) if !err.use_stderr() => {
            let _ = err.print();
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    let config = load_app_config();
    let notifier = notification::notifier_for(config.desktop_notifications);
    let written = app::run_cli(mode, config, notifier.as_ref())?;

    tracing::info!(path = %written.display(), "done");
    Ok(())
}
