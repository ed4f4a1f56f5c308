//! Quakewatch entry point.
//!
//! Loads `quakewatch.yaml` (or the path given as the first argument or in
//! `QUAKEWATCH_CONFIG`), then polls the seismic feed and alerts the user
//! about imminent shaking until `quit` is typed.

use std::path::PathBuf;
use std::sync::Arc;

use quakewatch_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, MonitorConfig};
use quakewatch_runner::console;
use quakewatch_runner::error::MonitorError;
use quakewatch_runner::monitor::Monitor;
use quakewatch_runner::present::{Presenter, TerminalPresenter};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Buffered console commands.
const COMMAND_BUFFER: usize = 16;

/// Application entry point.
///
/// Initializes logging, loads configuration, starts the console reader
/// thread and runs the monitor loop.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or an HTTP client
/// cannot be built.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr, stdout belongs to the presenter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("quakewatch starting");

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let config = MonitorConfig::from_file(&path).map_err(MonitorError::from)?;
    info!(
        config = %path.display(),
        feed = config.feed.url,
        language = %config.language,
        provider = ?config.location.provider,
        push = config.notifications.push_url.is_some(),
        sound = config.audio.sound_path.is_some(),
        "configuration loaded"
    );

    let presenter: Arc<dyn Presenter> = Arc::new(TerminalPresenter);
    let monitor = Monitor::new(&config, presenter)?;

    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    std::thread::spawn(move || console::read_commands(std::io::stdin().lock(), &tx));

    monitor.run(rx).await;
    Ok(())
}
