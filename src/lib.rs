pub mod app;
pub mod config;
mod error;
pub mod ui;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::controller::{Command, NewsController};
use app::news::{Category, NewsClient};
use app::view::ViewState;
use config::{Config, Overrides};
pub use error::AppError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal news reader with per-article sentiment", long_about = None)]
pub struct Cli {
    /// Base URL of the sentiment backend [default: http://127.0.0.1:5000]
    #[arg(long)]
    pub base_url: Option<String>,
    /// Category to open with [default: general]
    #[arg(long, value_enum)]
    pub category: Option<Category>,
    /// Seconds between automatic refreshes [default: 600]
    #[arg(long)]
    pub refresh_secs: Option<u64>,
    /// Per-request timeout in seconds [default: 20]
    #[arg(long)]
    pub timeout_secs: Option<u64>,
    /// Where the interactive view writes its log [default: newsflash.log]
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Fetch once, print the headlines and exit
    #[arg(long)]
    pub once: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            category: self.category,
            refresh_secs: self.refresh_secs,
            timeout_secs: self.timeout_secs,
            log_file: self.log_file.clone(),
        }
    }
}

pub fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::load(cli.overrides())?;
    init_logging(&config, cli.once)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    if cli.once {
        let mut stdout = io::stdout().lock();
        runtime.block_on(print_once(&config, &mut stdout))
    } else {
        runtime.block_on(run_interactive(config))
    }
}

async fn run_interactive(config: Config) -> Result<(), AppError> {
    let client = NewsClient::new(&config.base_url, config.request_timeout)?;
    let (handle, controller_task) =
        NewsController::spawn(client, config.category, config.refresh_interval);

    let ui_handle = handle.clone();
    let refresh_interval = config.refresh_interval;
    let ui_result =
        tokio::task::spawn_blocking(move || ui::run_terminal(&ui_handle, refresh_interval)).await?;

    // The controller may already be gone if the terminal loop failed on it.
    let _ = handle.send(Command::Shutdown).await;
    controller_task.await?;
    info!("Exited");
    ui_result
}

/// Fetches once and writes the plain rendering to `out`. The rendering is
/// written even when the fetch fails; the failure is returned afterwards.
async fn print_once<W: Write>(config: &Config, out: &mut W) -> Result<(), AppError> {
    let client = NewsClient::new(&config.base_url, config.request_timeout)?;
    let mut state = ViewState::new(config.category);
    let ticket = state.begin_fetch();
    let result = client.fetch_news(config.category).await;

    let failure = result.as_ref().err().map(ToString::to_string);
    if let Some(message) = &failure {
        warn!(category = %config.category, "Failed to fetch news: {message}");
    }
    state.complete_fetch(ticket, result);
    out.write_all(ui::plain::render_plain(&state, config.refresh_interval).as_bytes())?;
    out.flush()?;

    match failure {
        Some(message) => Err(AppError::Unavailable(message)),
        None => Ok(()),
    }
}

/// Interactive runs log to a file so the output does not tear the screen.
fn init_logging(config: &Config, once: bool) -> Result<(), AppError> {
    let default_level = if once { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = if once {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    };
    installed.map_err(|error| AppError::Logging(error.to_string()))
}
