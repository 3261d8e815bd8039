use crate::app::controller::ControllerClosed;
use crate::app::news::FetchError;
use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http client error: {0}")]
    Client(#[from] FetchError),
    #[error("could not load headlines: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Controller(#[from] ControllerClosed),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("logging setup failed: {0}")]
    Logging(String),
}
