use std::path::PathBuf;
use std::time::Duration;

use crate::app::news::Category;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REFRESH_SECS: u64 = 600;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_LOG_FILE: &str = "newsflash.log";
/// One week.
pub const MAX_REFRESH_SECS: u64 = 7 * 24 * 60 * 60;
pub const MAX_TIMEOUT_SECS: u64 = 60 * 60;

const BASE_URL_KEY: &str = "NEWSFLASH_BASE_URL";
const CATEGORY_KEY: &str = "NEWSFLASH_CATEGORY";
const REFRESH_SECS_KEY: &str = "NEWSFLASH_REFRESH_SECS";
const TIMEOUT_SECS_KEY: &str = "NEWSFLASH_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
    #[error("{key} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("{name} must be at most {max_secs} seconds, got {secs}")]
    DurationTooLong {
        name: &'static str,
        secs: u64,
        max_secs: u64,
    },
    #[error(transparent)]
    UnknownCategory(#[from] crate::app::news::types::UnknownCategory),
}

/// Values given on the command line. Anything left unset falls back to the
/// environment and then to the defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub category: Option<Category>,
    pub refresh_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub category: Category,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
    pub log_file: PathBuf,
}

impl Config {
    /// Loads `.env.local` when present, then resolves against the process
    /// environment.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        Self::resolve(overrides, |key| std::env::var(key).ok())
    }

    pub fn resolve<F>(overrides: Overrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = overrides
            .base_url
            .or_else(|| env(BASE_URL_KEY))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = validate_base_url(base_url)?;

        let category = match overrides.category {
            Some(category) => category,
            None => env(CATEGORY_KEY)
                .map(|raw| raw.parse::<Category>())
                .transpose()?
                .unwrap_or_default(),
        };

        let refresh_secs = match overrides.refresh_secs {
            Some(secs) => secs,
            None => parse_secs(REFRESH_SECS_KEY, env(REFRESH_SECS_KEY))?
                .unwrap_or(DEFAULT_REFRESH_SECS),
        };
        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => secs,
            None => parse_secs(TIMEOUT_SECS_KEY, env(TIMEOUT_SECS_KEY))?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        check_secs("refresh interval", refresh_secs, MAX_REFRESH_SECS)?;
        check_secs("request timeout", timeout_secs, MAX_TIMEOUT_SECS)?;

        Ok(Self {
            base_url,
            category,
            refresh_interval: Duration::from_secs(refresh_secs),
            request_timeout: Duration::from_secs(timeout_secs),
            log_file: overrides
                .log_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }
}

fn validate_base_url(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn check_secs(name: &'static str, secs: u64, max_secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(ConfigError::ZeroDuration(name));
    }
    if secs > max_secs {
        return Err(ConfigError::DurationTooLong {
            name,
            secs,
            max_secs,
        });
    }
    Ok(())
}

fn parse_secs(key: &'static str, raw: Option<String>) -> Result<Option<u64>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value })
    })
    .transpose()
}
