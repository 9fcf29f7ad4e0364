//! Client configuration.
//!
//! # Responsibility
//! - Load client settings from TOML with environment overrides.
//! - Normalize the API base URL once, before any adapter sees it.
//!
//! # Invariants
//! - `api_base_url` parses as an absolute `http`/`https` URL with a host and
//!   has no trailing `/`.
//! - A missing `token_file` means the token lives in memory only.

use crate::logging::{default_log_level, LoggingError};
use reqwest::Url;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";

const ENV_API_BASE_URL: &str = "NOTEKEEPER_API_BASE_URL";
const ENV_TOKEN_FILE: &str = "NOTEKEEPER_TOKEN_FILE";
const ENV_LOG_LEVEL: &str = "NOTEKEEPER_LOG_LEVEL";
const ENV_LOG_DIR: &str = "NOTEKEEPER_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    InvalidBaseUrl(String),
    HttpClient(String),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cannot read config: {err}"),
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidBaseUrl(value) => {
                write!(f, "api_base_url must be an http(s) URL, got `{value}`")
            }
            Self::HttpClient(reason) => write!(f, "cannot build http client: {reason}"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::InvalidBaseUrl(_) | Self::HttpClient(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for one embedded client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// File backing the persisted bearer token.
    pub token_file: Option<PathBuf>,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    /// Transport timeout; `None` keeps the HTTP client default.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_file: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Parses TOML; absent keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(source)?;
        config.api_base_url = normalize_base_url(&config.api_base_url)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Defaults overlaid with `NOTEKEEPER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup` (environment in production).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_blank(ENV_API_BASE_URL) {
            self.api_base_url = url;
        }
        if let Some(path) = non_blank(ENV_TOKEN_FILE) {
            self.token_file = Some(PathBuf::from(path.trim()));
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = level.trim().to_string();
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir.trim()));
        }
        self.api_base_url = normalize_base_url(&self.api_base_url)?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Parses an absolute http(s) base URL that can carry path segments.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl(raw.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    let http = matches!(url.scheme(), "http" | "https");
    if !http || url.host_str().map_or(true, str::is_empty) || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = parse_base_url(raw)?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}
