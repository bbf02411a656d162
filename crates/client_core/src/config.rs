use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://fastapi-project-car-database.onrender.com";
pub const CONFIG_FILE_NAME: &str = "car_roster.toml";
pub const CONFIG_PATH_ENV: &str = "CAR_ROSTER_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout: Option<Duration>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout: None,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api base url '{value}': {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("api base url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

impl Settings {
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        let url = Url::parse(self.api_base_url.trim()).map_err(|source| {
            SettingsError::InvalidUrl {
                value: self.api_base_url.clone(),
                source,
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SettingsError::UnsupportedScheme(self.api_base_url.clone()));
        }
        Ok(url)
    }

    /// Applies a command-line override; blank values are ignored.
    pub fn with_api_base_url(mut self, api_base_url: Option<String>) -> Result<Self, SettingsError> {
        if let Some(value) = api_base_url.filter(|value| !value.trim().is_empty()) {
            self.api_base_url = value;
            self.base_url()?;
        }
        Ok(self)
    }
}

/// Defaults, then the config file, then the process environment.
pub fn load_settings() -> Result<Settings, SettingsError> {
    let explicit = std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == io::ErrorKind::NotFound && explicit.is_none() => None,
        Err(source) => return Err(SettingsError::Read { path, source }),
    };

    resolve_settings(raw.as_deref(), &path, |name| std::env::var(name).ok())
}

/// `0` means no timeout, same as leaving it unset.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub fn resolve_settings(
    file_contents: Option<&str>,
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        let file_cfg: FileSettings =
            toml::from_str(raw).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(v) = file_cfg.api_base_url {
            settings.api_base_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            settings.request_timeout = timeout_from_secs(v);
        }
        if let Some(v) = file_cfg.log_filter {
            settings.log_filter = v;
        }
    }

    let var = |name: &str| env(name).filter(|value| !value.trim().is_empty());

    if let Some(v) = var("CAR_ROSTER_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    for name in ["CAR_ROSTER_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS"] {
        if let Some(v) = var(name) {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                settings.request_timeout = timeout_from_secs(parsed);
            }
        }
    }

    if let Some(v) = var("RUST_LOG") {
        settings.log_filter = v;
    }

    settings.base_url()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
