use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use client_core::{DismissPolicy, LifecycleTimings};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_seconds: u64,
    pub progress_delay_ms: u64,
    pub dismiss_policy: DismissPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:4000/api".into(),
            api_token: None,
            request_timeout_seconds: 30,
            progress_delay_ms: 750,
            dismiss_policy: DismissPolicy::All,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn timings(&self) -> LifecycleTimings {
        LifecycleTimings {
            progress_delay: Duration::from_millis(self.progress_delay_ms),
            ..LifecycleTimings::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    api_token: Option<String>,
    request_timeout_seconds: Option<u64>,
    progress_delay_ms: Option<u64>,
    dismiss_policy: Option<DismissPolicy>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Defaults, then the config file, then `APP__*` environment overrides.
///
/// An explicitly given file must exist; the default `console.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw).map_err(|source| SettingsError::Parse {
            path: path.clone(),
            source,
        })?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {}
        Err(source) => return Err(SettingsError::Read { path, source }),
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<(), toml::de::Error> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.api_token {
        settings.api_token = Some(v);
    }
    if let Some(v) = file_cfg.request_timeout_seconds {
        settings.request_timeout_seconds = v;
    }
    if let Some(v) = file_cfg.progress_delay_ms {
        settings.progress_delay_ms = v;
    }
    if let Some(v) = file_cfg.dismiss_policy {
        settings.dismiss_policy = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), SettingsError> {
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
        settings.request_timeout_seconds = parse_env("APP__REQUEST_TIMEOUT_SECONDS", v)?;
    }
    if let Some(v) = lookup("APP__PROGRESS_DELAY_MS") {
        settings.progress_delay_ms = parse_env("APP__PROGRESS_DELAY_MS", v)?;
    }
    if let Some(v) = lookup("APP__DISMISS_POLICY") {
        settings.dismiss_policy = parse_env("APP__DISMISS_POLICY", v)?;
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidEnv { key, value })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
