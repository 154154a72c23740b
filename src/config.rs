//! Runtime configuration.
//!
//! Values come from `HEARTGUARD_*` environment variables, optionally loaded
//! from a `.env` file, and can be overridden from the command line.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::ValidationPolicy;

/// Base URL used when `HEARTGUARD_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Log file used when `HEARTGUARD_LOG_FILE` is unset.
pub const DEFAULT_LOG_FILE: &str = "heartguard.log";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub reason: String,
}

impl ConfigError {
    fn new(var: &'static str, reason: impl Into<String>) -> Self {
        Self {
            var,
            reason: reason.into(),
        }
    }
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File for the TUI on a terminal, console otherwise.
    #[default]
    Auto,
    File,
    /// Console. Written to stderr so command output on stdout stays clean.
    Stdout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Service base URL without trailing slash
    pub api_url: String,
    /// Request timeout; `None` keeps the transport default
    pub timeout: Option<Duration>,
    pub validation: ValidationPolicy,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            validation: ValidationPolicy::Forward,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Load `.env` (or `HEARTGUARD_ENV_FILE`) and read the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first malformed variable, or
    /// `HEARTGUARD_ENV_FILE` if that file cannot be loaded.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_file(std::env::var("HEARTGUARD_ENV_FILE").ok().as_deref())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first malformed variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("HEARTGUARD_API_URL") {
            config.api_url = normalize_base_url(&url)
                .map_err(|reason| ConfigError::new("HEARTGUARD_API_URL", reason))?;
        }

        if let Some(secs) = lookup("HEARTGUARD_TIMEOUT_SECS") {
            config.timeout = Some(parse_timeout(&secs).map_err(|reason| {
                ConfigError::new("HEARTGUARD_TIMEOUT_SECS", reason)
            })?);
        }

        if let Some(policy) = lookup("HEARTGUARD_VALIDATION") {
            config.validation = match policy.trim().to_ascii_lowercase().as_str() {
                "forward" | "" => ValidationPolicy::Forward,
                "strict" => ValidationPolicy::Strict,
                other => {
                    return Err(ConfigError::new(
                        "HEARTGUARD_VALIDATION",
                        format!("expected 'forward' or 'strict', got '{other}'"),
                    ))
                }
            };
        }

        if let Some(mode) = lookup("HEARTGUARD_LOG_MODE") {
            config.log_mode = match mode.trim().to_ascii_lowercase().as_str() {
                "auto" | "" => LogMode::Auto,
                "file" => LogMode::File,
                "stdout" => LogMode::Stdout,
                other => {
                    return Err(ConfigError::new(
                        "HEARTGUARD_LOG_MODE",
                        format!("expected 'auto', 'file' or 'stdout', got '{other}'"),
                    ))
                }
            };
        }

        if let Some(path) = lookup("HEARTGUARD_LOG_FILE").filter(|p| !p.trim().is_empty()) {
            config.log_file = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Replace the base URL (command-line override).
    ///
    /// # Errors
    /// Returns `ConfigError` if the URL is not http(s).
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url =
            normalize_base_url(url).map_err(|reason| ConfigError::new("--api-url", reason))?;
        Ok(self)
    }

    /// Full URL of an endpoint path such as `/predict`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}

/// An explicitly named env file must load; the default `.env` is optional.
fn load_env_file(explicit: Option<&str>) -> Result<(), ConfigError> {
    match explicit {
        Some(path) => dotenvy::from_path(path)
            .map_err(|e| ConfigError::new("HEARTGUARD_ENV_FILE", format!("{path}: {e}"))),
        None => {
            let _ = dotenvy::dotenv();
            Ok(())
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("URL is empty".to_string());
    }
    let lower = trimmed.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return Err(format!("'{trimmed}' must start with http:// or https://"));
    }
    Ok(trimmed.to_string())
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw.trim()))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("'{}' must be a positive number of seconds", raw.trim()));
    }
    Ok(Duration::from_secs_f64(secs))
}
