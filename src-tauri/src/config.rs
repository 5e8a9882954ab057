//! Startup settings for Hide Menu Extras.
//!
//! Settings are read once from a JSON file:
//! `<config_dir>/hide-menu-extras/config.json`.
//! The file is optional and never written back; every field falls back to a default.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use dirs::config_dir;
use serde::Deserialize;
use thiserror::Error;

const APP_CONFIG_DIR_NAME: &str = "hide-menu-extras";
const CONFIG_FILE_NAME: &str = "config.json";

/// Seconds the expanded state stays up before the countdown collapses it.
pub const DEFAULT_AUTOHIDE_SECS: u32 = 15;
pub const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 2000;
const MIN_HEALTH_CHECK_INTERVAL_MS: u64 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Self::Error),
            "WARN" | "WARNING" => Some(Self::Warn),
            "INFO" => Some(Self::Info),
            "DEBUG" => Some(Self::Debug),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// What a right-click on the toggle icon does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RightClickAction {
    /// Cancel the countdown and present the context menu.
    #[default]
    ContextMenu,
    /// Quit immediately.
    Quit,
}

impl RightClickAction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "menu" | "context_menu" => Some(Self::ContextMenu),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    pub log_level: LogLevel,
    pub autohide: Duration,
    pub health_check_interval: Duration,
    pub right_click: RightClickAction,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            autohide: Duration::from_secs(DEFAULT_AUTOHIDE_SECS.into()),
            health_check_interval: Duration::from_millis(DEFAULT_HEALTH_CHECK_INTERVAL_MS),
            right_click: RightClickAction::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    autohide_seconds: Option<u32>,
    #[serde(default)]
    health_check_interval_ms: Option<u64>,
    #[serde(default)]
    right_click: Option<String>,
}

impl From<RawConfig> for AppSettings {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppSettings::default();
        Self {
            log_level: raw
                .log_level
                .as_deref()
                .and_then(LogLevel::from_str)
                .unwrap_or(defaults.log_level),
            autohide: raw
                .autohide_seconds
                .map(|secs| Duration::from_secs(secs.max(1).into()))
                .unwrap_or(defaults.autohide),
            health_check_interval: raw
                .health_check_interval_ms
                .map(|ms| Duration::from_millis(ms.max(MIN_HEALTH_CHECK_INTERVAL_MS)))
                .unwrap_or(defaults.health_check_interval),
            right_click: raw
                .right_click
                .as_deref()
                .and_then(RightClickAction::from_str)
                .unwrap_or(defaults.right_click),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let path = config_dir()?
        .join(APP_CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME);
    Some(path)
}

/// Parses settings from the JSON text of a config file.
pub fn parse_settings(data: &str) -> Result<AppSettings, ConfigError> {
    let raw: RawConfig = serde_json::from_str(data)?;
    Ok(raw.into())
}

fn load_raw_settings() -> Result<Option<AppSettings>, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(&path)?;
    parse_settings(&data).map(Some)
}

/// Loads settings, falling back to defaults when the file is missing or unreadable.
///
/// Runs before the tracing subscriber exists, so failures go to stderr.
pub fn load_settings() -> AppSettings {
    match load_raw_settings() {
        Ok(Some(settings)) => settings,
        Ok(None) => AppSettings::default(),
        Err(err) => {
            eprintln!("Config: failed to load config, using defaults: {err:?}");
            AppSettings::default()
        }
    }
}
