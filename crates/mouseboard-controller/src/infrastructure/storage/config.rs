//! TOML-based configuration for the controller.
//!
//! Reads `AppConfig` from `$XDG_CONFIG_HOME/mouseboard/config.toml`
//! (falling back to `~/.config/mouseboard/config.toml`), or from the path
//! given with `--config`.
//!
//! ```toml
//! [device]
//! path_template = "/dev/ttyUSB{}"
//! baud_rate = 115200
//! read_timeout_ms = 500
//! max_index = 9
//!
//! [input]
//! scroll_distance = 1
//! german_layout = true
//! reverse_xkb_navigation = false
//!
//! [log]
//! level = "info"
//! capacity = 100
//! ```
//!
//! # Serde default values
//!
//! Every field has a default, so an empty file, a missing section, or no file
//! at all yields a working configuration. Values that cannot work (a template
//! without exactly one `{}`, a zero baud rate) are rejected by
//! [`AppConfig::validate`] at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mouseboard_core::{ScrollDistance, X11LayoutOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::serial::{
    DeviceTemplate, LineSettings, DEFAULT_BAUD_RATE, DEFAULT_MAX_INDEX,
};

/// Name of the directory under the platform config base.
const APP_DIR: &str = "mouseboard";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Serial device discovery and line settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceConfig {
    /// Device path with one `{}` placeholder for the index.
    #[serde(default)]
    pub path_template: DeviceTemplate,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// How long to wait for a reply byte before treating it as `NotConnected`.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Highest index substituted into the template during discovery.
    #[serde(default = "default_max_index")]
    pub max_index: u8,
}

/// Input translation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputConfig {
    /// Wheel distance `K` sent per notch, 1..=127.
    #[serde(default)]
    pub scroll_distance: ScrollDistance,
    #[serde(default = "default_true")]
    pub german_layout: bool,
    #[serde(default)]
    pub reverse_xkb_navigation: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// `tracing` level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Number of log lines kept for the status view.
    #[serde(default = "default_log_capacity")]
    pub capacity: usize,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}
fn default_read_timeout_ms() -> u64 {
    500
}
fn default_max_index() -> u8 {
    DEFAULT_MAX_INDEX
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_capacity() -> usize {
    100
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path_template: DeviceTemplate::default(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            max_index: default_max_index(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            scroll_distance: ScrollDistance::default(),
            german_layout: default_true(),
            reverse_xkb_navigation: false,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            capacity: default_log_capacity(),
        }
    }
}

impl DeviceConfig {
    pub fn line_settings(&self) -> LineSettings {
        LineSettings {
            baud_rate: self.baud_rate,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

impl InputConfig {
    pub fn layout_options(&self) -> X11LayoutOptions {
        X11LayoutOptions {
            german_layout: self.german_layout,
            reverse_xkb_navigation: self.reverse_xkb_navigation,
        }
    }
}

impl AppConfig {
    /// Checks values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.baud_rate == 0 {
            return Err(ConfigError::Invalid("device.baud_rate must be positive".into()));
        }
        if self.device.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "device.read_timeout_ms must be positive".into(),
            ));
        }
        if self.log.capacity == 0 {
            return Err(ConfigError::Invalid("log.capacity must be positive".into()));
        }
        if self.log.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "log.level {:?} is not a tracing level",
                self.log.level
            )));
        }
        Ok(())
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parses and validates configuration text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML or an invalid device
/// template or scroll distance, and [`ConfigError::Invalid`] for values
/// rejected by [`AppConfig::validate`].
pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Resolves the default config file path.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(ConfigError::NoPlatformConfigDir)?;
    Ok(base.join(APP_DIR).join("config.toml"))
}

/// Loads the configuration.
///
/// With an explicit `path` the file must exist. Without one, the default
/// location is used and a missing file yields `AppConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors, plus everything
/// [`parse_config`] returns.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (config_file_path()?, false),
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
            Ok(AppConfig::default())
        }
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
