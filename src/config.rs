//! Configuration System using Figment
//!
//! Settings are layered, later sources winning:
//! 1. Built-in defaults ([`Settings::default`])
//! 2. `serial_capture.toml` (or the file passed with `--config`); a missing file is fine
//! 3. Environment variables prefixed with `SERIAL_CAPTURE_`, sections split on `__`
//! 4. Command-line flags, applied by the binary
//!
//! # Example
//! ```no_run
//! use serial_capture::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Port: {}", settings.serial.port);
//! # Ok::<(), serial_capture::error::DaqError>(())
//! ```
//!
//! `SERIAL_CAPTURE_SERIAL__BAUD_RATE=115200` overrides `serial.baud_rate`.

use crate::adapters::DEFAULT_WARMUP_RECORDS;
use crate::error::{AppResult, DaqError};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "serial_capture.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationSettings,
    /// Serial port settings
    #[serde(default)]
    pub serial: SerialSettings,
    /// Acquisition loop settings
    #[serde(default)]
    pub capture: CaptureSettings,
    /// Chart settings
    #[serde(default)]
    pub plot: PlotSettings,
}

/// Application-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log line format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Colour log output when stderr is a terminal
    #[serde(default = "default_log_ansi")]
    pub log_ansi: bool,
}

/// Serial channel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Port name, e.g. `/dev/ttyACM0` or `COM3`
    #[serde(default = "default_port")]
    pub port: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Per-read timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_ms: u64,
}

/// Acquisition loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Reads discarded after opening the port
    #[serde(default = "default_warmup_records")]
    pub warmup_records: usize,
    /// Print each record as it arrives instead of a row counter
    #[serde(default)]
    pub echo: bool,
}

/// Chart export and display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    /// Save the chart next to the CSV as a `.png`
    #[serde(default)]
    pub save: bool,
    /// Open the interactive chart window after saving
    #[serde(default = "default_display")]
    pub display: bool,
    /// Image width in pixels
    #[serde(default = "default_plot_width")]
    pub width: u32,
    /// Image height in pixels
    #[serde(default = "default_plot_height")]
    pub height: u32,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

fn default_log_ansi() -> bool {
    true
}

fn default_port() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout() -> u64 {
    1000
}

fn default_warmup_records() -> usize {
    DEFAULT_WARMUP_RECORDS
}

fn default_display() -> bool {
    true
}

fn default_plot_width() -> u32 {
    2000
}

fn default_plot_height() -> u32 {
    700
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            log_ansi: default_log_ansi(),
        }
    }
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout(),
        }
    }
}

impl SerialSettings {
    /// Read timeout as a `Duration`.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            warmup_records: default_warmup_records(),
            echo: false,
        }
    }
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            save: false,
            display: default_display(),
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

impl PlotSettings {
    /// Image size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Settings {
    /// Load configuration from `serial_capture.toml` and environment variables
    pub fn load() -> AppResult<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from a specific file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SERIAL_CAPTURE_").split("__"))
            .extract()?;
        Ok(settings)
    }

    /// Validate configuration after loading and overriding
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level = self.application.log_level.to_lowercase();
        if !valid_levels.contains(&level.as_str()) {
            return Err(DaqError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["pretty", "compact", "json"];
        let format = self.application.log_format.to_lowercase();
        if !valid_formats.contains(&format.as_str()) {
            return Err(DaqError::Configuration(format!(
                "Invalid log_format '{}'. Must be one of: {}",
                self.application.log_format,
                valid_formats.join(", ")
            )));
        }

        if self.serial.port.trim().is_empty() {
            return Err(DaqError::Configuration("Serial port name is empty".into()));
        }

        if self.serial.baud_rate == 0 {
            return Err(DaqError::Configuration(
                "Invalid baud_rate 0. Must be positive".into(),
            ));
        }

        if self.serial.read_timeout_ms == 0 {
            return Err(DaqError::Configuration(
                "Invalid read_timeout_ms 0. A zero timeout would busy-loop the reader".into(),
            ));
        }

        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(DaqError::Configuration(format!(
                "Invalid plot size {}x{}",
                self.plot.width, self.plot.height
            )));
        }

        Ok(())
    }
}
