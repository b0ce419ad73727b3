//! Serial Hardware Adapter for USB-serial data sources
//!
//! Opens the port read-only from the capture's point of view. The per-read
//! timeout set here is what bounds every [`LineReader`](super::LineReader) call.

use crate::config::SerialSettings;
use crate::error::{AppResult, DaqError};
use std::io::Read;
use std::time::Duration;
use tracing::info;

/// Connection parameters for one serial port.
#[derive(Debug, Clone)]
pub struct SerialAdapter {
    /// Port name (e.g., "/dev/ttyACM0", "COM3")
    port_name: String,

    /// Baud rate (e.g., 9600, 115200)
    baud_rate: u32,

    /// Read timeout applied to every blocking read
    timeout: Duration,
}

impl SerialAdapter {
    /// Create a new serial adapter with a one second read timeout
    ///
    /// # Arguments
    /// * `port_name` - Serial port path (e.g., "/dev/ttyACM0", "COM3")
    /// * `baud_rate` - Communication speed (e.g., 9600, 115200)
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            timeout: Duration::from_millis(SerialSettings::default().read_timeout_ms),
        }
    }

    /// Build an adapter from the `[serial]` configuration section.
    pub fn from_settings(settings: &SerialSettings) -> Self {
        Self::new(settings.port.clone(), settings.baud_rate).with_timeout(settings.read_timeout())
    }

    /// Set read timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Open the port.
    ///
    /// Failure here is fatal and happens before any record is read.
    #[cfg(feature = "instrument_serial")]
    pub fn open(&self) -> AppResult<Box<dyn Read + Send>> {
        let port = serialport::new(&self.port_name, self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| DaqError::SerialOpen {
                port: self.port_name.clone(),
                baud: self.baud_rate,
                message: e.to_string(),
            })?;

        info!(
            port = %self.port_name,
            baud = self.baud_rate,
            timeout_ms = self.timeout.as_millis() as u64,
            "serial port opened"
        );
        Ok(Box::new(port))
    }

    #[cfg(not(feature = "instrument_serial"))]
    pub fn open(&self) -> AppResult<Box<dyn Read + Send>> {
        Err(DaqError::FeatureNotEnabled("instrument_serial".to_string()))
    }

    /// Port name this adapter connects to.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Configured baud rate.
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Human-readable summary for banners and logs.
    pub fn info(&self) -> String {
        format!("SerialAdapter({} @ {} baud)", self.port_name, self.baud_rate)
    }
}
