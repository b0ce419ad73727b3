//! Custom error types for the application.
//!
//! This module defines the primary error type, `DaqError`, for the capture tool.
//! Using the `thiserror` crate, it provides a centralized and consistent way to handle
//! the errors that can occur between opening the serial port and exporting the chart.
//!
//! ## Error Hierarchy
//!
//! - **`Config`** / **`Configuration`**: loading or validating [`crate::config::Settings`].
//! - **`Cancelled`**: the operator declined a create/replace question during setup.
//! - **`SerialOpen`**: bad port or baud rate. Raised before any capture begins.
//! - **`SerialRead`** / **`SerialUnexpectedEof`**: the channel failed mid-capture.
//! - **`Decode`**: a record was not ASCII. The partial dataset is discarded.
//! - **`Storage`**: the CSV file could not be written.
//! - **`TableRead`**, **`Chart`**, **`Display`**: charting problems. These are
//!   reported as warnings because the CSV file is already on disk.
//!
//! Nothing is retried: serial and file-system errors need the operator to fix the
//! device, the path or the disk.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, DaqError>;

/// Every failure the capture pipeline can report.
#[derive(Error, Debug)]
pub enum DaqError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("Session setup cancelled: {0}")]
    Cancelled(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open serial port '{port}' at {baud} baud: {message}")]
    SerialOpen {
        port: String,
        baud: u32,
        message: String,
    },

    #[error("Serial read error: {0}")]
    SerialRead(std::io::Error),

    #[error("Unexpected EOF from serial port")]
    SerialUnexpectedEof,

    #[error("Record {row} is not valid ASCII: {bytes:?}")]
    Decode { row: usize, bytes: Vec<u8> },

    #[error("Failed to write '{}': {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read back '{}': {message}", .path.display())]
    TableRead { path: PathBuf, message: String },

    #[error("Failed to export chart '{}': {message}", .path.display())]
    Chart { path: PathBuf, message: String },

    #[error("Failed to display chart: {0}")]
    Display(String),

    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

impl DaqError {
    /// Whether the error stops the session, as opposed to a charting warning.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            DaqError::TableRead { .. } | DaqError::Chart { .. } | DaqError::Display(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DaqError::SerialOpen {
            port: "/dev/ttyACM0".into(),
            baud: 9600,
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open serial port '/dev/ttyACM0' at 9600 baud: No such file or directory"
        );
    }

    #[test]
    fn test_storage_error_names_path() {
        let err = DaqError::Storage {
            path: PathBuf::from("/data/run.csv"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/data/run.csv"));
    }

    #[test]
    fn test_chart_errors_are_warnings() {
        assert!(!DaqError::Display("no display".into()).is_fatal());
        assert!(!DaqError::Chart {
            path: PathBuf::from("run.png"),
            message: "font".into(),
        }
        .is_fatal());
        assert!(DaqError::SerialUnexpectedEof.is_fatal());
        assert!(DaqError::Decode {
            row: 4,
            bytes: vec![0xff],
        }
        .is_fatal());
    }
}
