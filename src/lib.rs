//! # Serial Capture Core Library
//!
//! Records comma-separated numeric rows streamed as ASCII over a serial port,
//! keeps them in memory until the operator presses Ctrl-C, then writes them to
//! a CSV file and charts them.
//!
//! ## Crate Structure
//!
//! - **`adapters`**: opens the serial port and frames its byte stream into records,
//!   including the warm-up discard after connecting.
//! - **`signal`**: the interrupt counter that stops capture (first Ctrl-C) and exits
//!   the program (second Ctrl-C).
//! - **`capture`**: the acquisition loop and the `CaptureSession` it records.
//! - **`finalize`**: the one-shot CSV write, chart export and chart display.
//! - **`data`**: records and datasets, CSV persistence, read-back and charting.
//! - **`prompt`**: the interactive setup dialogue.
//! - **`config`**: layered settings (defaults, TOML, environment).
//! - **`logging`**: `tracing` subscriber setup.
//! - **`error`**: the `DaqError` enum shared by every module.
//! - **`gui`**: the egui chart window (feature `gui_egui`).

pub mod adapters;
pub mod capture;
pub mod config;
pub mod data;
pub mod error;
pub mod finalize;
#[cfg(feature = "gui_egui")]
pub mod gui;
pub mod logging;
pub mod prompt;
pub mod signal;
