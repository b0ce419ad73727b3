//! Serial channel access.
//!
//! [`SerialAdapter`] opens the port; [`LineReader`] frames the byte stream into
//! records and runs the warm-up discard.

pub mod line_reader;
pub mod serial_adapter;

pub use line_reader::{LineReader, DEFAULT_WARMUP_RECORDS};
pub use serial_adapter::SerialAdapter;
