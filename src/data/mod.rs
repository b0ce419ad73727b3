//! Captured data, its CSV persistence, and the chart built from it.
pub mod chart;
pub mod record;
pub mod storage;
pub mod table;

pub use chart::{Chart, Series};
pub use record::{Dataset, Header, Record};
pub use table::Table;
