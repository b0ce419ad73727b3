//! Acquisition loop.
//!
//! A [`Capture`] owns the session configuration, runs the warm-up discard and
//! then appends records until the [`TerminationSignal`] reports a stop request.
//! The signal is checked only after an append completes, so a record being read
//! when Ctrl-C arrives is either fully captured or not captured at all.
//!
//! The result, a [`CapturedSession`], is moved into the
//! [`Finalizer`](crate::finalize::Finalizer), which consumes it.

use crate::adapters::LineReader;
use crate::data::{Dataset, Header, Record};
use crate::error::AppResult;
use crate::signal::TerminationSignal;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

/// Configuration of one capture, fixed before the loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    /// CSV file the dataset is appended to.
    pub output: PathBuf,
    /// Column names line.
    pub header: Header,
    /// Print every record instead of a row counter.
    pub echo: bool,
    /// Export the chart as a `.png` next to the CSV.
    pub save_plot: bool,
    /// Show the interactive chart after saving.
    pub display_plot: bool,
}

impl CaptureSession {
    /// A session writing to `output` with no columns and every option off.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            header: Header::default(),
            echo: false,
            save_plot: false,
            display_plot: false,
        }
    }

    /// Set the column header.
    pub fn with_header(mut self, header: Header) -> Self {
        self.header = header;
        self
    }

    /// Enable or disable real-time echo.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Enable or disable the `.png` export.
    pub fn with_save_plot(mut self, save: bool) -> Self {
        self.save_plot = save;
        self
    }

    /// Enable or disable the interactive chart.
    pub fn with_display_plot(mut self, display: bool) -> Self {
        self.display_plot = display;
        self
    }

    /// Image path derived from the output path.
    pub fn plot_path(&self) -> PathBuf {
        plot_path_for(&self.output)
    }
}

/// `run.csv` -> `run.png`.
pub fn plot_path_for(output: &Path) -> PathBuf {
    output.with_extension("png")
}

/// A session together with everything captured for it.
#[derive(Debug)]
pub struct CapturedSession {
    /// The configuration the capture ran with.
    pub session: CaptureSession,
    /// Records in arrival order.
    pub dataset: Dataset,
}

/// Row progress written while capturing.
///
/// Echo mode prints `Row N) <record>`; otherwise a padded counter terminated by
/// `\r` overwrites the previous value.
pub struct ProgressSink<W> {
    out: W,
    echo: bool,
}

impl<W: Write> ProgressSink<W> {
    /// Wraps `out`.
    pub fn new(out: W, echo: bool) -> Self {
        Self { out, echo }
    }

    /// Reports that `record` was stored as row `row` (1-based).
    pub fn record(&mut self, row: usize, record: &Record) -> std::io::Result<()> {
        if self.echo {
            write!(self.out, "Row {row}) {}", record.as_str())?;
        } else {
            write!(self.out, "{row:<16}\r")?;
        }
        self.out.flush()
    }

    /// Gives the writer back.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Appends records until `signal` requests a stop.
///
/// Timeouts append nothing and do not advance the row count. A decode or
/// channel error aborts the loop and the partial dataset is dropped.
pub fn acquire<R: Read, W: Write>(
    reader: &mut LineReader<R>,
    signal: &TerminationSignal,
    progress: &mut ProgressSink<W>,
) -> AppResult<Dataset> {
    let mut dataset = Dataset::new();
    loop {
        if let Some(record) = reader.next_record()? {
            dataset.push(record);
            if let Some(last) = dataset.last() {
                progress.record(dataset.len(), last)?;
            }
        }
        if signal.stop_requested() {
            break;
        }
    }
    info!(rows = dataset.len(), "capture stopped");
    Ok(dataset)
}

/// Warm-up followed by the acquisition loop for one session.
#[derive(Debug)]
pub struct Capture {
    session: CaptureSession,
    warmup_records: usize,
}

impl Capture {
    /// Prepares a capture that discards `warmup_records` reads first.
    pub fn new(session: CaptureSession, warmup_records: usize) -> Self {
        Self {
            session,
            warmup_records,
        }
    }

    /// The session this capture will record.
    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    /// Runs the capture over `channel` until the signal stops it.
    pub fn run<R: Read, W: Write>(
        self,
        channel: R,
        signal: &TerminationSignal,
        progress: W,
    ) -> AppResult<CapturedSession> {
        let span = info_span!("capture", output = %self.session.output.display());
        let _guard = span.enter();

        let mut reader = LineReader::new(channel);
        reader.warm_up(self.warmup_records)?;
        info!(warmup = self.warmup_records, "recording");

        let mut progress = ProgressSink::new(progress, self.session.echo);
        let dataset = acquire(&mut reader, signal, &mut progress)?;

        Ok(CapturedSession {
            session: self.session,
            dataset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_path_replaces_extension() {
        assert_eq!(
            plot_path_for(Path::new("data/run.csv")),
            PathBuf::from("data/run.png")
        );
        assert_eq!(plot_path_for(Path::new("run")), PathBuf::from("run.png"));
    }

    #[test]
    fn test_progress_counter_overwrites() {
        let mut sink = ProgressSink::new(Vec::new(), false);
        let record = Record::from_line(b"1,2".to_vec()).unwrap();
        sink.record(1, &record).unwrap();
        sink.record(2, &record).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, format!("{:<16}\r{:<16}\r", 1, 2));
    }

    #[test]
    fn test_progress_echo_prints_rows() {
        let mut sink = ProgressSink::new(Vec::new(), true);
        let record = Record::from_line(b"3.0,4.5".to_vec()).unwrap();
        sink.record(7, &record).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "Row 7) 3.0,4.5\n");
    }

    #[test]
    fn test_session_builder() {
        let session = CaptureSession::new("out.csv")
            .with_header(Header::from_columns(&["t"]))
            .with_echo(true)
            .with_save_plot(true);
        assert!(session.echo);
        assert!(session.save_plot);
        assert!(!session.display_plot);
        assert_eq!(session.plot_path(), PathBuf::from("out.png"));
    }
}
