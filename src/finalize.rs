//! One-shot export of a finished capture.
//!
//! [`Finalizer::finalize`] consumes the captured session, so it can only run
//! once. The steps run in order:
//!
//! 1. append header and records to the CSV file (fatal on failure)
//! 2. read the file back, skipping rows it cannot use
//! 3. build a chart with one series per column, titled after the image name
//! 4. export the chart as `.png` when requested
//! 5. hand the chart to a [`ChartViewer`]
//!
//! Steps 2 to 5 only produce warnings: the CSV file is already on disk.

use crate::capture::CapturedSession;
use crate::config::PlotSettings;
use crate::data::{storage, table, Chart};
use crate::error::{AppResult, DaqError};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

const RULE: &str = "---------------------------------------------------";

/// Interactive chart display.
pub trait ChartViewer {
    /// Shows `chart`, blocking until the viewer is closed.
    fn show(&mut self, chart: &Chart) -> AppResult<()>;
}

/// Viewer used when display is disabled.
#[derive(Debug, Default)]
pub struct NoDisplay;

impl ChartViewer for NoDisplay {
    fn show(&mut self, _chart: &Chart) -> AppResult<()> {
        Ok(())
    }
}

/// What finalization produced.
#[derive(Debug)]
pub struct FinalizeReport {
    /// CSV file written.
    pub csv_path: PathBuf,
    /// Records written after the header.
    pub rows: usize,
    /// Image written, if any.
    pub plot_path: Option<PathBuf>,
    /// Whether the chart was handed to the viewer.
    pub displayed: bool,
    /// Non-fatal charting problems.
    pub warnings: Vec<DaqError>,
}

/// Persists a captured session and charts it.
pub struct Finalizer {
    captured: CapturedSession,
    plot_size: (u32, u32),
}

impl Finalizer {
    /// Takes ownership of the captured session.
    pub fn new(captured: CapturedSession) -> Self {
        Self {
            captured,
            plot_size: PlotSettings::default().size(),
        }
    }

    /// Image size for the `.png` export.
    pub fn with_plot_size(mut self, size: (u32, u32)) -> Self {
        self.plot_size = size;
        self
    }

    /// Runs every step once; `out` receives the operator messages.
    pub fn finalize<V, W>(self, viewer: &mut V, out: &mut W) -> AppResult<FinalizeReport>
    where
        V: ChartViewer + ?Sized,
        W: Write,
    {
        let CapturedSession { session, dataset } = self.captured;
        let csv_path = session.output.clone();

        let rows = storage::write_dataset(&csv_path, &session.header, &dataset)?;
        drop(dataset);

        let mut report = FinalizeReport {
            csv_path,
            rows,
            plot_path: None,
            displayed: false,
            warnings: Vec::new(),
        };

        let chart = match table::read_table(&report.csv_path, !session.header.is_empty()) {
            Ok(table) => {
                let image = session.plot_path();
                let title = image
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Some(Chart::from_table(title, &table))
            }
            Err(e) => {
                warn!(error = %e, "chart skipped");
                report.warnings.push(e);
                None
            }
        };

        writeln!(out)?;
        if let (Some(chart), true) = (&chart, session.save_plot) {
            let image = session.plot_path();
            match chart.export_png(&image, self.plot_size) {
                Ok(()) => {
                    writeln!(out, "{RULE}")?;
                    writeln!(out, "{} created.", image.display())?;
                    report.plot_path = Some(image);
                }
                Err(e) => {
                    warn!(error = %e, "chart export failed");
                    writeln!(out, "Warning: {e}")?;
                    report.warnings.push(e);
                }
            }
        }

        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "{} created ({} rows).",
            report.csv_path.display(),
            report.rows
        )?;
        writeln!(out, "{RULE}")?;
        out.flush()?;

        if let (Some(chart), true) = (&chart, session.display_plot) {
            writeln!(out, "\nPress Ctrl-C again to exit.\n")?;
            out.flush()?;
            match viewer.show(chart) {
                Ok(()) => report.displayed = true,
                Err(e) => {
                    warn!(error = %e, "chart display failed");
                    report.warnings.push(e);
                }
            }
        }

        info!(
            path = %report.csv_path.display(),
            rows = report.rows,
            warnings = report.warnings.len(),
            "session finalized"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSession;
    use crate::data::{Dataset, Header, Record};
    use tempfile::tempdir;

    #[derive(Default)]
    struct Recording(Vec<Chart>);

    impl ChartViewer for Recording {
        fn show(&mut self, chart: &Chart) -> AppResult<()> {
            self.0.push(chart.clone());
            Ok(())
        }
    }

    struct Failing;

    impl ChartViewer for Failing {
        fn show(&mut self, _chart: &Chart) -> AppResult<()> {
            Err(DaqError::Display("no display server".into()))
        }
    }

    fn captured(session: CaptureSession, lines: &[&str]) -> CapturedSession {
        CapturedSession {
            session,
            dataset: lines
                .iter()
                .map(|l| Record::from_line(l.as_bytes().to_vec()).unwrap())
                .collect::<Dataset>(),
        }
    }

    #[test]
    fn test_writes_file_and_reports_rows() {
        let dir = tempdir().unwrap();
        let session = CaptureSession::new(dir.path().join("run.csv"))
            .with_header(Header::from_columns(&["x", "y"]));
        let mut out = Vec::new();

        let report = Finalizer::new(captured(session, &["1.0,2.0", "3.0,4.5"]))
            .finalize(&mut NoDisplay, &mut out)
            .unwrap();

        assert_eq!(report.rows, 2);
        assert!(report.plot_path.is_none());
        assert!(!report.displayed);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("run.csv")).unwrap(),
            "x,y\n1.0,2.0\n3.0,4.5\n"
        );
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("run.csv created (2 rows)."));
        assert!(!text.contains("Press Ctrl-C again"));
    }

    #[test]
    fn test_viewer_gets_chart_titled_after_image() {
        let dir = tempdir().unwrap();
        let session = CaptureSession::new(dir.path().join("sweep.csv"))
            .with_header(Header::from_columns(&["a", "b"]))
            .with_display_plot(true);
        let mut viewer = Recording::default();

        let report = Finalizer::new(captured(session, &["1,2", "3,4", "5,6"]))
            .finalize(&mut viewer, &mut Vec::new())
            .unwrap();

        assert!(report.displayed);
        assert_eq!(viewer.0.len(), 1);
        assert_eq!(viewer.0[0].title, "sweep.png");
        assert_eq!(viewer.0[0].series.len(), 2);
        assert_eq!(viewer.0[0].len(), 3);
    }

    #[test]
    fn test_display_failure_is_warning() {
        let dir = tempdir().unwrap();
        let session = CaptureSession::new(dir.path().join("run.csv")).with_display_plot(true);

        let report = Finalizer::new(captured(session, &["1"]))
            .finalize(&mut Failing, &mut Vec::new())
            .unwrap();

        assert!(!report.displayed);
        assert_eq!(report.warnings.len(), 1);
        assert!(!report.warnings[0].is_fatal());
        assert!(dir.path().join("run.csv").exists());
    }

    #[test]
    fn test_write_failure_skips_chart() {
        let dir = tempdir().unwrap();
        let session = CaptureSession::new(dir.path().join("nope").join("run.csv"))
            .with_save_plot(true)
            .with_display_plot(true);
        let mut viewer = Recording::default();

        let err = Finalizer::new(captured(session, &["1"]))
            .finalize(&mut viewer, &mut Vec::new())
            .unwrap_err();

        assert!(matches!(err, DaqError::Storage { .. }));
        assert!(viewer.0.is_empty());
        assert!(!dir.path().join("nope").join("run.png").exists());
    }
}
