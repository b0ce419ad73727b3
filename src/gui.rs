//! The eframe/egui chart window shown after a capture is saved.
use crate::data::chart::series_rgb;
use crate::data::Chart;
use crate::error::{AppResult, DaqError};
use crate::finalize::ChartViewer;
use crate::signal::TerminationSignal;
use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::time::Duration;
use tracing::info;

const SIGNAL_POLL: Duration = Duration::from_millis(100);

/// Native window with one line per series.
///
/// The window closes itself once the termination signal reports an exit
/// request, so a second Ctrl-C ends the program even while the chart is open.
pub struct PlotWindow {
    signal: TerminationSignal,
}

impl PlotWindow {
    /// A window that watches `signal` for the exit request.
    pub fn new(signal: TerminationSignal) -> Self {
        Self { signal }
    }
}

impl ChartViewer for PlotWindow {
    fn show(&mut self, chart: &Chart) -> AppResult<()> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1400.0, 560.0])
                .with_title(chart.title.clone()),
            ..Default::default()
        };

        let app = ChartApp {
            title: chart.title.clone(),
            lines: segment_lines(chart),
            signal: self.signal.clone(),
        };
        info!(title = %chart.title, "opening chart window");
        eframe::run_native(
            &chart.title,
            options,
            Box::new(move |_cc| Ok(Box::new(app))),
        )
        .map_err(|e| DaqError::Display(e.to_string()))
    }
}

/// One gap-free run of a series, coloured after the series it belongs to.
#[derive(Debug, Clone, PartialEq)]
struct SegmentLine {
    name: String,
    color: Color32,
    points: Vec<[f64; 2]>,
}

fn segment_lines(chart: &Chart) -> Vec<SegmentLine> {
    let mut lines = Vec::new();
    for (index, series) in chart.series.iter().enumerate() {
        let (r, g, b) = series_rgb(index);
        let color = Color32::from_rgb(r, g, b);
        for segment in series.segments() {
            lines.push(SegmentLine {
                name: series.name.clone(),
                color,
                points: segment.into_iter().map(|(x, y)| [x, y]).collect(),
            });
        }
    }
    lines
}

struct ChartApp {
    title: String,
    lines: Vec<SegmentLine>,
    signal: TerminationSignal,
}

impl eframe::App for ChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.signal.exit_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&self.title);
            Plot::new("capture_chart")
                .legend(Legend::default())
                .x_axis_label("Row")
                .show(ui, |plot_ui| {
                    for line in &self.lines {
                        plot_ui.line(
                            Line::new(PlotPoints::new(line.points.clone()))
                                .name(&line.name)
                                .color(line.color),
                        );
                    }
                });
        });

        // Keep polling the signal while the window is idle.
        ctx.request_repaint_after(SIGNAL_POLL);
    }
}
