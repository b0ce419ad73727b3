//! Line chart of a captured table: one series per column, x = row index.
use crate::data::Table;
use crate::error::{AppResult, DaqError};
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::info;

/// One named line. `None` or non-finite values break the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label.
    pub name: String,
    /// Value per row.
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Contiguous runs of plottable points as `(row, value)` pairs.
    pub fn segments(&self) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (row, value) in self.values.iter().enumerate() {
            match value {
                Some(v) if v.is_finite() => current.push((row as f64, *v)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}

/// RGB colour of the series at `index`, shared by the image and the window.
pub fn series_rgb(index: usize) -> (u8, u8, u8) {
    let RGBAColor(r, g, b, _) = Palette99::pick(index).to_rgba();
    (r, g, b)
}

/// A titled set of series ready to render or display.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    /// Caption and window title.
    pub title: String,
    /// One series per table column.
    pub series: Vec<Series>,
}

impl Chart {
    /// Builds a chart with one series per column of `table`.
    pub fn from_table(title: impl Into<String>, table: &Table) -> Self {
        let series = table
            .columns
            .iter()
            .enumerate()
            .map(|(index, name)| Series {
                name: name.clone(),
                values: table.column(index),
            })
            .collect();
        Self {
            title: title.into(),
            series,
        }
    }

    /// Number of rows covered by the longest series.
    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.values.len()).max().unwrap_or(0)
    }

    /// True when there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Axis ranges covering every finite value, never degenerate.
    pub fn bounds(&self) -> (Range<f64>, Range<f64>) {
        let x_max = (self.len().saturating_sub(1) as f64).max(1.0);

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for value in self
            .series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .filter(|v| v.is_finite())
        {
            y_min = y_min.min(*value);
            y_max = y_max.max(*value);
        }
        if !y_min.is_finite() {
            (y_min, y_max) = (0.0, 1.0);
        } else if y_min == y_max {
            (y_min, y_max) = (y_min - 1.0, y_max + 1.0);
        }

        (0.0..x_max, y_min..y_max)
    }

    /// Renders the chart to a PNG at `path`.
    pub fn export_png(&self, path: &Path, size: (u32, u32)) -> AppResult<()> {
        let chart_err = |e: &dyn std::fmt::Display| DaqError::Chart {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| chart_err(&e))?;

        let (x_range, y_range) = self.bounds();
        let mut chart = ChartBuilder::on(&root)
            .caption(&self.title, ("sans-serif", 30).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(|e| chart_err(&e))?;

        chart
            .configure_mesh()
            .x_desc("Row")
            .axis_desc_style(("sans-serif", 15))
            .draw()
            .map_err(|e| chart_err(&e))?;

        for (index, series) in self.series.iter().enumerate() {
            let (r, g, b) = series_rgb(index);
            let color = RGBColor(r, g, b);
            for (n, segment) in series.segments().into_iter().enumerate() {
                let drawn = chart
                    .draw_series(LineSeries::new(segment, color.stroke_width(2)))
                    .map_err(|e| chart_err(&e))?;
                if n == 0 {
                    drawn
                        .label(series.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| chart_err(&e))?;

        root.present().map_err(|e| chart_err(&e))?;
        info!(path = %path.display(), "chart image written");
        Ok(())
    }
}
