//! CLI Entry Point for serial-capture
//!
//! Records comma-separated numeric rows streamed over serial until the operator
//! presses Ctrl-C, then writes the CSV file, optionally saves a `.png` chart, and
//! shows the chart. A second Ctrl-C closes the chart and exits.
//!
//! # Usage
//!
//! ```bash
//! serial-capture -p /dev/ttyUSB0 -b 115200
//! serial-capture -o data/run.csv -c time -c volts --save-plot --yes
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serial_capture::adapters::SerialAdapter;
use serial_capture::capture::Capture;
use serial_capture::config::Settings;
use serial_capture::finalize::{ChartViewer, Finalizer, NoDisplay};
use serial_capture::logging;
use serial_capture::prompt::{Prompter, SessionRequest};
use serial_capture::signal::{self, TerminationSignal};
use std::io;
use std::path::PathBuf;

const LONG_ABOUT: &str = "\
Records .csv rows of numerical data streamed via serial as ASCII strings
(eg \"<float>,<float>,<float>\") until commanded to stop with Ctrl-C. When
recording stops the .csv file is created; a plot of the recorded data is then
displayed and saved as a .png file if requested.

Things that are not checked, ie up to the user to get right:

1) that the recorded input is actually rows of numerical .csv data
   (so make sure your serial source is correctly set up!)
2) that the number of columns entered equals the number of values in the
   recorded rows.";

#[derive(Parser, Debug)]
#[command(name = "serial-capture", version)]
#[command(about = "Record CSV rows streamed over serial, then save and plot them")]
#[command(long_about = LONG_ABOUT)]
struct Cli {
    /// Serial port name (e.g. /dev/ttyACM0, COM3)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Configuration file (default: serial_capture.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Log line format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Reads discarded after connecting, while the device resets
    #[arg(long, value_name = "COUNT")]
    warmup: Option<usize>,

    /// Per-read serial timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Output CSV file (prompted for if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Column name; repeat for each column (prompted for if omitted)
    #[arg(short = 'c', long = "column", value_name = "NAME")]
    columns: Vec<String>,

    /// Print serial values in real time instead of a row counter
    #[arg(long)]
    echo: bool,

    /// Save the chart as a .png next to the CSV
    #[arg(long)]
    save_plot: bool,

    /// Do not open the chart window
    #[arg(long)]
    no_display: bool,

    /// Answer yes to create/replace questions
    #[arg(short, long)]
    yes: bool,
}

impl Cli {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(port) = &self.port {
            settings.serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            settings.serial.baud_rate = baud;
        }
        if let Some(level) = &self.log_level {
            settings.application.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            settings.application.log_format = format.clone();
        }
        if let Some(warmup) = self.warmup {
            settings.capture.warmup_records = warmup;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.serial.read_timeout_ms = timeout_ms;
        }
        if self.echo {
            settings.capture.echo = true;
        }
        if self.save_plot {
            settings.plot.save = true;
        }
        if self.no_display {
            settings.plot.display = false;
        }
    }

    fn session_request(&self, settings: &Settings) -> SessionRequest {
        SessionRequest {
            output: self.output.clone(),
            columns: self.columns.clone(),
            echo: settings.capture.echo.then_some(true),
            save_plot: settings.plot.save.then_some(true),
            display_plot: settings.plot.display,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("Failed to load configuration")?;
    cli.apply_overrides(&mut settings);
    settings.validate()?;
    logging::init_from_settings(&settings).map_err(anyhow::Error::msg)?;

    println!("\n##################");
    println!("#  SERIAL CAPTURE #");
    println!("##################");
    println!("\nFor help run: `serial-capture --help`");
    println!("\nCURRENT SETTINGS:");
    println!("* Serial port: {}", settings.serial.port);
    println!("* Baud rate: {}", settings.serial.baud_rate);

    let session = {
        let stdin = io::stdin();
        Prompter::new(stdin.lock(), io::stdout())
            .with_assume_yes(cli.yes)
            .collect(cli.session_request(&settings))
            .context("Session setup failed")?
    };

    println!("\nStarting . . . ");

    // Ctrl-C stops capture from here on instead of killing the process.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let signal = TerminationSignal::new();
    let _listener = signal::listen_for_interrupts(runtime.handle(), signal.clone())
        .context("Failed to install the Ctrl-C handler")?;

    let adapter = SerialAdapter::from_settings(&settings.serial);
    let channel = adapter
        .open()
        .with_context(|| format!("Could not connect using {}", adapter.info()))?;

    println!("\nRunning.\n\nPress Ctrl-C to finish recording data, save file(s) and view plot.");
    println!("\nRows recorded:");

    let captured = Capture::new(session, settings.capture.warmup_records)
        .run(channel, &signal, io::stdout().lock())
        .context("Capture aborted; no file was written")?;

    let mut viewer = chart_viewer(captured.session.display_plot, &signal);
    let report = Finalizer::new(captured)
        .with_plot_size(settings.plot.size())
        .finalize(viewer.as_mut(), &mut io::stdout())
        .context("Failed to save the captured data")?;

    for warning in &report.warnings {
        eprintln!("⚠️  {warning}");
    }

    runtime.shutdown_background();
    Ok(())
}

fn chart_viewer(display: bool, signal: &TerminationSignal) -> Box<dyn ChartViewer> {
    if !display {
        return Box::new(NoDisplay);
    }

    #[cfg(feature = "gui_egui")]
    {
        Box::new(serial_capture::gui::PlotWindow::new(signal.clone()))
    }

    #[cfg(not(feature = "gui_egui"))]
    {
        let _ = signal;
        tracing::warn!("built without the gui_egui feature; chart window disabled");
        Box::new(NoDisplay)
    }
}
