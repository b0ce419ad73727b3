//! Interactive session setup.
//!
//! Asks the operator for the output file, column names, echo mode and whether
//! to save the chart, unless the command line already answered. Generic over
//! the input and output streams so the dialogue can be driven from tests.
//!
//! Yes/no answers are judged by their first character, case-insensitively; an
//! empty answer means "no".

use crate::capture::{plot_path_for, CaptureSession};
use crate::data::Header;
use crate::error::{AppResult, DaqError};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Answers supplied before the dialogue starts.
#[derive(Debug, Clone, Default)]
pub struct SessionRequest {
    /// Output CSV path.
    pub output: Option<PathBuf>,
    /// Column names; empty means "ask".
    pub columns: Vec<String>,
    /// Real-time echo.
    pub echo: Option<bool>,
    /// Save the chart as `.png`.
    pub save_plot: Option<bool>,
    /// Show the chart window after saving.
    pub display_plot: bool,
}

/// Line-oriented question/answer dialogue.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Reads answers from `input` and writes questions to `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            assume_yes: false,
        }
    }

    /// Answer "yes" to every create/replace question without asking.
    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Runs the whole dialogue and returns the session to capture.
    pub fn collect(&mut self, request: SessionRequest) -> AppResult<CaptureSession> {
        let output = self.output_path(request.output)?;
        let header = self.header(&request.columns)?;

        let echo = match request.echo {
            Some(echo) => echo,
            None => self.echo_choice()?,
        };

        let save_plot = self.plot_choice(&output, request.save_plot)?;

        writeln!(self.output, "\nThe following files will be created:\n")?;
        writeln!(self.output, "---- {} ----", output.display())?;
        if save_plot {
            writeln!(self.output, "---- {} ----", plot_path_for(&output).display())?;
        }
        self.output.flush()?;

        Ok(CaptureSession::new(output)
            .with_header(header)
            .with_echo(echo)
            .with_save_plot(save_plot)
            .with_display_plot(request.display_plot))
    }

    /// Resolves the CSV path, creating its directory or replacing the file on request.
    pub fn output_path(&mut self, preset: Option<PathBuf>) -> AppResult<PathBuf> {
        let path = match preset {
            Some(path) => path,
            None => {
                let answer = self.ask("\nEnter name/path of csv, eg, '~/data/my_file.csv': ")?;
                if answer.is_empty() {
                    return Err(DaqError::Cancelled("no output file given".into()));
                }
                PathBuf::from(answer)
            }
        };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                if !self.confirm("\nDirectory does not exist - create it? y/n: ")? {
                    return Err(DaqError::Cancelled(format!(
                        "directory '{}' does not exist; try again with an existing directory",
                        dir.display()
                    )));
                }
                std::fs::create_dir_all(dir)?;
                writeln!(self.output, "Directory {} created.", dir.display())?;
            }
        }

        if path.exists() {
            if !self.confirm("That file already exists - replace? y/n: ")? {
                return Err(DaqError::Cancelled(format!(
                    "'{}' already exists; try again with a different filename",
                    path.display()
                )));
            }
            std::fs::remove_file(&path)?;
        }

        writeln!(self.output, "\n---- Using filename: {} ----\n", path.display())?;
        debug!(path = %path.display(), "output path chosen");
        Ok(path)
    }

    /// Column names from `preset`, or one per line until an empty line.
    pub fn header(&mut self, preset: &[String]) -> AppResult<Header> {
        let columns = if preset.is_empty() {
            let mut columns = Vec::new();
            loop {
                let name = self.ask("Enter column names or enter if done: ")?;
                if name.is_empty() {
                    break;
                }
                columns.push(name);
            }
            columns
        } else {
            preset.to_vec()
        };

        let header = Header::from_columns(&columns);
        if header.is_empty() {
            writeln!(self.output, "No column names added.")?;
        } else {
            writeln!(self.output, "\n---- Column names: {} ----", columns.join(", "))?;
        }
        Ok(header)
    }

    fn echo_choice(&mut self) -> AppResult<bool> {
        let echo = self.yes_no("\nPrint serial values to terminal in real-time? y/n: ")?;
        if echo {
            writeln!(self.output, "Serial input will be printed.\n")?;
        } else {
            writeln!(self.output, "Serial values will not be printed.\n")?;
        }
        Ok(echo)
    }

    /// Whether to save the chart; an existing image must be replaced to be saved.
    pub fn plot_choice(&mut self, output: &Path, preset: Option<bool>) -> AppResult<bool> {
        let wanted = match preset {
            Some(wanted) => wanted,
            None => self.yes_no("Save data plot as a .png file? y/n: ")?,
        };
        if !wanted {
            writeln!(self.output, "Plot will not be saved.")?;
            return Ok(false);
        }

        let image = plot_path_for(output);
        if image.exists() {
            if self.confirm(
                "The .png for your chosen filename already exists - replace it? y/n: ",
            )? {
                std::fs::remove_file(&image)?;
                writeln!(self.output, "\n---- {} will be replaced. ----", image.display())?;
            } else {
                writeln!(self.output, ".png of plot will not be saved.")?;
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn confirm(&mut self, question: &str) -> AppResult<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        self.yes_no(question)
    }

    fn yes_no(&mut self, question: &str) -> AppResult<bool> {
        let answer = self.ask(question)?;
        Ok(answer
            .chars()
            .next()
            .is_some_and(|c| c.eq_ignore_ascii_case(&'y')))
    }

    /// Writes `question` and reads one trimmed line; end of input is an empty answer.
    fn ask(&mut self, question: &str) -> AppResult<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}
