//! Shared helpers for integration tests: a scripted serial channel and a
//! chart viewer that records what it was shown.
#![allow(dead_code)]

use serial_capture::data::Chart;
use serial_capture::error::AppResult;
use serial_capture::finalize::ChartViewer;
use serial_capture::signal::TerminationSignal;
use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read};

/// One scripted event on the simulated serial line.
#[derive(Debug, Clone)]
pub enum Step {
    /// Bytes returned by a single read.
    Data(Vec<u8>),
    /// The read times out with no data.
    Timeout,
    /// Ctrl-C arrives while the read is blocked; the read carries on.
    Interrupt,
}

/// Simulated serial channel.
///
/// Once the script runs out it raises one interrupt and then times out forever,
/// like an idle device after the operator presses Ctrl-C.
pub struct ScriptedChannel {
    steps: VecDeque<Step>,
    signal: TerminationSignal,
    stopped: bool,
    reads: usize,
}

impl ScriptedChannel {
    pub fn new(steps: Vec<Step>, signal: &TerminationSignal) -> Self {
        Self {
            steps: steps.into(),
            signal: signal.clone(),
            stopped: false,
            reads: 0,
        }
    }

    /// Calls to `read` so far.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl Read for ScriptedChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        loop {
            match self.steps.pop_front() {
                Some(Step::Data(bytes)) => {
                    assert!(bytes.len() <= buf.len(), "scripted chunk larger than read buffer");
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    return Ok(bytes.len());
                }
                Some(Step::Timeout) => return Err(io::Error::from(ErrorKind::TimedOut)),
                Some(Step::Interrupt) => {
                    self.signal.notify();
                }
                None => {
                    if !self.stopped {
                        self.stopped = true;
                        self.signal.notify();
                    }
                    return Err(io::Error::from(ErrorKind::TimedOut));
                }
            }
        }
    }
}

/// One `Data` step per line, each terminated with `\r\n` as a microcontroller sends it.
pub fn lines(lines: &[&str]) -> Vec<Step> {
    lines
        .iter()
        .map(|line| Step::Data(format!("{line}\r\n").into_bytes()))
        .collect()
}

pub fn data(bytes: &[u8]) -> Step {
    Step::Data(bytes.to_vec())
}

/// `count` lines of reset noise, some of them not ASCII.
pub fn garbage(count: usize) -> Vec<Step> {
    (0..count)
        .map(|n| {
            if n % 3 == 0 {
                Step::Data(vec![0xfe, 0xff, b'\r', b'\n'])
            } else {
                Step::Data(format!("junk {n}\r\n").into_bytes())
            }
        })
        .collect()
}

/// Viewer that keeps every chart it is asked to show.
#[derive(Default)]
pub struct RecordingViewer {
    pub shown: Vec<Chart>,
    pub on_show: Option<Box<dyn FnMut()>>,
}

impl ChartViewer for RecordingViewer {
    fn show(&mut self, chart: &Chart) -> AppResult<()> {
        if let Some(hook) = self.on_show.as_mut() {
            hook();
        }
        self.shown.push(chart.clone());
        Ok(())
    }
}
