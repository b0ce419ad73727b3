//! Line framing over a timed-out byte channel.
//!
//! Bytes of an incomplete line survive a read timeout and are completed by the
//! next call, so a record split across reads is never truncated or duplicated.

use crate::data::Record;
use crate::error::{AppResult, DaqError};
use std::io::{BufRead, BufReader, ErrorKind, Read};
use tracing::{debug, trace};

/// Records discarded after opening the port while the device resets.
pub const DEFAULT_WARMUP_RECORDS: usize = 50;

/// Reads newline-terminated ASCII records from a serial channel.
pub struct LineReader<R> {
    inner: BufReader<R>,
    pending: Vec<u8>,
    decoded: usize,
}

/// Outcome of one framing attempt.
enum Frame {
    Line(Vec<u8>),
    Idle,
}

impl<R: Read> LineReader<R> {
    /// Wraps a channel whose reads time out with `TimedOut` or `WouldBlock`.
    pub fn new(channel: R) -> Self {
        Self {
            inner: BufReader::new(channel),
            pending: Vec::new(),
            decoded: 0,
        }
    }

    /// Reads the next record.
    ///
    /// Returns `Ok(None)` when the read timed out before a full line arrived.
    /// Non-ASCII bytes are a fatal [`DaqError::Decode`].
    pub fn next_record(&mut self) -> AppResult<Option<Record>> {
        match self.next_frame()? {
            Frame::Idle => Ok(None),
            Frame::Line(line) => {
                let row = self.decoded + 1;
                let record =
                    Record::from_line(line).map_err(|bytes| DaqError::Decode { row, bytes })?;
                self.decoded = row;
                trace!(row, record = record.as_str().trim_end(), "record decoded");
                Ok(Some(record))
            }
        }
    }

    /// Discards `count` reads without decoding them.
    ///
    /// Each call counts once whether it produced a line or timed out, so the
    /// warm-up never takes longer than `count` read timeouts. A line left
    /// unfinished by the last call is dropped with the rest.
    pub fn warm_up(&mut self, count: usize) -> AppResult<usize> {
        let mut lines = 0;
        for _ in 0..count {
            if let Frame::Line(_) = self.next_frame()? {
                lines += 1;
            }
        }
        let partial = self.pending.len();
        self.pending.clear();
        debug!(count, lines, partial, "warm-up discarded");
        Ok(lines)
    }

    /// Number of records decoded so far.
    pub fn records_decoded(&self) -> usize {
        self.decoded
    }

    fn next_frame(&mut self) -> AppResult<Frame> {
        match self.inner.read_until(b'\n', &mut self.pending) {
            Ok(0) => Err(DaqError::SerialUnexpectedEof),
            Ok(_) if self.pending.ends_with(b"\n") => {
                let mut line = std::mem::take(&mut self.pending);
                strip_terminator(&mut line);
                Ok(Frame::Line(line))
            }
            // EOF in the middle of a line; the next call reports it.
            Ok(_) => Ok(Frame::Idle),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                Ok(Frame::Idle)
            }
            Err(e) => Err(DaqError::SerialRead(e)),
        }
    }
}

fn strip_terminator(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
}
