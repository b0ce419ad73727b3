//! Records, the dataset they accumulate into, and the CSV header line.

/// One decoded line from the serial stream, terminated by a single `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record(String);

impl Record {
    /// Builds a record from a line with its terminator already stripped.
    ///
    /// Returns the bytes back when they are not ASCII.
    pub fn from_line(line: Vec<u8>) -> Result<Self, Vec<u8>> {
        if !line.is_ascii() {
            return Err(line);
        }
        let mut text = String::from_utf8(line).map_err(|e| e.into_bytes())?;
        text.push('\n');
        Ok(Self(text))
    }

    /// The record text, including its trailing newline.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Ordered, append-only collection of records for one capture session.
///
/// Growth is unbounded: a capture keeps every row in memory until it is
/// finalized, so the chart replays exactly what was written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// An empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record in arrival order.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of records captured.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recently appended record.
    pub fn last(&self) -> Option<&Record> {
        self.records.last()
    }

    /// Records in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Comma-separated column names written once before any record.
///
/// An empty header writes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header(String);

impl Header {
    /// Joins column names with commas and terminates the line.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        if columns.is_empty() {
            return Self::default();
        }
        let joined = columns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("{joined}\n"))
    }

    /// The header text, empty or newline-terminated.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no column names were given.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column names as entered.
    pub fn columns(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        self.0
            .trim_end_matches('\n')
            .split(',')
            .map(str::to_string)
            .collect()
    }
}
