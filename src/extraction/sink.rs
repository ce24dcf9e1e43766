use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::model::OutputRow;

// ---------------------------------------------------------------------------
// Header policy
// ---------------------------------------------------------------------------

/// How the table header relates to the rows below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMode {
    /// Header is the first row's key sequence; later rows are written as-is.
    #[default]
    FirstRow,
    /// Rows are held back and written under the union of all keys
    /// (first-seen order), with empty cells for keys a row lacks.
    Union,
}

// ---------------------------------------------------------------------------
// ResultSink – append-only CSV writer
// ---------------------------------------------------------------------------

/// Exclusively owned CSV output for one batch.
///
/// The underlying writer is released when the sink is dropped, on every exit
/// path; [`ResultSink::finish`] flushes and reports the row count.
pub struct ResultSink<W: Write> {
    writer: csv::Writer<W>,
    mode: HeaderMode,
    header_written: bool,
    pending: Vec<OutputRow>,
    rows: usize,
}

impl ResultSink<File> {
    /// Create (truncate) the output file.
    pub fn create(path: &Path, mode: HeaderMode) -> csv::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file, mode))
    }
}

impl<W: Write> ResultSink<W> {
    pub fn from_writer(inner: W, mode: HeaderMode) -> Self {
        let writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(inner);
        Self {
            writer,
            mode,
            header_written: false,
            pending: Vec::new(),
            rows: 0,
        }
    }

    /// Append one row. The first row fixes the header.
    pub fn write_row(&mut self, row: OutputRow) -> csv::Result<()> {
        match self.mode {
            HeaderMode::FirstRow => {
                if !self.header_written {
                    self.writer.write_record(row.keys())?;
                    self.header_written = true;
                }
                self.writer.write_record(row.values())?;
                self.writer.flush()?;
            }
            HeaderMode::Union => self.pending.push(row),
        }
        self.rows += 1;
        Ok(())
    }

    /// Write any held-back rows, flush, and return the writer.
    pub fn finish(mut self) -> csv::Result<(W, usize)> {
        if self.mode == HeaderMode::Union && !self.pending.is_empty() {
            let header = union_header(&self.pending);
            self.writer.write_record(&header)?;
            for row in &self.pending {
                let cells: Vec<String> = header
                    .iter()
                    .map(|key| row.value_of(key).unwrap_or_default())
                    .collect();
                self.writer.write_record(&cells)?;
            }
        }
        self.writer.flush()?;
        let rows = self.rows;
        let inner = self
            .writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok((inner, rows))
    }
}

/// Every key of every row, in first-seen order.
fn union_header(rows: &[OutputRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut header = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if seen.insert(key.clone()) {
            header.push(key);
        }
    }
    header
}
