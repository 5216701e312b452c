//! Append-only tabular store
//!
//! UTF-8, line-feed terminated rows of nine double-quoted fields. Line feeds
//! inside a value are stored as carriage returns so that one record is always
//! exactly one line, and embedded quotes are doubled.

use crate::output::record::{Record, FIELD_LABELS};
use crate::storage::{StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const FIELD_SEPARATOR: &str = ",";
const QUOTE: char = '"';

/// Escapes one value as a quoted field
pub fn escape_field(value: &str) -> String {
    let body = value.replace('\n', "\r").replace(QUOTE, "\"\"");
    format!("{QUOTE}{body}{QUOTE}")
}

/// The header line, without its terminating line feed
pub fn header_line() -> String {
    FIELD_LABELS
        .iter()
        .map(|label| escape_field(label))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Encodes a record as one row, without its terminating line feed
pub fn record_line(record: &Record) -> String {
    record
        .values()
        .iter()
        .map(|value| escape_field(value))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// Number of stored lines (header included) to keep when a run starts
///
/// The resume boundary keeps the rows up to `resume_cursor` plus one row of
/// tolerance for an item whose row was written before its cursor save. The
/// result is further clipped so that every item from `first_item` on is
/// written afresh instead of being appended a second time.
pub fn retained_line_count(resume_cursor: u64, first_item: u64, stored_lines: usize) -> usize {
    let boundary = resume_cursor.saturating_add(2).min(first_item);
    usize::try_from(boundary)
        .unwrap_or(usize::MAX)
        .min(stored_lines)
}

/// Writer over the tabular store, held open for the whole run
#[derive(Debug)]
pub struct TableWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows_written: u64,
}

impl TableWriter {
    /// Opens the store for a run whose first appended item is `first_item`
    ///
    /// Complete lines of a prior store are kept according to
    /// [`retained_line_count`]; a trailing line without a line feed is
    /// discarded. A store that does not start with the header is discarded
    /// as a whole. When nothing is kept, the header is written.
    pub fn open(path: &Path, resume_cursor: u64, first_item: u64) -> StorageResult<Self> {
        let existing = read_complete_lines(path).map_err(|e| StorageError::io(path, e))?;
        let header = header_line();
        let keep = match existing.first() {
            Some(first) if first.trim_end_matches('\n') == header => {
                retained_line_count(resume_cursor, first_item, existing.len())
            }
            _ => 0,
        };

        if existing.len() > keep {
            tracing::info!(
                "Discarding {} stored row(s) from {} to rewrite them",
                existing.len() - keep,
                path.display()
            );
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;

        let mut table = Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            rows_written: 0,
        };

        if keep == 0 {
            table.write_line(&header)?;
        } else {
            for line in &existing[..keep] {
                table
                    .writer
                    .write_all(line.as_bytes())
                    .map_err(|e| StorageError::io(path, e))?;
            }
            table.flush()?;
        }

        Ok(table)
    }

    /// Appends one record as a row and flushes it to disk
    pub fn append(&mut self, record: &Record) -> StorageResult<()> {
        self.write_line(&record_line(record))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Rows appended since the store was opened
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn flush(&mut self) -> StorageResult<()> {
        self.writer
            .flush()
            .map_err(|e| StorageError::io(&self.path, e))
    }

    fn write_line(&mut self, line: &str) -> StorageResult<()> {
        self.writer
            .write_all(line.as_bytes())
            .and_then(|_| self.writer.write_all(b"\n"))
            .map_err(|e| StorageError::io(&self.path, e))?;
        self.flush()
    }
}

/// Reads every line-feed terminated line of `path`, terminators included
fn read_complete_lines(path: &Path) -> io::Result<Vec<String>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    Ok(String::from_utf8_lossy(&bytes)
        .split_inclusive('\n')
        .filter(|line| line.ends_with('\n'))
        .map(str::to_string)
        .collect())
}
