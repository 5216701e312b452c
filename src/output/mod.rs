//! Output module for persisting harvested records
//!
//! This module handles:
//! - The tabular store, one row per record in item order
//! - The optional one-file-per-record mirror
//! - Run summaries

mod mirror;
mod record;
mod summary;
mod table;

pub use mirror::{digit_width, mirror_file_name, sanitize_file_name, MirrorWriter};
pub use record::{Record, FIELD_LABELS};
pub use summary::{print_summary, RunSummary};
pub use table::{escape_field, header_line, record_line, retained_line_count, TableWriter};

use crate::config::OutputConfig;
use crate::storage::StorageResult;

/// Destination of every harvested record
///
/// The sink never reorders or deduplicates rows; callers append in item order.
#[derive(Debug)]
pub struct ResultSink {
    table: TableWriter,
    mirror: Option<MirrorWriter>,
}

impl ResultSink {
    /// Opens the tabular store (and mirror, if enabled) for a run
    ///
    /// # Arguments
    ///
    /// * `config` - Output locations
    /// * `total_count` - Remote item total, which fixes the mirror index width
    /// * `resume_cursor` - Cursor loaded at startup
    /// * `first_item` - First item index this run will append
    pub fn open(
        config: &OutputConfig,
        total_count: u64,
        resume_cursor: u64,
        first_item: u64,
    ) -> StorageResult<Self> {
        let table = TableWriter::open(&config.table_path(), resume_cursor, first_item)?;
        let mirror = config
            .mirror_records
            .then(|| MirrorWriter::new(&config.data_dir, total_count));

        Ok(Self { table, mirror })
    }

    /// Appends one record to the tabular store
    pub fn append_record(&mut self, record: &Record) -> StorageResult<()> {
        self.table.append(record)
    }

    /// Writes the mirror file of one record; a no-op when mirroring is off
    pub fn mirror_record(&self, index: u64, record: &Record) -> StorageResult<()> {
        if let Some(mirror) = &self.mirror {
            let path = mirror.write(index, record)?;
            tracing::trace!("Mirrored item {} to {}", index, path.display());
        }
        Ok(())
    }

    /// Rows appended during this run
    pub fn rows_written(&self) -> u64 {
        self.table.rows_written()
    }

    /// Flushes and closes the sink
    pub fn finish(mut self) -> StorageResult<()> {
        self.table.flush()
    }
}
