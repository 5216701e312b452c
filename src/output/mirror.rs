//! One-file-per-record mirror
//!
//! Files are named `<zero-padded index>_<sanitized title>` and hold the
//! record's label/value rendering. Rewriting the same item overwrites the
//! same file.

use crate::output::record::Record;
use crate::storage::{StorageError, StorageResult};
use std::path::{Path, PathBuf};

const INDEX_SEPARATOR: char = '_';

/// Replaces characters that are unsafe in file names with `_`
///
/// The unsafe set is the ASCII control characters (including DEL) plus
/// `/ \ : * " < > | ?`. Every other character, Unicode included, is kept.
pub fn sanitize_file_name(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\u{00}'..='\u{1F}' | '\u{7F}' | '/' | '\\' | ':' | '*' | '"' | '<' | '>' | '|' | '?'
    )
}

/// Number of decimal digits needed to print `value`
pub fn digit_width(value: u64) -> usize {
    value.to_string().len()
}

/// File name of the mirror for item `index`
pub fn mirror_file_name(index: u64, width: usize, title: &str) -> String {
    format!(
        "{index:0width$}{INDEX_SEPARATOR}{}",
        sanitize_file_name(title)
    )
}

/// Writes mirror files into a directory
#[derive(Debug, Clone)]
pub struct MirrorWriter {
    dir: PathBuf,
    width: usize,
}

impl MirrorWriter {
    /// Creates a writer whose index width fits `total_count`
    pub fn new(dir: &Path, total_count: u64) -> Self {
        Self {
            dir: dir.to_path_buf(),
            width: digit_width(total_count),
        }
    }

    /// Writes (or overwrites) the mirror file of one record
    pub fn write(&self, index: u64, record: &Record) -> StorageResult<PathBuf> {
        let path = self
            .dir
            .join(mirror_file_name(index, self.width, &record.title));
        std::fs::write(&path, record.to_mirror_text()).map_err(|e| StorageError::io(&path, e))?;
        Ok(path)
    }
}
