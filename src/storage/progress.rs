//! Resume cursor persistence
//!
//! The cursor is a single line, `Current Project Index: <n>`, naming the last
//! item index that was fetched, parsed, and persisted. The file is held open
//! for the whole run and rewritten in place after every item.

use crate::storage::{StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Text preceding the cursor value in the progress file
pub const CURSOR_PREFIX: &str = "Current Project Index: ";

/// Parses the first line of a progress file
///
/// Anything that does not read as `Current Project Index: <non-negative int>`
/// yields 0, i.e. "start from the beginning".
pub fn parse_cursor_line(content: &str) -> u64 {
    content
        .lines()
        .next()
        .and_then(|line| line.strip_prefix(CURSOR_PREFIX))
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Durable single-integer resume cursor
#[derive(Debug)]
pub struct ProgressStore {
    path: PathBuf,
    file: File,
    cursor: u64,
}

impl ProgressStore {
    /// Opens (creating if needed) the progress file and loads the cursor
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StorageError::io(path, e))?;

        let mut content = String::new();
        let cursor = match file.read_to_string(&mut content) {
            Ok(_) => parse_cursor_line(&content),
            // A torn write can leave invalid UTF-8 behind
            Err(e) if e.kind() == io::ErrorKind::InvalidData => 0,
            Err(e) => return Err(StorageError::io(path, e)),
        };

        tracing::debug!("Loaded resume cursor {} from {}", cursor, path.display());

        Ok(Self {
            path: path.to_path_buf(),
            file,
            cursor,
        })
    }

    /// Reads the cursor without opening the file for writing
    ///
    /// A missing or unreadable file reads as 0.
    pub fn peek(path: &Path) -> u64 {
        std::fs::read_to_string(path)
            .map(|content| parse_cursor_line(&content))
            .unwrap_or(0)
    }

    /// Returns the cursor as last loaded or saved
    pub fn load(&self) -> u64 {
        self.cursor
    }

    /// Overwrites the persisted cursor
    pub fn save(&mut self, cursor: u64) -> StorageResult<()> {
        self.overwrite(cursor)
            .map_err(|e| StorageError::io(&self.path, e))?;
        self.cursor = cursor;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn overwrite(&mut self, cursor: u64) -> io::Result<()> {
        self.file.set_len(0)?;
        self.file.seek(SeekFrom::Start(0))?;
        self.file
            .write_all(format!("{CURSOR_PREFIX}{cursor}").as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()
    }
}
