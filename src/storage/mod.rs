//! Storage module for durable crawl progress
//!
//! This module handles:
//! - The resume cursor persisted between runs
//! - The error type shared by every on-disk write of the harvester

mod progress;

pub use progress::{parse_cursor_line, ProgressStore, CURSOR_PREFIX};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing on-disk state
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
