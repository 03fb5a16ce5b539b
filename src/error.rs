// Error types for the file cache.
// Every failure an operation can hit, from a missing directory to an expired entry.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache directory does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),

    #[error("Failed to write cache file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode cache entry: {0}")]
    Encode(String),

    #[error("Cache file does not exist: {}", .0.display())]
    FileMissing(PathBuf),

    #[error("Failed to read cache file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete cache file {}: {source}", path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to decode cache file: {0}")]
    Decode(String),

    #[error("Cache entry expired at {expires_in}")]
    Expired { expires_in: NaiveDateTime },

    #[error("Unknown cache encoding: {0}")]
    UnknownEncoding(String),

    #[error("Invalid cache content: {0}")]
    InvalidContent(String),
}

impl CacheError {
    /// Whether this error is an ordinary cache miss rather than a fault.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::FileMissing(_) | CacheError::Expired { .. })
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
