// File-backed cache with per-entry expiration.
// Values are stored under named files and served until their expiry passes.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;

pub use cache::{
    CacheEntry, DEFAULT_EXTENSION, DEFAULT_TTL_MINUTES, DeleteOutcome, Encoding, FileCache,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{FileCacheBuilder, FileCacheConfig};
pub use error::{CacheError, Result};
