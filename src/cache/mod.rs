// Cache module for file-backed entries with expiration.
// Entries live one per file under a caller-owned directory.

pub mod encoding;
pub mod entry;
pub mod paths;
pub mod store;

pub use encoding::Encoding;
pub use entry::{CacheEntry, TIMESTAMP_FORMAT};
pub use paths::DEFAULT_EXTENSION;
pub use store::{DEFAULT_TTL_MINUTES, DeleteOutcome, FileCache};
