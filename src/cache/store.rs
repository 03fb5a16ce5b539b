// File cache store.
// Writes entries under a directory, serves them until they expire, and evicts them on read.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::encoding::{Decoded, Encoding};
use super::entry::{CacheEntry, is_expired_at};
use super::paths::{self, DEFAULT_EXTENSION};
use crate::clock::{Clock, SystemClock};
use crate::error::{CacheError, Result};

/// Default entry lifetime: 300 minutes.
pub const DEFAULT_TTL_MINUTES: u32 = 300;

/// Result of removing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Error,
}

/// A cache of named entries, one file per entry, in a single directory.
///
/// Nothing is kept in memory between calls. The plain operations (`set`,
/// `get`, `delete`, `get_or_compute`) never fail loudly: any problem becomes
/// `false`, `None` or [`DeleteOutcome::Error`] and is logged. The `try_*`
/// variants return the underlying [`CacheError`] instead.
///
/// There is no locking. A `set` or `delete` racing a `get` on the same name,
/// from another thread or process, can produce a torn read, a stale value, or
/// a miss where the expired file was already removed by someone else.
#[derive(Debug, Clone)]
pub struct FileCache {
    directory: PathBuf,
    extension: String,
    encoding: Encoding,
    default_ttl_minutes: u32,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    /// Create a cache over `directory` using `extension` for entry files.
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            extension: extension.into(),
            encoding: Encoding::default(),
            default_ttl_minutes: DEFAULT_TTL_MINUTES,
            clock: Arc::new(SystemClock),
        }
    }

    /// Cache in the per-user cache directory of `app`.
    pub fn for_app(app: &str) -> Option<Self> {
        paths::app_cache_dir(app).map(|dir| Self::new(dir, DEFAULT_EXTENSION))
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_default_ttl(mut self, ttl_minutes: u32) -> Self {
        self.default_ttl_minutes = ttl_minutes;
        self
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        self.with_shared_clock(Arc::new(clock))
    }

    pub fn with_shared_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn default_ttl_minutes(&self) -> u32 {
        self.default_ttl_minutes
    }

    /// Path of the file backing `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        paths::entry_path(&self.directory, name, &self.extension)
    }

    /// Create the cache directory if it is missing. Never called implicitly.
    pub fn ensure_directory(&self) -> Result<()> {
        fs::create_dir_all(&self.directory).map_err(|source| CacheError::Write {
            path: self.directory.clone(),
            source,
        })
    }

    /// Store `value` under `name` for `ttl_minutes`. Returns whether the write succeeded.
    pub fn set<T: Serialize + ?Sized>(&self, name: &str, value: &T, ttl_minutes: u32) -> bool {
        match self.try_set(name, value, ttl_minutes) {
            Ok(()) => true,
            Err(err) => {
                warn!(key = name, error = %err, "cache write failed");
                false
            }
        }
    }

    /// [`set`](Self::set) with the cache's default lifetime.
    pub fn set_default<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> bool {
        self.set(name, value, self.default_ttl_minutes)
    }

    pub fn try_set<T: Serialize + ?Sized>(&self, name: &str, value: &T, ttl_minutes: u32) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(CacheError::DirectoryMissing(self.directory.clone()));
        }

        let bytes = self.encoding.encode(value, self.clock.now(), ttl_minutes)?;
        let path = self.path_for(name);
        write_file(&path, &bytes).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(key = name, path = %path.display(), ttl_minutes, "cache entry written");
        Ok(())
    }

    /// Read `name`, or `None` if it is missing, expired or unreadable.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.try_get(name).map_err(|err| self.log_miss(name, &err)).ok()
    }

    pub fn try_get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.load(name)?.payload.into_value()
    }

    /// Read `name` with its timestamps. Only enveloped encodings have them.
    pub fn entry<T: DeserializeOwned>(&self, name: &str) -> Option<CacheEntry<T>> {
        self.try_entry(name).map_err(|err| self.log_miss(name, &err)).ok()
    }

    pub fn try_entry<T: DeserializeOwned>(&self, name: &str) -> Result<CacheEntry<T>> {
        let decoded = self.load(name)?;
        match (decoded.created_at, decoded.expires_in) {
            (Some(created_at), Some(expires_in)) => Ok(CacheEntry {
                created_at,
                expires_in,
                content: decoded.payload.into_value()?,
            }),
            _ => Err(CacheError::InvalidContent(
                "entry carries no timestamps".to_string(),
            )),
        }
    }

    /// Whether `name` currently holds a live entry. Evicts it if expired.
    pub fn contains(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }

    /// Remove the file backing `name`.
    pub fn delete(&self, name: &str) -> DeleteOutcome {
        match self.try_delete(name) {
            Ok(()) => DeleteOutcome::Deleted,
            Err(CacheError::FileMissing(_)) => DeleteOutcome::NotFound,
            Err(err) => {
                warn!(key = name, error = %err, "cache delete failed");
                DeleteOutcome::Error
            }
        }
    }

    pub fn try_delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        fs::remove_file(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CacheError::FileMissing(path.clone()),
            _ => CacheError::Delete {
                path: path.clone(),
                source,
            },
        })
    }

    /// Serve `name` from the cache, or run `producer`, store its result and return it.
    ///
    /// A failed store is ignored; the computed value is returned anyway.
    /// Without a producer a miss stays a miss.
    pub fn get_or_compute<T, F>(&self, name: &str, producer: Option<F>, ttl_minutes: u32) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        match producer {
            Some(producer) => Some(self.remember(name, ttl_minutes, producer)),
            None => self.get(name),
        }
    }

    /// [`get_or_compute`](Self::get_or_compute) with a producer that is always present.
    /// The producer runs at most once, and only on a miss.
    pub fn remember<T, F>(&self, name: &str, ttl_minutes: u32, producer: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(cached) = self.get(name) {
            return cached;
        }

        let value = producer();
        self.set(name, &value, ttl_minutes);
        value
    }

    // Read, decode and expiry-check an entry. Expired files are deleted here.
    fn load(&self, name: &str) -> Result<Decoded> {
        let path = self.path_for(name);
        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => CacheError::FileMissing(path.clone()),
            _ => CacheError::Read {
                path: path.clone(),
                source,
            },
        })?;

        let decoded = self.encoding.decode(&bytes)?;

        if let Some(expires_in) = decoded.expires_in {
            if is_expired_at(expires_in, self.clock.now()) {
                if let Err(err) = fs::remove_file(&path) {
                    warn!(key = name, path = %path.display(), error = %err, "failed to evict expired entry");
                }
                return Err(CacheError::Expired { expires_in });
            }
        }

        Ok(decoded)
    }

    fn log_miss(&self, name: &str, err: &CacheError) {
        if err.is_miss() {
            debug!(key = name, reason = %err, "cache miss");
        } else {
            warn!(key = name, error = %err, "cache read failed");
        }
    }
}

/// Write through a sibling temp file, replacing any existing entry.
fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
