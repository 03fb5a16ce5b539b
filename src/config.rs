// Cache configuration.
// Serde-loadable settings and a builder for constructing a FileCache.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_EXTENSION, DEFAULT_TTL_MINUTES, Encoding, FileCache};
use crate::clock::Clock;

/// Settings for a [`FileCache`], suitable for embedding in an application's config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCacheConfig {
    /// Directory holding the entry files. Must exist before the first write.
    pub directory: PathBuf,
    /// Extension appended to every entry file name.
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub encoding: Encoding,
    /// Lifetime used by `set_default`.
    #[serde(default = "default_ttl_minutes")]
    pub default_ttl_minutes: u32,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_ttl_minutes() -> u32 {
    DEFAULT_TTL_MINUTES
}

impl FileCacheConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            extension: default_extension(),
            encoding: Encoding::default(),
            default_ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }

    pub fn build(&self) -> FileCache {
        FileCache::new(&self.directory, &self.extension)
            .with_encoding(self.encoding)
            .with_default_ttl(self.default_ttl_minutes)
    }
}

impl From<FileCacheConfig> for FileCache {
    fn from(config: FileCacheConfig) -> Self {
        config.build()
    }
}

/// Fluent construction of a [`FileCache`].
#[derive(Debug)]
pub struct FileCacheBuilder {
    config: FileCacheConfig,
    clock: Option<Arc<dyn Clock>>,
}

impl FileCacheBuilder {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            config: FileCacheConfig::new(directory),
            clock: None,
        }
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.config.encoding = encoding;
        self
    }

    pub fn default_ttl_minutes(mut self, ttl_minutes: u32) -> Self {
        self.config.default_ttl_minutes = ttl_minutes;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> FileCache {
        let cache = self.config.build();
        match self.clock {
            Some(clock) => cache.with_shared_clock(clock),
            None => cache,
        }
    }
}

impl FileCache {
    pub fn builder(directory: impl Into<PathBuf>) -> FileCacheBuilder {
        FileCacheBuilder::new(directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: FileCacheConfig = serde_json::from_str(r#"{"directory":"/tmp/cache"}"#).unwrap();

        assert_eq!(config, FileCacheConfig::new("/tmp/cache"));
        assert_eq!(config.extension, "cache");
        assert_eq!(config.encoding, Encoding::Structured);
        assert_eq!(config.default_ttl_minutes, 300);
    }

    #[test]
    fn test_config_accepts_encoding_aliases() {
        let config: FileCacheConfig = serde_json::from_str(
            r#"{"directory":"/tmp/cache","extension":"json","encoding":"document","default_ttl_minutes":30}"#,
        )
        .unwrap();

        let cache = config.build();
        assert_eq!(cache.encoding(), Encoding::Raw);
        assert_eq!(cache.extension(), "json");
        assert_eq!(cache.default_ttl_minutes(), 30);
    }

    #[test]
    fn test_builder() {
        let cache = FileCache::builder("/tmp/cache")
            .extension("txt")
            .encoding(Encoding::Json)
            .default_ttl_minutes(1)
            .build();

        assert_eq!(cache.path_for("a"), PathBuf::from("/tmp/cache/a.txt"));
        assert_eq!(cache.encoding(), Encoding::Json);
        assert_eq!(cache.default_ttl_minutes(), 1);
    }
}
