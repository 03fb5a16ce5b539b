// Cache path utilities.
// Maps entry names onto files directly under the cache directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Default file extension for entry files.
pub const DEFAULT_EXTENSION: &str = "cache";

/// Per-user cache directory for an application (~/.cache/<app> on Linux).
pub fn app_cache_dir(app: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", app).map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the entry file `{base}/{name}.{extension}`.
pub fn entry_path(base: &Path, name: &str, extension: &str) -> PathBuf {
    base.join(entry_file_name(name, extension))
}

/// File name for an entry.
pub fn entry_file_name(name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        sanitize_name(name)
    } else {
        format!("{}.{}", sanitize_name(name), extension)
    }
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
pub fn sanitize_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            _ => c,
        })
        .collect();

    // "." and ".." would resolve outside the entry namespace
    match sanitized.as_str() {
        "" | "." | ".." => sanitized.replace('.', "_") + "_",
        _ => sanitized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("simple"), "simple");
        assert_eq!(sanitize_name("with/slash"), "with_slash");
        assert_eq!(sanitize_name("user:1"), "user_1");
        assert_eq!(sanitize_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_name(".."), "___");
        assert_eq!(sanitize_name(""), "_");
    }

    #[test]
    fn test_entry_path() {
        let base = Path::new("/tmp/cache");

        assert_eq!(
            entry_path(base, "user:1", DEFAULT_EXTENSION),
            PathBuf::from("/tmp/cache/user_1.cache")
        );
        assert_eq!(
            entry_path(base, "report", ".json"),
            PathBuf::from("/tmp/cache/report.json")
        );
        assert_eq!(entry_path(base, "bare", ""), PathBuf::from("/tmp/cache/bare"));
    }

    #[test]
    fn test_entry_stays_in_base_dir() {
        let base = Path::new("/tmp/cache");
        let path = entry_path(base, "../../escape", DEFAULT_EXTENSION);

        assert_eq!(path.parent(), Some(base));
    }
}
