// # File Address Cache
//
// File-backed implementation of AddressCache, one file per key.
//
// ## Purpose
//
// Keeps the last published address for each protocol across runs, so a
// periodic invocation only talks to the DNS provider when something
// changed.
//
// ## Layout
//
// By default the entry for `key` lives at `{dir}/{key}.last`, e.g.
// `/run/ipv4.last`. Individual keys can be pointed at explicit paths. Each
// file holds the bare address text and nothing else.
//
// ## Durability
//
// - Writes go to a sibling `.tmp` file, are synced, then renamed over the
//   entry, so a crash never leaves a half-written address behind.
// - Concurrent invocations are not supported; callers serialize runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::AddressCache;

/// Suffix of cache entry files in the cache directory
const ENTRY_EXTENSION: &str = "last";

/// File-based address cache
///
/// # Example
///
/// ```rust,no_run
/// use gandi_ddns_core::cache::FileAddressCache;
/// use gandi_ddns_core::traits::AddressCache;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cache = FileAddressCache::new("/var/lib/gandi-ddns");
///
///     // Durably written to /var/lib/gandi-ddns/ipv4.last
///     cache.set("ipv4", "203.0.113.5").await?;
///
///     assert_eq!(cache.get("ipv4").await?, Some("203.0.113.5".to_string()));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileAddressCache {
    dir: PathBuf,
    overrides: HashMap<String, PathBuf>,
}

impl FileAddressCache {
    /// Create a cache storing entries under `dir`
    ///
    /// Nothing touches the filesystem until the first `get`/`set`; the
    /// directory is created on first write.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            overrides: HashMap::new(),
        }
    }

    /// Store `key` at an explicit path instead of `{dir}/{key}.last`
    pub fn with_path<P: AsRef<Path>>(mut self, key: impl Into<String>, path: P) -> Self {
        self.overrides.insert(key.into(), path.as_ref().to_path_buf());
        self
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, Error> {
        if let Some(path) = self.overrides.get(key) {
            return Ok(path.clone());
        }

        if key.is_empty() || key.starts_with('.') || key.contains(|c: char| c == '/' || c == '\\') {
            return Err(Error::invalid_input(format!(
                "Cache key '{}' is not a valid file name",
                key
            )));
        }

        Ok(self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }

    /// Write `value` to `path` via temp file + rename
    async fn write_entry(path: &Path, value: &str) -> Result<(), Error> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::cache(format!(
                    "Failed to create cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let temp_path = Self::temp_path(path);
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::cache(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(value.as_bytes()).await.map_err(|e| {
                Error::cache(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::cache(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::cache(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            ))
        })?;

        tracing::trace!("Cache entry written: {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl AddressCache for FileAddressCache {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(key)?;

        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No cache entry for {} at {}", key, path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::cache(format!(
                    "Failed to read cache file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let value = content.trim();
        if value.is_empty() {
            return Ok(None);
        }
        Ok(Some(value.to_string()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let path = self.path_for(key)?;
        Self::write_entry(&path, value).await
    }

    fn cache_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_never_written_key_is_absent() {
        let dir = tempdir().unwrap();
        let cache = FileAddressCache::new(dir.path());

        assert_eq!(cache.get("ipv4").await.unwrap(), None);
        assert_eq!(cache.get("ipv6").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_across_instances() {
        let dir = tempdir().unwrap();
        let cache = FileAddressCache::new(dir.path());

        cache.set("ipv4", "203.0.113.5").await.unwrap();
        assert_eq!(cache.get("ipv4").await.unwrap(), Some("203.0.113.5".to_string()));

        // One file per key, bare address content
        let path = dir.path().join("ipv4.last");
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "203.0.113.5");
        assert!(!dir.path().join("ipv4.last.tmp").exists());

        // Survives a "restart"
        let reopened = FileAddressCache::new(dir.path());
        assert_eq!(
            reopened.get("ipv4").await.unwrap(),
            Some("203.0.113.5".to_string())
        );
        assert_eq!(reopened.get("ipv6").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let dir = tempdir().unwrap();
        let cache = FileAddressCache::new(dir.path());

        cache.set("ipv6", "2001:db8::1").await.unwrap();
        cache.set("ipv6", "2001:db8::2").await.unwrap();

        assert_eq!(cache.get("ipv6").await.unwrap(), Some("2001:db8::2".to_string()));
    }

    #[tokio::test]
    async fn test_content_is_trimmed_and_empty_is_absent() {
        let dir = tempdir().unwrap();
        let cache = FileAddressCache::new(dir.path());

        fs::write(dir.path().join("ipv4.last"), "198.51.100.9\n").await.unwrap();
        fs::write(dir.path().join("ipv6.last"), "  \n").await.unwrap();

        assert_eq!(cache.get("ipv4").await.unwrap(), Some("198.51.100.9".to_string()));
        assert_eq!(cache.get("ipv6").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_explicit_path_override() {
        let dir = tempdir().unwrap();
        let custom = dir.path().join("nested").join("v4-address");
        let cache = FileAddressCache::new(dir.path()).with_path("ipv4", &custom);

        cache.set("ipv4", "203.0.113.5").await.unwrap();

        assert!(custom.exists());
        assert!(!dir.path().join("ipv4.last").exists());
        assert_eq!(cache.get("ipv4").await.unwrap(), Some("203.0.113.5".to_string()));
    }

    #[tokio::test]
    async fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let cache = FileAddressCache::new(dir.path().join("a").join("b"));

        cache.set("ipv4", "203.0.113.5").await.unwrap();
        assert!(dir.path().join("a").join("b").join("ipv4.last").exists());
    }

    #[tokio::test]
    async fn test_unwritable_location_is_reported() {
        let dir = tempdir().unwrap();
        // A regular file where the cache directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").await.unwrap();
        let cache = FileAddressCache::new(&blocker);

        let err = cache.set("ipv4", "203.0.113.5").await.unwrap_err();
        assert!(matches!(err, Error::Cache(_)), "unexpected error: {err}");
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let cache = FileAddressCache::new("/tmp");
        assert!(cache.path_for("../etc/passwd").is_err());
        assert!(cache.path_for("").is_err());
        assert_eq!(
            cache.path_for("ipv4").unwrap(),
            PathBuf::from("/tmp/ipv4.last")
        );
    }
}
