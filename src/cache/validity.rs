//! Revalidation Module
//!
//! Decides whether an expired entry still reflects its source and may be kept.

use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

/// Key prefix marking entries backed by a file on disk.
pub const FILE_SCHEME: &str = "file://";

// == Revalidator ==
/// Checks an entry against its external source.
///
/// Called while the cache's write lock is held, from async handlers and the
/// maintenance sweep. Implementations must be cheap and must not block on
/// slow I/O; a single `stat` is about the limit.
pub trait Revalidator: Send + Sync {
    /// Returns `Ok(true)` if `entry` is still an accurate copy of `key`'s source.
    fn is_valid(&self, key: &str, entry: &CacheEntry) -> Result<bool>;
}

impl<F> Revalidator for F
where
    F: Fn(&str, &CacheEntry) -> bool + Send + Sync,
{
    fn is_valid(&self, key: &str, entry: &CacheEntry) -> Result<bool> {
        Ok(self(key, entry))
    }
}

// == File Revalidator ==
/// Revalidates `file://` keys by modification time; every other key is
/// assumed to be valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRevalidator;

impl Revalidator for FileRevalidator {
    fn is_valid(&self, key: &str, entry: &CacheEntry) -> Result<bool> {
        let Some(path) = key.strip_prefix(FILE_SCHEME) else {
            return Ok(true);
        };

        let metadata = match fs::metadata(Path::new(path)) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(err) => {
                return Err(CacheError::Internal(format!(
                    "Failed to stat {}: {}",
                    path, err
                )))
            }
        };

        let modified_ms = metadata
            .modified()
            .map_err(|err| CacheError::Internal(format!("No mtime for {}: {}", path, err)))?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Ok(modified_ms <= entry.last_modified)
    }
}
