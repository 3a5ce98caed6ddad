//! Cross-invocation TTL cache for platform query results.
//!
//! Every process reads the shared JSON file once at open and writes its new
//! entries back in one locked read-modify-write at [`CacheStore::flush`].

mod lock;
mod store;

pub use lock::CacheLock;
pub use store::{cache_key, CacheEntry, CacheStore};

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

/// Bumped when the on-disk layout changes; other versions are ignored.
pub const CACHE_FORMAT_VERSION: u64 = 1;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum CacheError {
    /// Another process held the lock for the whole timeout.
    LockTimeout { path: PathBuf, waited: Duration },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::LockTimeout { path, waited } => write!(
                f,
                "timed out after {}ms waiting for cache lock {}",
                waited.as_millis(),
                path.display()
            ),
            CacheError::Io { path, source } => {
                write!(f, "cache I/O failed on {}: {}", path.display(), source)
            }
            CacheError::Encode(e) => write!(f, "failed to encode cache: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io { source, .. } => Some(source),
            CacheError::Encode(e) => Some(e),
            CacheError::LockTimeout { .. } => None,
        }
    }
}
