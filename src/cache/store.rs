use super::{CacheError, CacheLock, CACHE_FORMAT_VERSION};
use crate::paths;
use crate::platform::QueryKind;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Last successful result for one (platform, kind) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: DateTime<Utc>,
    pub ttl_seconds: u64,
}

impl<V> CacheEntry<V> {
    /// Time since the value was fetched; never negative.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.age(now) <= Duration::from_secs(self.ttl_seconds)
    }
}

/// Key under which a (platform, kind) pair is persisted.
pub fn cache_key(platform: &str, kind: QueryKind) -> String {
    format!("{}:{}", platform, kind)
}

struct Entries<V> {
    loaded: BTreeMap<String, CacheEntry<V>>,
    pending: BTreeMap<String, CacheEntry<V>>,
}

/// File-backed cache shared by every status-line process.
///
/// `get`/`put` work on the in-memory view; only `open` and `flush` touch the
/// file, and both do so under [`CacheLock`].
pub struct CacheStore<V> {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
    entries: Mutex<Entries<V>>,
}

impl<V> CacheStore<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    /// Opens the cache at `path`. Never fails: an unreadable, corrupt or
    /// locked file leaves the cache empty for this invocation.
    pub fn open(path: &Path, lock_timeout: Duration) -> Self {
        let lock_path = paths::lock_path_for(path);
        let loaded = match read_locked::<V>(path, &lock_path, lock_timeout) {
            Ok(loaded) => loaded,
            Err(e @ CacheError::LockTimeout { .. }) => {
                tracing::warn!(error = %e, "cache locked by another process, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "cache unreadable, starting empty");
                BTreeMap::new()
            }
        };
        tracing::debug!(path = %path.display(), entries = loaded.len(), "cache opened");

        Self {
            path: path.to_path_buf(),
            lock_path,
            lock_timeout,
            entries: Mutex::new(Entries {
                loaded,
                pending: BTreeMap::new(),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, platform: &str, kind: QueryKind) -> Option<CacheEntry<V>> {
        let key = cache_key(platform, kind);
        let entries = self.lock_entries();
        entries
            .pending
            .get(&key)
            .or_else(|| entries.loaded.get(&key))
            .cloned()
    }

    /// Records a fresh value. Ignored if a newer value is already held.
    pub fn put(
        &self,
        platform: &str,
        kind: QueryKind,
        value: V,
        fetched_at: DateTime<Utc>,
        ttl_seconds: u64,
    ) {
        let key = cache_key(platform, kind);
        let mut entries = self.lock_entries();
        let newest = entries
            .pending
            .get(&key)
            .or_else(|| entries.loaded.get(&key))
            .map(|entry| entry.fetched_at);
        if newest.is_some_and(|held| held > fetched_at) {
            return;
        }
        entries.pending.insert(
            key,
            CacheEntry {
                value,
                fetched_at,
                ttl_seconds,
            },
        );
    }

    /// Snapshot of every entry, pending values overriding loaded ones.
    pub fn entries(&self) -> BTreeMap<String, CacheEntry<V>> {
        let entries = self.lock_entries();
        let mut all = entries.loaded.clone();
        all.extend(entries.pending.clone());
        all
    }

    /// Merges pending entries into the file. Returns how many were written.
    ///
    /// The file is re-read under the lock so entries written by other
    /// processes since `open` survive; for a shared key the newer
    /// `fetched_at` wins.
    pub fn flush(&self) -> Result<usize, CacheError> {
        let pending = {
            let entries = self.lock_entries();
            if entries.pending.is_empty() {
                return Ok(0);
            }
            entries.pending.clone()
        };

        let _guard = CacheLock::acquire(&self.lock_path, self.lock_timeout)?;
        let mut on_disk = read_raw_entries(&self.path)?;

        let mut written = Vec::new();
        for (key, entry) in &pending {
            let disk_time = on_disk
                .get(key)
                .and_then(|raw| raw.get("fetched_at"))
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));
            if disk_time.is_some_and(|newer| newer > entry.fetched_at) {
                tracing::debug!(key = %key, "kept newer cache entry from another process");
                continue;
            }
            let raw = serde_json::to_value(entry).map_err(CacheError::Encode)?;
            on_disk.insert(key.clone(), raw);
            written.push(key.clone());
        }

        let document = json!({
            "version": CACHE_FORMAT_VERSION,
            "entries": Value::Object(on_disk),
        });
        write_atomic(&self.path, &document)?;

        let mut entries = self.lock_entries();
        for (key, entry) in pending {
            let unchanged = entries
                .pending
                .get(&key)
                .is_some_and(|current| current.fetched_at == entry.fetched_at);
            if !unchanged {
                continue;
            }
            entries.pending.remove(&key);
            if written.contains(&key) {
                entries.loaded.insert(key, entry);
            }
        }
        tracing::debug!(path = %self.path.display(), written = written.len(), "cache flushed");
        Ok(written.len())
    }

    fn lock_entries(&self) -> MutexGuard<'_, Entries<V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn read_locked<V: DeserializeOwned>(
    path: &Path,
    lock_path: &Path,
    timeout: Duration,
) -> Result<BTreeMap<String, CacheEntry<V>>, CacheError> {
    let _guard = CacheLock::acquire(lock_path, timeout)?;
    let raw = read_raw_entries(path)?;

    let mut entries = BTreeMap::new();
    for (key, value) in raw {
        match serde_json::from_value::<CacheEntry<V>>(value) {
            Ok(entry) => {
                entries.insert(key, entry);
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "skipping undecodable cache entry"),
        }
    }
    Ok(entries)
}

/// Reads the `entries` object as raw JSON. A missing, corrupt or
/// foreign-version file reads as empty.
fn read_raw_entries(path: &Path) -> Result<Map<String, Value>, CacheError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(CacheError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let document: Value = match serde_json::from_str(&content) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cache file is corrupt, ignoring it");
            return Ok(Map::new());
        }
    };

    let version = document.get("version").and_then(Value::as_u64);
    if version != Some(CACHE_FORMAT_VERSION) {
        tracing::warn!(path = %path.display(), ?version, "unsupported cache version, ignoring it");
        return Ok(Map::new());
    }

    match document.get("entries") {
        Some(Value::Object(entries)) => Ok(entries.clone()),
        _ => Ok(Map::new()),
    }
}

fn write_atomic(path: &Path, document: &Value) -> Result<(), CacheError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CacheError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(document).map_err(CacheError::Encode)?;
    let tmp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
    std::fs::write(&tmp_path, content).map_err(|source| CacheError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
