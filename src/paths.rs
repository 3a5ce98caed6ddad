//! Home-based storage paths shared by every cc-status invocation.
//!
//! Everything lives under `~/.claude/` (or `$CC_STATUS_HOME` when set):
//! - `config/` - `platforms.json` and `status.json`
//! - `cache/platform_cache.json` - cross-invocation platform cache
//! - `logs/cc-status.log` - diagnostic log

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the whole storage root.
pub const HOME_ENV: &str = "CC_STATUS_HOME";

const CLAUDE_DIR: &str = ".claude";
const CACHE_FILENAME: &str = "platform_cache.json";
const LOG_FILENAME: &str = "cc-status.log";

/// Returns the storage root: `$CC_STATUS_HOME` or `~/.claude/`.
///
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if:
/// - Home directory cannot be determined
/// - Directory creation fails
pub fn status_home_dir() -> Result<PathBuf> {
    let root = match std::env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .context("Could not determine home directory for cc-status storage")?
            .join(CLAUDE_DIR),
    };
    ensure_dir(&root)?;
    Ok(root)
}

/// Returns the config directory: `~/.claude/config/`
pub fn config_dir() -> Result<PathBuf> {
    subdir("config")
}

/// Returns the cache directory: `~/.claude/cache/`
pub fn cache_dir() -> Result<PathBuf> {
    subdir("cache")
}

/// Returns the logs directory: `~/.claude/logs/`
pub fn logs_dir() -> Result<PathBuf> {
    subdir("logs")
}

/// Returns the platform cache file: `~/.claude/cache/platform_cache.json`
pub fn platform_cache_path() -> Result<PathBuf> {
    Ok(cache_dir()?.join(CACHE_FILENAME))
}

/// Returns the log file: `~/.claude/logs/cc-status.log`
pub fn log_file_path() -> Result<PathBuf> {
    Ok(logs_dir()?.join(LOG_FILENAME))
}

/// Returns the lock file guarding `data_path`: `<data_path>.lock`
pub fn lock_path_for(data_path: &Path) -> PathBuf {
    let mut name = data_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    data_path.with_file_name(name)
}

fn subdir(name: &str) -> Result<PathBuf> {
    let dir = status_home_dir()?.join(name);
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

#[cfg(test)]
#[path = "tests/paths_tests.rs"]
mod tests;
