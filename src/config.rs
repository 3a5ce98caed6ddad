use crate::multiplier::{self, MultiplierWindow};
use crate::platform::{AuthStyle, QueryKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const PLATFORMS_FILE: &str = "platforms.json";
pub const STATUS_FILE: &str = "status.json";

/// Credential slots a platform entry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    LoginToken,
    AuthToken,
    ApiKey,
    BalanceToken,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::LoginToken => "login_token",
            CredentialField::AuthToken => "auth_token",
            CredentialField::ApiKey => "api_key",
            CredentialField::BalanceToken => "balance_token",
        }
    }
}

/// One entry of `platforms.json`. Immutable for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlatformConfig {
    /// Key of the entry in the `platforms` map.
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "name", default)]
    pub display_name: String,
    #[serde(rename = "api_base_url", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    // Kept as raw JSON so a non-string token is representable and rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_token: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Entries are off unless explicitly enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Adapter to use when `id` is a custom name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_type: Option<String>,
    /// `bearer`, `raw` or `query:<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_style: Option<String>,
}

impl PlatformConfig {
    pub fn credential(&self, field: CredentialField) -> Option<&Value> {
        match field {
            CredentialField::LoginToken => self.login_token.as_ref(),
            CredentialField::AuthToken => self.auth_token.as_ref(),
            CredentialField::ApiKey => self.api_key.as_ref(),
            CredentialField::BalanceToken => self.balance_token.as_ref(),
        }
    }

    /// Name shown on the status line.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }

    /// The adapter key: `platform_type` when set, otherwise the id.
    pub fn adapter_key(&self) -> &str {
        self.platform_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.id)
    }
}

fn default_true() -> bool {
    true
}

/// Parsed `platforms.json`, entries in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlatformsConfig {
    pub platforms: Vec<PlatformConfig>,
    pub default_platform: Option<String>,
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PlatformsFile {
    #[serde(default)]
    platforms: Map<String, Value>,
    #[serde(default)]
    default_platform: Option<String>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

impl PlatformsConfig {
    pub fn from_json(value: Value) -> Result<Self> {
        let file: PlatformsFile =
            serde_json::from_value(value).context("Invalid platforms configuration")?;

        let mut platforms = Vec::with_capacity(file.platforms.len());
        for (id, entry) in file.platforms {
            let mut platform: PlatformConfig = serde_json::from_value(entry)
                .with_context(|| format!("Invalid entry for platform '{}'", id))?;
            platform.id = id;
            platforms.push(platform);
        }

        Ok(Self {
            platforms,
            default_platform: file.default_platform,
            aliases: file.aliases,
        })
    }

    /// Maps an alias (`ds`, `sf`, ...) to its platform id; unknown names pass through.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn get(&self, name: &str) -> Option<&PlatformConfig> {
        let id = self.resolve_alias(name);
        self.platforms.iter().find(|p| p.id == id)
    }

    /// The entry named by `default_platform`, resolved through aliases.
    pub fn default_entry(&self) -> Option<&PlatformConfig> {
        self.default_platform.as_deref().and_then(|name| self.get(name))
    }

    pub fn enabled(&self) -> impl Iterator<Item = &PlatformConfig> {
        self.platforms.iter().filter(|p| p.enabled)
    }

    /// Platforms to query this run: all of them, or only `name` (an id or
    /// alias) when given. Unknown names select nothing.
    pub fn select(&self, name: Option<&str>) -> Vec<PlatformConfig> {
        match name {
            Some(name) => self.get(name).cloned().into_iter().collect(),
            None => self.platforms.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        for platform in &self.platforms {
            if let Some(style) = &platform.auth_style {
                if AuthStyle::parse(style).is_none() {
                    anyhow::bail!(
                        "Platform '{}' has unknown auth_style '{}' (expected bearer, raw or query:<name>)",
                        platform.id,
                        style
                    );
                }
            }
        }
        if let Some(name) = &self.default_platform {
            if self.default_entry().is_none() {
                anyhow::bail!("default_platform '{}' is not a configured platform", name);
            }
        }
        for (alias, target) in &self.aliases {
            if !self.platforms.iter().any(|p| &p.id == target) {
                anyhow::bail!("Alias '{}' points to unknown platform '{}'", alias, target);
            }
        }
        Ok(())
    }
}

/// Parsed `status.json`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatusConfig {
    #[serde(default = "default_true")]
    pub show_balance: bool,
    #[serde(default = "default_true")]
    pub show_model: bool,
    #[serde(default = "default_true")]
    pub show_git_branch: bool,
    #[serde(default = "default_true")]
    pub show_time: bool,
    #[serde(default = "default_true")]
    pub show_directory: bool,
    /// Appends the session's running cost from the host's JSON.
    #[serde(default = "default_true")]
    pub show_session_cost: bool,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub multiplier_config: MultiplierConfig,
    #[serde(default)]
    pub cache_timeout: CacheTimeouts,
    #[serde(default)]
    pub fetch: FetchSettings,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            show_balance: true,
            show_model: true,
            show_git_branch: true,
            show_time: true,
            show_directory: true,
            show_session_cost: true,
            layout: Layout::default(),
            multiplier_config: MultiplierConfig::default(),
            cache_timeout: CacheTimeouts::default(),
            fetch: FetchSettings::default(),
        }
    }
}

/// How segments are joined on output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    SingleLine,
    MultiLine,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiplierConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// IANA zone the windows are evaluated in; local time when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default = "multiplier::default_windows")]
    pub periods: Vec<MultiplierWindow>,
}

impl Default for MultiplierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: None,
            periods: multiplier::default_windows(),
        }
    }
}

/// Cache TTL per query kind, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheTimeouts {
    #[serde(default = "default_balance_ttl")]
    pub balance: u64,
    #[serde(default = "default_subscription_ttl")]
    pub subscription: u64,
    #[serde(default = "default_usage_ttl")]
    pub usage: u64,
}

impl CacheTimeouts {
    pub fn ttl_seconds(&self, kind: QueryKind) -> u64 {
        match kind {
            QueryKind::Balance => self.balance,
            QueryKind::Subscription => self.subscription,
            QueryKind::Usage => self.usage,
        }
    }
}

impl Default for CacheTimeouts {
    fn default() -> Self {
        Self {
            balance: default_balance_ttl(),
            subscription: default_subscription_ttl(),
            usage: default_usage_ttl(),
        }
    }
}

fn default_balance_ttl() -> u64 {
    300
}

fn default_subscription_ttl() -> u64 {
    300
}

fn default_usage_ttl() -> u64 {
    60
}

/// Concurrency and timeout knobs for one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FetchSettings {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl FetchSettings {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            query_timeout_ms: default_query_timeout_ms(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

fn default_max_workers() -> usize {
    4
}

fn default_query_timeout_ms() -> u64 {
    10_000
}

fn default_lock_timeout_ms() -> u64 {
    u64::try_from(crate::cache::DEFAULT_LOCK_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

impl StatusConfig {
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).context("Invalid status configuration")
    }

    pub fn zone(&self) -> Result<Option<chrono_tz::Tz>> {
        self.multiplier_config
            .timezone
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .map(multiplier::parse_zone)
            .transpose()
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.max_workers == 0 {
            anyhow::bail!("fetch.max_workers must be at least 1");
        }
        if self.fetch.query_timeout_ms == 0 {
            anyhow::bail!("fetch.query_timeout_ms must be greater than zero");
        }
        self.zone()?;
        multiplier::validate_windows(&self.multiplier_config.periods)
    }
}

/// Both configuration files, loaded from one directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub platforms: PlatformsConfig,
    pub status: StatusConfig,
}

impl Config {
    /// Loads `platforms.json` and `status.json` from `dir`. A missing file
    /// falls back to the built-in defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let platforms = match read_json(&dir.join(PLATFORMS_FILE))? {
            Some(value) => PlatformsConfig::from_json(value)?,
            None => PlatformsConfig::from_json(default_platforms_json())?,
        };
        let status = match read_json(&dir.join(STATUS_FILE))? {
            Some(value) => StatusConfig::from_json(value)?,
            None => StatusConfig::default(),
        };

        let config = Self { platforms, status };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.platforms.validate()?;
        self.status.validate()
    }
}

fn read_json(path: &Path) -> Result<Option<Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file as JSON: {}", path.display()))?;
    Ok(Some(value))
}

/// Writes default config files into `dir`, leaving existing files untouched.
/// Returns the paths that were created.
pub fn init_config(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

    let status = serde_json::to_value(StatusConfig::default())
        .context("Failed to serialize default status configuration")?;
    let defaults = [
        (PLATFORMS_FILE, default_platforms_json()),
        (STATUS_FILE, status),
    ];

    let mut created = Vec::new();
    for (name, value) in defaults {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }
        let content = serde_json::to_string_pretty(&value)
            .with_context(|| format!("Failed to serialize {}", name))?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        created.push(path);
    }
    Ok(created)
}

/// Default `platforms.json` contents: every built-in platform, no tokens.
pub fn default_platforms_json() -> Value {
    json!({
        "platforms": {
            "gaccode": {
                "name": "GAC Code",
                "api_base_url": "https://relay05.gaccode.com/claudecode",
                "login_token": "",
                "model": "claude-3-5-sonnet-20241022",
                "enabled": true
            },
            "deepseek": {
                "name": "DeepSeek",
                "api_base_url": "https://api.deepseek.com/anthropic",
                "api_key": "",
                "model": "deepseek-chat",
                "enabled": true
            },
            "kimi": {
                "name": "Kimi",
                "api_base_url": "https://api.moonshot.cn/anthropic",
                "auth_token": "",
                "model": "moonshot-v1-8k",
                "enabled": true
            },
            "siliconflow": {
                "name": "SiliconFlow",
                "api_base_url": "https://api.siliconflow.cn/",
                "api_key": "",
                "model": "deepseek-ai/DeepSeek-V3",
                "enabled": true
            }
        },
        "default_platform": "gaccode",
        "aliases": {
            "gc": "gaccode",
            "dp": "deepseek",
            "ds": "deepseek",
            "sc": "siliconflow",
            "sf": "siliconflow"
        }
    })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
