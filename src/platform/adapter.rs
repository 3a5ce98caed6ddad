//! Dispatch from a platform entry to the provider that knows its API.

use super::parse;
use super::providers::{deepseek, gaccode, glm, kfc, kimi, minimaxi, siliconflow};
use super::request::{AuthStyle, RawResponse, Request};
use super::types::{NormalizedRecord, ParseError, QueryKind};
use crate::config::CredentialField::{ApiKey, AuthToken, BalanceToken, LoginToken};
use crate::config::{CredentialField, PlatformConfig};
use crate::token;
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// A platform entry that cannot produce a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub platform: String,
    pub detail: String,
}

impl ConfigurationError {
    fn new(platform: &str, detail: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            detail: detail.into(),
        }
    }
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "platform {} misconfigured: {}", self.platform, self.detail)
    }
}

impl std::error::Error for ConfigurationError {}

/// The closed set of supported platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adapter {
    GacCode,
    DeepSeek,
    Kimi,
    Glm,
    SiliconFlow,
    Minimaxi,
    Kfc,
}

impl Adapter {
    pub const ALL: [Adapter; 7] = [
        Adapter::GacCode,
        Adapter::DeepSeek,
        Adapter::Kimi,
        Adapter::Glm,
        Adapter::SiliconFlow,
        Adapter::Minimaxi,
        Adapter::Kfc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Adapter::GacCode => "gaccode",
            Adapter::DeepSeek => "deepseek",
            Adapter::Kimi => "kimi",
            Adapter::Glm => "glm",
            Adapter::SiliconFlow => "siliconflow",
            Adapter::Minimaxi => "minimaxi",
            Adapter::Kfc => "kfc",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        if key == "kimi-coding" {
            return Some(Adapter::Kfc);
        }
        Adapter::ALL.into_iter().find(|adapter| adapter.key() == key)
    }

    /// Adapter for a config entry, by `platform_type` or else by id.
    pub fn for_config(config: &PlatformConfig) -> Option<Self> {
        Self::from_key(config.adapter_key())
    }

    pub fn query_kinds(&self) -> &'static [QueryKind] {
        match self {
            Adapter::Minimaxi => &[QueryKind::Subscription],
            Adapter::Kfc => &[QueryKind::Usage],
            _ => &[QueryKind::Balance],
        }
    }

    /// Recognized credential fields, highest priority first.
    pub fn credential_fields(&self) -> &'static [CredentialField] {
        match self {
            Adapter::GacCode => &[LoginToken, ApiKey, AuthToken],
            Adapter::DeepSeek | Adapter::Kimi | Adapter::Glm | Adapter::SiliconFlow => {
                &[ApiKey, AuthToken, LoginToken]
            }
            Adapter::Minimaxi => &[LoginToken],
            Adapter::Kfc => &[BalanceToken, LoginToken],
        }
    }

    pub fn default_auth(&self) -> AuthStyle {
        match self {
            Adapter::Glm => AuthStyle::Raw,
            _ => AuthStyle::Bearer,
        }
    }

    pub fn has_credential(&self, config: &PlatformConfig) -> bool {
        token::is_valid(config, self.credential_fields())
    }

    /// Builds the authenticated request for `kind`.
    pub fn build_request(
        &self,
        config: &PlatformConfig,
        kind: QueryKind,
    ) -> Result<Request, ConfigurationError> {
        if !self.query_kinds().contains(&kind) {
            return Err(ConfigurationError::new(
                &config.id,
                format!("{} does not support {} queries", self.key(), kind),
            ));
        }

        let credential = token::usable_credential(config, self.credential_fields())
            .ok_or_else(|| ConfigurationError::new(&config.id, "no usable credential"))?;

        let auth = match config.auth_style.as_deref() {
            Some(raw) => AuthStyle::parse(raw).ok_or_else(|| {
                ConfigurationError::new(&config.id, format!("unknown auth_style '{}'", raw))
            })?,
            None => self.default_auth(),
        };

        let request = match self {
            Adapter::GacCode => gaccode::build(config),
            Adapter::DeepSeek => deepseek::build(config),
            Adapter::Kimi => kimi::build(config),
            Adapter::Glm => glm::build(config),
            Adapter::SiliconFlow => siliconflow::build(config),
            Adapter::Minimaxi => minimaxi::build(config),
            Adapter::Kfc => kfc::build(config),
        }
        .map_err(|detail| ConfigurationError::new(&config.id, detail))?;

        Ok(request.authorize(&auth, credential.token))
    }

    /// Turns a raw response into a normalized record. Non-2xx is an error.
    pub fn parse_response(
        &self,
        platform_id: &str,
        kind: QueryKind,
        raw: &RawResponse,
    ) -> Result<NormalizedRecord, ParseError> {
        if !raw.is_success() {
            return Err(ParseError::new(
                platform_id,
                kind,
                format!("HTTP status {}", raw.status),
            ));
        }

        let body =
            parse::json_body(&raw.body).map_err(|detail| ParseError::new(platform_id, kind, detail))?;
        let record = self
            .parse_body(&body)
            .map_err(|detail| ParseError::new(platform_id, kind, detail))?;

        if record.kind() != kind {
            return Err(ParseError::new(
                platform_id,
                kind,
                format!("adapter produced a {} record", record.kind()),
            ));
        }
        Ok(record)
    }

    fn parse_body(&self, body: &Value) -> Result<NormalizedRecord, String> {
        match self {
            Adapter::GacCode => gaccode::parse(body),
            Adapter::DeepSeek => deepseek::parse(body),
            Adapter::Kimi => kimi::parse(body),
            Adapter::Glm => glm::parse(body),
            Adapter::SiliconFlow => siliconflow::parse(body),
            Adapter::Minimaxi => minimaxi::parse(body),
            Adapter::Kfc => kfc::parse(body),
        }
    }
}

#[cfg(test)]
#[path = "tests/adapter_tests.rs"]
mod tests;
