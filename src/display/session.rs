//! Session JSON that Claude Code pipes to its status-line command.

use crate::platform::parse;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub model: Option<ModelInfo>,
    #[serde(default)]
    pub workspace: Option<WorkspaceInfo>,
    #[serde(default)]
    pub cost: Option<CostInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkspaceInfo {
    #[serde(default)]
    pub current_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostInfo {
    #[serde(default)]
    pub total_cost_usd: Option<Value>,
}

impl SessionInfo {
    /// Parses session JSON; empty or malformed input yields an empty session.
    pub fn parse(input: &str) -> Self {
        if input.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(input).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring malformed session JSON");
            Self::default()
        })
    }

    pub fn read_from(mut reader: impl Read) -> Self {
        let mut input = String::new();
        if let Err(e) = reader.read_to_string(&mut input) {
            tracing::warn!(error = %e, "failed to read session JSON");
            return Self::default();
        }
        Self::parse(&input)
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_ref()
            .and_then(|m| m.display_name.as_deref().or(m.id.as_deref()))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Unknown")
    }

    /// Working directory of the session, or the process's own.
    pub fn current_dir(&self) -> Option<PathBuf> {
        self.workspace
            .as_ref()
            .and_then(|w| w.current_dir.clone())
            .or_else(|| std::env::current_dir().ok())
    }

    pub fn total_cost_usd(&self) -> Option<Decimal> {
        self.cost
            .as_ref()
            .and_then(|c| c.total_cost_usd.as_ref())
            .and_then(parse::decimal)
    }
}
