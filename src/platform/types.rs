//! Normalized data types shared by every platform adapter.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Category of data requested from a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Balance,
    Usage,
    Subscription,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [QueryKind::Balance, QueryKind::Usage, QueryKind::Subscription];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Balance => "balance",
            QueryKind::Usage => "usage",
            QueryKind::Subscription => "subscription",
        }
    }
}

impl Display for QueryKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown query kind: {}", s))
    }
}

/// Account balance reported by a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub amount: Decimal,
    /// ISO currency code, or `points` for credit-based platforms.
    pub currency: String,
    /// Credit ceiling, for platforms that report one.
    #[serde(default)]
    pub limit: Option<Decimal>,
    /// False when the platform says the balance cannot be spent.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Quota counters for usage-metered platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub used: u64,
    pub limit: u64,
    pub remaining: u64,
    #[serde(default)]
    pub reset_at: Option<DateTime<Utc>>,
}

/// Package/subscription status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

/// The common record every adapter parses its response into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizedRecord {
    Balance(BalanceRecord),
    Usage(UsageRecord),
    Subscription(SubscriptionRecord),
}

impl NormalizedRecord {
    pub fn kind(&self) -> QueryKind {
        match self {
            NormalizedRecord::Balance(_) => QueryKind::Balance,
            NormalizedRecord::Usage(_) => QueryKind::Usage,
            NormalizedRecord::Subscription(_) => QueryKind::Subscription,
        }
    }
}

/// Response from a platform that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub platform: String,
    pub kind: QueryKind,
    pub detail: String,
}

impl ParseError {
    pub fn new(platform: &str, kind: QueryKind, detail: impl Into<String>) -> Self {
        Self {
            platform: platform.to_string(),
            kind,
            detail: detail.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} response: {}", self.platform, self.kind, self.detail)
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
