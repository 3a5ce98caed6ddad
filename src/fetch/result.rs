use crate::platform::{ConfigurationError, NormalizedRecord, ParseError, TransportError};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Outcome for one (platform, kind) pair in one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    /// Fetched live this invocation (age zero) or read from a cache entry
    /// still within its TTL.
    Fresh { value: NormalizedRecord, age: Duration },
    /// Live fetch failed; last known value, older than its TTL.
    Stale { value: NormalizedRecord, age: Duration },
    /// Live fetch failed and nothing was cached.
    Unavailable { reason: String },
    /// Disabled, or no usable credential.
    Skipped,
}

impl FetchResult {
    pub fn value(&self) -> Option<&NormalizedRecord> {
        match self {
            FetchResult::Fresh { value, .. } | FetchResult::Stale { value, .. } => Some(value),
            FetchResult::Unavailable { .. } | FetchResult::Skipped => None,
        }
    }
}

/// Why a live query produced no record.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    Configuration(ConfigurationError),
    Transport(TransportError),
    Parse(ParseError),
    Timeout(Duration),
    /// The worker running the query panicked or was cancelled.
    Aborted(String),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Configuration(e) => write!(f, "{}", e),
            QueryError::Transport(e) => write!(f, "transport error: {}", e),
            QueryError::Parse(e) => write!(f, "parse error: {}", e),
            QueryError::Timeout(after) => write!(f, "timed out after {}ms", after.as_millis()),
            QueryError::Aborted(msg) => write!(f, "query aborted: {}", msg),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Configuration(e) => Some(e),
            QueryError::Transport(e) => Some(e),
            QueryError::Parse(e) => Some(e),
            QueryError::Timeout(_) | QueryError::Aborted(_) => None,
        }
    }
}

impl From<ConfigurationError> for QueryError {
    fn from(e: ConfigurationError) -> Self {
        QueryError::Configuration(e)
    }
}

impl From<TransportError> for QueryError {
    fn from(e: TransportError) -> Self {
        QueryError::Transport(e)
    }
}

impl From<ParseError> for QueryError {
    fn from(e: ParseError) -> Self {
        QueryError::Parse(e)
    }
}
