//! Blocking HTTP transport behind a trait so fetches can be exercised offline.

use super::request::{HttpMethod, RawResponse, Request};
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Failure to complete an HTTP exchange at all (no status line received).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Connect(String),
    Body(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Timeout => write!(f, "request timed out"),
            TransportError::Connect(msg) => write!(f, "connection failed: {}", msg),
            TransportError::Body(msg) => write!(f, "failed to read or encode body: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {}

/// Executes a [`Request`] and hands back whatever status/body came back.
///
/// Non-2xx statuses are returned as responses, not errors; adapters decide
/// what a status means.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &Request) -> Result<RawResponse, TransportError>;
}

/// Production transport backed by a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &Request) -> Result<RawResponse, TransportError> {
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.query {
                    builder = builder.query(name, value);
                }
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.query {
                    builder = builder.query(name, value);
                }
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => {
                        let payload = serde_json::to_string(body)
                            .map_err(|e| TransportError::Body(e.to_string()))?;
                        builder.send(payload.as_str())
                    }
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(RawResponse { status, body })
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        other => TransportError::Connect(other.to_string()),
    }
}
