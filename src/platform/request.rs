//! Transport-neutral description of a platform HTTP call.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// How a platform expects its credential to be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `Authorization: <token>` (the raw key or JWT)
    Raw,
    /// `?<name>=<token>` on the URL
    QueryParam(String),
}

impl AuthStyle {
    /// Parses a config override: `bearer`, `raw` or `query:<name>`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        match value.to_ascii_lowercase().as_str() {
            "bearer" => Some(AuthStyle::Bearer),
            "raw" | "jwt" => Some(AuthStyle::Raw),
            _ => value
                .strip_prefix("query:")
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| AuthStyle::QueryParam(name.to_string())),
        }
    }
}

/// A fully-built request ready for a [`Transport`](super::transport::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            query: Vec::new(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    /// Attaches the credential according to `style`.
    pub fn authorize(self, style: &AuthStyle, token: &str) -> Self {
        match style {
            AuthStyle::Bearer => self.header("Authorization", format!("Bearer {}", token)),
            AuthStyle::Raw => self.header("Authorization", token),
            AuthStyle::QueryParam(name) => self.query(name, token),
        }
    }

    /// Looks up a header value (case-insensitive).
    #[cfg(test)]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_style_parse() {
        assert_eq!(AuthStyle::parse("Bearer"), Some(AuthStyle::Bearer));
        assert_eq!(AuthStyle::parse("raw"), Some(AuthStyle::Raw));
        assert_eq!(AuthStyle::parse("jwt"), Some(AuthStyle::Raw));
        assert_eq!(
            AuthStyle::parse("query:key"),
            Some(AuthStyle::QueryParam("key".to_string()))
        );
        assert_eq!(AuthStyle::parse("query:"), None);
        assert_eq!(AuthStyle::parse("basic"), None);
    }

    #[test]
    fn test_authorize_shapes() {
        let bearer = Request::get("https://x").authorize(&AuthStyle::Bearer, "tok");
        assert_eq!(bearer.header_value("authorization"), Some("Bearer tok"));

        let raw = Request::get("https://x").authorize(&AuthStyle::Raw, "eyJ.a.b");
        assert_eq!(raw.header_value("Authorization"), Some("eyJ.a.b"));

        let query = Request::get("https://x")
            .authorize(&AuthStyle::QueryParam("api_key".to_string()), "tok");
        assert_eq!(query.header_value("Authorization"), None);
        assert_eq!(query.query, vec![("api_key".to_string(), "tok".to_string())]);
    }

    #[test]
    fn test_raw_response_success_range() {
        let ok = RawResponse { status: 204, body: String::new() };
        let denied = RawResponse { status: 401, body: String::new() };
        assert!(ok.is_success());
        assert!(!denied.is_success());
    }
}
