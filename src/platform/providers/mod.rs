//! One module per supported platform: request shape plus response parsing.
//!
//! Providers build requests without credentials; the adapter attaches auth.

pub mod deepseek;
pub mod gaccode;
pub mod glm;
pub mod kfc;
pub mod kimi;
pub mod minimaxi;
pub mod siliconflow;

/// Browser identity for the web-console endpoints that reject non-browser clients.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";
