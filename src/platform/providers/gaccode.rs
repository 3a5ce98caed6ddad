//! GAC Code relay: point balance under the configured relay base URL.

use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{BalanceRecord, NormalizedRecord};
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://relay05.gaccode.com/claudecode";

pub fn build(config: &PlatformConfig) -> Result<Request, String> {
    let base = config
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/');
    Ok(Request::get(format!("{}/api/balance", base)))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let amount = parse::decimal(&body["balance"]).ok_or("missing numeric `balance`")?;
    Ok(NormalizedRecord::Balance(BalanceRecord {
        amount,
        currency: "points".to_string(),
        limit: parse::decimal(&body["limit"]),
        available: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_url_uses_configured_base_without_double_slash() {
        let config = PlatformConfig {
            base_url: Some("https://relay09.gaccode.com/claudecode/".to_string()),
            ..PlatformConfig::default()
        };
        let request = build(&config).unwrap();
        assert_eq!(request.url, "https://relay09.gaccode.com/claudecode/api/balance");

        let default = build(&PlatformConfig::default()).unwrap();
        assert_eq!(default.url, format!("{}/api/balance", DEFAULT_BASE_URL));
    }

    #[test]
    fn test_parse_points_balance() {
        let record = parse(&json!({ "balance": 1520, "limit": "5000" })).unwrap();
        let NormalizedRecord::Balance(balance) = record else {
            panic!("expected balance");
        };
        assert_eq!(balance.amount, Decimal::from(1520));
        assert_eq!(balance.limit, Some(Decimal::from(5000)));
        assert_eq!(balance.currency, "points");
    }

    #[test]
    fn test_parse_requires_balance() {
        assert!(parse(&json!({ "limit": 10 })).is_err());
    }
}
