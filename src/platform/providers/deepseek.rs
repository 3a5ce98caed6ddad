//! DeepSeek: `balance_infos` list, first entry is the account total.

use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{BalanceRecord, NormalizedRecord};
use serde_json::Value;

pub const BALANCE_URL: &str = "https://api.deepseek.com/user/balance";

pub fn build(_config: &PlatformConfig) -> Result<Request, String> {
    Ok(Request::get(BALANCE_URL).header("Accept", "application/json"))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let primary = body["balance_infos"]
        .as_array()
        .and_then(|infos| infos.first())
        .ok_or("missing or empty `balance_infos`")?;
    let amount =
        parse::decimal(&primary["total_balance"]).ok_or("missing numeric `total_balance`")?;

    Ok(NormalizedRecord::Balance(BalanceRecord {
        amount,
        currency: parse::text(&primary["currency"]).unwrap_or_else(|| "CNY".to_string()),
        limit: None,
        available: body["is_available"].as_bool().unwrap_or(true),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_parse_first_balance_info() {
        let body = json!({
            "is_available": true,
            "balance_infos": [
                { "currency": "CNY", "total_balance": "110.00", "granted_balance": "10.00" },
                { "currency": "USD", "total_balance": "3.00" }
            ]
        });
        let NormalizedRecord::Balance(balance) = parse(&body).unwrap() else {
            panic!("expected balance");
        };
        assert_eq!(balance.amount, rust_decimal::Decimal::from_str("110.00").unwrap());
        assert_eq!(balance.currency, "CNY");
        assert!(balance.available);
    }

    #[test]
    fn test_parse_reports_unavailable_account() {
        let body = json!({
            "is_available": false,
            "balance_infos": [{ "currency": "USD", "total_balance": "0.00" }]
        });
        let NormalizedRecord::Balance(balance) = parse(&body).unwrap() else {
            panic!("expected balance");
        };
        assert!(!balance.available);
    }

    #[test]
    fn test_parse_empty_infos_is_error() {
        assert!(parse(&json!({ "is_available": true, "balance_infos": [] })).is_err());
    }
}
