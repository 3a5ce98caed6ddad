//! Moonshot (Kimi) open platform balance.

use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{BalanceRecord, NormalizedRecord};
use serde_json::Value;

pub const BALANCE_URL: &str = "https://api.moonshot.cn/v1/users/me/balance";

pub fn build(_config: &PlatformConfig) -> Result<Request, String> {
    Ok(Request::get(BALANCE_URL))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let amount = parse::decimal(&body["data"]["available_balance"])
        .or_else(|| parse::decimal(&body["balance"]))
        .ok_or("missing `data.available_balance`")?;

    Ok(NormalizedRecord::Balance(BalanceRecord {
        amount,
        currency: parse::text(&body["currency"]).unwrap_or_else(|| "CNY".to_string()),
        limit: None,
        available: body["status"].as_bool().unwrap_or(true),
    }))
}
