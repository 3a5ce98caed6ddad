//! Zhipu GLM balance via the Anthropic-compatible gateway. Authenticates with
//! the raw key rather than a bearer token.

use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{BalanceRecord, NormalizedRecord};
use serde_json::Value;

pub const BALANCE_URL: &str = "https://open.bigmodel.cn/api/anthropic/user/balance";

pub fn build(_config: &PlatformConfig) -> Result<Request, String> {
    Ok(Request::get(BALANCE_URL))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let amount = parse::decimal(&body["balance"])
        .or_else(|| parse::decimal(&body["data"]["balance"]))
        .ok_or("missing numeric `balance`")?;

    Ok(NormalizedRecord::Balance(BalanceRecord {
        amount,
        currency: parse::text(&body["currency"]).unwrap_or_else(|| "CNY".to_string()),
        limit: None,
        available: body["is_available"].as_bool().unwrap_or(true),
    }))
}
