//! SiliconFlow account info; balance lives under `data`.

use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{BalanceRecord, NormalizedRecord};
use serde_json::Value;

pub const USER_INFO_URL: &str = "https://api.siliconflow.cn/v1/user/info";

pub fn build(_config: &PlatformConfig) -> Result<Request, String> {
    Ok(Request::get(USER_INFO_URL))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let data = &body["data"];
    let amount = parse::decimal(&data["totalBalance"])
        .or_else(|| parse::decimal(&data["balance"]))
        .or_else(|| parse::decimal(&body["balance"]))
        .ok_or("missing `data.totalBalance`")?;

    Ok(NormalizedRecord::Balance(BalanceRecord {
        amount,
        currency: parse::text(&body["currency"]).unwrap_or_else(|| "CNY".to_string()),
        limit: None,
        available: body["status"].as_bool().unwrap_or(true),
    }))
}
