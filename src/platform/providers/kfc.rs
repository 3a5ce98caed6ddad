//! Kimi For Coding: request quota from the billing gateway.

use super::BROWSER_USER_AGENT;
use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{NormalizedRecord, UsageRecord};
use serde_json::{json, Value};

pub const USAGES_URL: &str =
    "https://www.kimi.com/apiv2/kimi.gateway.billing.v1.BillingService/GetUsages";

const CODING_SCOPE: &str = "FEATURE_CODING";

pub fn build(_config: &PlatformConfig) -> Result<Request, String> {
    Ok(Request::post_json(USAGES_URL, json!({ "scope": [CODING_SCOPE] }))
        .header("Accept", "*/*")
        .header("Connect-Protocol-Version", "1")
        .header("Origin", "https://www.kimi.com")
        .header("Referer", "https://www.kimi.com/membership/pricing")
        .header("X-Msh-Platform", "web")
        .header("User-Agent", BROWSER_USER_AGENT))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let detail = body["usages"]
        .as_array()
        .and_then(|usages| {
            usages
                .iter()
                .find(|usage| usage["scope"].as_str() == Some(CODING_SCOPE))
        })
        .map(|usage| &usage["detail"])
        .ok_or("no FEATURE_CODING entry in `usages`")?;

    let limit = parse::unsigned(&detail["limit"]).ok_or("missing numeric `detail.limit`")?;
    let used = parse::unsigned(&detail["used"]).unwrap_or(0);
    let remaining =
        parse::unsigned(&detail["remaining"]).unwrap_or_else(|| limit.saturating_sub(used));

    Ok(NormalizedRecord::Usage(UsageRecord {
        used,
        limit,
        remaining,
        reset_at: parse::timestamp(&detail["resetTime"]),
    }))
}
