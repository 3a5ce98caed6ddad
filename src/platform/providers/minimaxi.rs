//! MiniMax web console: coding-plan subscription status for a group.

use super::BROWSER_USER_AGENT;
use crate::config::PlatformConfig;
use crate::platform::parse;
use crate::platform::request::Request;
use crate::platform::types::{NormalizedRecord, SubscriptionRecord};
use chrono::NaiveDate;
use serde_json::Value;

pub const PACKAGE_URL: &str =
    "https://www.minimaxi.com/v1/api/openplatform/charge/combo/cycle_audio_resource_package";

const END_TIME_FORMAT: &str = "%m/%d/%Y";

pub fn build(config: &PlatformConfig) -> Result<Request, String> {
    let group_id = config
        .group_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or("`group_id` is required")?;

    Ok(Request::get(PACKAGE_URL)
        .query("biz_line", "2")
        .query("cycle_type", "1")
        .query("resource_package_type", "7")
        .query("GroupId", group_id)
        .header("Accept", "application/json, text/plain, */*")
        .header("Origin", "https://platform.minimaxi.com")
        .header("Referer", "https://platform.minimaxi.com/")
        .header("User-Agent", BROWSER_USER_AGENT))
}

pub fn parse(body: &Value) -> Result<NormalizedRecord, String> {
    let current = body
        .get("current_subscribe")
        .filter(|value| value.is_object())
        .ok_or("missing `current_subscribe`")?;

    let expires_on = match parse::text(&current["current_subscribe_end_time"]) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, END_TIME_FORMAT)
                .map_err(|e| format!("bad `current_subscribe_end_time`: {}", e))?,
        ),
        None => None,
    };

    Ok(NormalizedRecord::Subscription(SubscriptionRecord {
        plan: parse::text(&current["current_subscribe_title"]),
        expires_on,
    }))
}
