//! Turns aggregated results plus session context into status-line segments.

use super::colors::{self, paint, Tone};
use super::git::GitInfo;
use super::session::SessionInfo;
use crate::config::{Layout, PlatformConfig, StatusConfig};
use crate::fetch::{AggregateResult, FetchResult};
use crate::multiplier::MultiplierWindow;
use crate::platform::{BalanceRecord, NormalizedRecord, QueryKind, SubscriptionRecord, UsageRecord};
use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};
use std::time::Duration;

const SEPARATOR: &str = " | ";

/// Converts `now` into the display zone, or the machine's zone when unset.
pub fn display_time(now: DateTime<Utc>, zone: Option<Tz>) -> DateTime<FixedOffset> {
    match zone {
        Some(tz) => now.with_timezone(&tz).fixed_offset(),
        None => now.with_timezone(&Local).fixed_offset(),
    }
}

/// Everything a render needs besides the fetch results.
pub struct FormatContext<'a> {
    pub status: &'a StatusConfig,
    pub session: &'a SessionInfo,
    pub git: Option<&'a GitInfo>,
    pub multiplier: Option<&'a MultiplierWindow>,
    pub now: DateTime<FixedOffset>,
    pub color: bool,
}

impl FormatContext<'_> {
    /// Segments in display order. Platforms without a value are omitted.
    pub fn segments(&self, platforms: &[PlatformConfig], results: &AggregateResult) -> Vec<String> {
        let mut segments = Vec::new();

        if self.status.show_model {
            let model = format!("Model:{}", self.session.model_name());
            segments.push(paint(&model, Tone::Cyan, self.color));
        }
        if self.status.show_time {
            segments.push(format!("Time:{}", self.now.format("%H:%M:%S")));
        }
        if let Some(window) = self.multiplier {
            let tone = window
                .color
                .as_deref()
                .map(Tone::from_name)
                .unwrap_or(Tone::Yellow);
            segments.push(paint(&window.display_text, tone, self.color));
        }
        if self.status.show_balance {
            for platform in platforms {
                if let Some(by_kind) = results.get(&platform.id) {
                    if let Some(segment) = self.platform_segment(platform, by_kind) {
                        segments.push(segment);
                    }
                }
            }
        }
        if self.status.show_session_cost {
            if let Some(cost) = self.session.total_cost_usd() {
                segments.push(format!("Cost:${:.2}", round_cents(cost)));
            }
        }
        if self.status.show_git_branch {
            if let Some(git) = self.git {
                let label = format!("Git:{}", git.label());
                let tone = if git.dirty { Tone::Yellow } else { Tone::Green };
                segments.push(paint(&label, tone, self.color));
            }
        }
        if self.status.show_directory {
            let name = self
                .session
                .current_dir()
                .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()));
            if let Some(name) = name {
                segments.push(paint(&format!("Dir:{}", name), Tone::Blue, self.color));
            }
        }

        segments
    }

    fn platform_segment(
        &self,
        platform: &PlatformConfig,
        by_kind: &std::collections::BTreeMap<QueryKind, FetchResult>,
    ) -> Option<String> {
        let values: Vec<String> = by_kind
            .values()
            .filter_map(|result| {
                let text = self.format_record(result.value()?)?;
                match result {
                    FetchResult::Stale { age, .. } => Some(format!("{}{}", text, stale_suffix(*age))),
                    _ => Some(text),
                }
            })
            .collect();

        if values.is_empty() {
            return None;
        }
        Some(format!("{}:{}", platform.label(), values.join(" ")))
    }

    fn format_record(&self, record: &NormalizedRecord) -> Option<String> {
        match record {
            NormalizedRecord::Balance(balance) => Some(paint(
                &format_balance(balance),
                colors::balance_tone(balance),
                self.color,
            )),
            NormalizedRecord::Usage(usage) => Some(paint(
                &self.format_usage(usage),
                colors::usage_tone(usage),
                self.color,
            )),
            NormalizedRecord::Subscription(subscription) => {
                let text = format_subscription(subscription)?;
                let tone = colors::subscription_tone(subscription.expires_on, self.now.date_naive());
                Some(paint(&text, tone, self.color))
            }
        }
    }

    fn format_usage(&self, usage: &UsageRecord) -> String {
        let counts = format!("{}/{}", usage.remaining, usage.limit);
        match usage.reset_at {
            Some(reset) => {
                let local = reset.with_timezone(self.now.offset());
                format!("{}[{}]", counts, local.format("%m-%d %H:%M"))
            }
            None => counts,
        }
    }
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn format_balance(balance: &BalanceRecord) -> String {
    let amount = round_cents(balance.amount);
    match balance.currency.to_ascii_uppercase().as_str() {
        "CNY" => format!("¥{:.2}", amount),
        "USD" => format!("${:.2}", amount),
        "POINTS" => {
            let points = balance.amount.round_dp(0).normalize();
            match balance.limit {
                Some(limit) => format!("{}/{}", points, limit.round_dp(0).normalize()),
                None => points.to_string(),
            }
        }
        other => format!("{:.2} {}", amount, other),
    }
}

/// `Plan(MM-DD)`; either half alone when the other is missing.
pub fn format_subscription(subscription: &SubscriptionRecord) -> Option<String> {
    let plan = subscription
        .plan
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let expiry = subscription.expires_on.map(|d| d.format("%m-%d").to_string());
    match (plan, expiry) {
        (Some(plan), Some(expiry)) => Some(format!("{}({})", plan, expiry)),
        (Some(plan), None) => Some(plan.to_string()),
        (None, Some(expiry)) => Some(expiry),
        (None, None) => None,
    }
}

/// `(42s ago)`, `(5m ago)`, `(3h ago)`, `(2d ago)`.
pub fn stale_suffix(age: Duration) -> String {
    let secs = age.as_secs();
    let short = match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    };
    format!("({} ago)", short)
}

/// Joins segments for output. No trailing newline.
pub fn render(segments: &[String], layout: Layout) -> String {
    match layout {
        Layout::SingleLine => segments.join(SEPARATOR),
        Layout::MultiLine => segments.join("\n"),
    }
}

#[cfg(test)]
#[path = "tests/formatter_tests.rs"]
mod tests;
