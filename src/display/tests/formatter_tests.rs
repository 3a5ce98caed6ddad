//! Tests for segment building and rendering, with colors off.

use super::*;
use chrono::{NaiveDate, NaiveTime, TimeZone};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;

fn now() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 3, 4, 17, 5, 9)
        .unwrap()
}

fn cny(amount: &str) -> NormalizedRecord {
    NormalizedRecord::Balance(BalanceRecord {
        amount: Decimal::from_str(amount).unwrap(),
        currency: "CNY".to_string(),
        limit: None,
        available: true,
    })
}

fn platform(id: &str, name: &str) -> PlatformConfig {
    PlatformConfig {
        id: id.to_string(),
        display_name: name.to_string(),
        enabled: true,
        ..PlatformConfig::default()
    }
}

fn results(entries: Vec<(&str, QueryKind, FetchResult)>) -> AggregateResult {
    let mut results = AggregateResult::new();
    for (id, kind, result) in entries {
        results
            .entry(id.to_string())
            .or_insert_with(BTreeMap::new)
            .insert(kind, result);
    }
    results
}

fn peak() -> MultiplierWindow {
    MultiplierWindow {
        name: "peak_hour".to_string(),
        start_time: NaiveTime::from_hms_opt(16, 30, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        multiplier: 5.0,
        display_text: "5X".to_string(),
        weekdays_only: true,
        color: Some("red".to_string()),
    }
}

#[test]
fn test_full_line_in_display_order() {
    let status = StatusConfig::default();
    let session = SessionInfo::parse(
        r#"{ "model": { "display_name": "Opus" },
             "workspace": { "current_dir": "/home/dev/cc-status" },
             "cost": { "total_cost_usd": 0.125 } }"#,
    );
    let git = GitInfo {
        branch: "main".to_string(),
        dirty: true,
    };
    let window = peak();
    let ctx = FormatContext {
        status: &status,
        session: &session,
        git: Some(&git),
        multiplier: Some(&window),
        now: now(),
        color: false,
    };
    let platforms = vec![platform("deepseek", "DeepSeek"), platform("kimi", "Kimi")];
    let results = results(vec![
        (
            "deepseek",
            QueryKind::Balance,
            FetchResult::Fresh {
                value: cny("110"),
                age: Duration::ZERO,
            },
        ),
        (
            "kimi",
            QueryKind::Balance,
            FetchResult::Unavailable {
                reason: "HTTP status 503".to_string(),
            },
        ),
    ]);

    let line = render(&ctx.segments(&platforms, &results), Layout::SingleLine);

    assert_eq!(
        line,
        "Model:Opus | Time:17:05:09 | 5X | DeepSeek:¥110.00 | Cost:$0.13 | Git:main* | Dir:cc-status"
    );
}

#[test]
fn test_stale_value_carries_age_and_skipped_is_omitted() {
    let status = StatusConfig {
        show_model: false,
        show_time: false,
        show_directory: false,
        ..StatusConfig::default()
    };
    let session = SessionInfo::default();
    let ctx = FormatContext {
        status: &status,
        session: &session,
        git: None,
        multiplier: None,
        now: now(),
        color: false,
    };
    let platforms = vec![platform("kimi", "Kimi"), platform("gaccode", "GAC")];
    let results = results(vec![
        (
            "kimi",
            QueryKind::Balance,
            FetchResult::Stale {
                value: cny("9"),
                age: Duration::from_secs(600),
            },
        ),
        ("gaccode", QueryKind::Balance, FetchResult::Skipped),
    ]);

    assert_eq!(ctx.segments(&platforms, &results), vec!["Kimi:¥9.00(10m ago)"]);
}

#[test]
fn test_platform_with_several_kinds_joins_values() {
    let status = StatusConfig {
        show_model: false,
        show_time: false,
        show_directory: false,
        ..StatusConfig::default()
    };
    let session = SessionInfo::default();
    let ctx = FormatContext {
        status: &status,
        session: &session,
        git: None,
        multiplier: None,
        now: now(),
        color: false,
    };
    let reset = Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap();
    let results = results(vec![(
        "kfc",
        QueryKind::Usage,
        FetchResult::Fresh {
            value: NormalizedRecord::Usage(UsageRecord {
                used: 120,
                limit: 500,
                remaining: 380,
                reset_at: Some(reset),
            }),
            age: Duration::ZERO,
        },
    )]);

    assert_eq!(
        ctx.segments(&[platform("kfc", "KFC")], &results),
        vec!["KFC:380/500[03-05 08:00]"]
    );
}

#[test]
fn test_hidden_balances_drop_platform_segments() {
    let status = StatusConfig {
        show_balance: false,
        show_time: false,
        show_directory: false,
        ..StatusConfig::default()
    };
    let session = SessionInfo::parse(r#"{ "model": { "id": "glm-4.6" } }"#);
    let ctx = FormatContext {
        status: &status,
        session: &session,
        git: None,
        multiplier: None,
        now: now(),
        color: false,
    };
    let results = results(vec![(
        "deepseek",
        QueryKind::Balance,
        FetchResult::Fresh {
            value: cny("1"),
            age: Duration::ZERO,
        },
    )]);

    assert_eq!(
        ctx.segments(&[platform("deepseek", "DeepSeek")], &results),
        vec!["Model:glm-4.6"]
    );
}

#[test]
fn test_balance_formats_by_currency() {
    let usd = BalanceRecord {
        amount: Decimal::from_str("1.505").unwrap(),
        currency: "USD".to_string(),
        limit: None,
        available: true,
    };
    assert_eq!(format_balance(&usd), "$1.51");

    let points = BalanceRecord {
        amount: Decimal::from(4200),
        currency: "points".to_string(),
        limit: Some(Decimal::from(10000)),
        available: true,
    };
    assert_eq!(format_balance(&points), "4200/10000");

    let eur = BalanceRecord {
        currency: "EUR".to_string(),
        ..usd
    };
    assert_eq!(format_balance(&eur), "1.51 EUR");
}

#[test]
fn test_subscription_formats() {
    let expires_on = NaiveDate::from_ymd_opt(2026, 4, 1);
    let full = SubscriptionRecord {
        plan: Some("Plus".to_string()),
        expires_on,
    };
    assert_eq!(format_subscription(&full).as_deref(), Some("Plus(04-01)"));

    let date_only = SubscriptionRecord {
        plan: Some("  ".to_string()),
        expires_on,
    };
    assert_eq!(format_subscription(&date_only).as_deref(), Some("04-01"));

    let empty = SubscriptionRecord {
        plan: None,
        expires_on: None,
    };
    assert_eq!(format_subscription(&empty), None);
}

#[test]
fn test_stale_suffix_units() {
    assert_eq!(stale_suffix(Duration::from_secs(42)), "(42s ago)");
    assert_eq!(stale_suffix(Duration::from_secs(301)), "(5m ago)");
    assert_eq!(stale_suffix(Duration::from_secs(3 * 3600 + 5)), "(3h ago)");
    assert_eq!(stale_suffix(Duration::from_secs(2 * 86_400)), "(2d ago)");
}

#[test]
fn test_render_layouts_have_no_trailing_newline() {
    let segments = vec!["Model:Opus".to_string(), "Time:17:05:09".to_string()];
    assert_eq!(render(&segments, Layout::SingleLine), "Model:Opus | Time:17:05:09");
    assert_eq!(render(&segments, Layout::MultiLine), "Model:Opus\nTime:17:05:09");
    assert_eq!(render(&[], Layout::SingleLine), "");
}

#[test]
fn test_display_time_uses_configured_zone() {
    let instant = Utc.with_ymd_and_hms(2026, 3, 4, 9, 5, 9).unwrap();
    let shanghai = display_time(instant, Some(chrono_tz::Asia::Shanghai));
    assert_eq!(shanghai.format("%H:%M:%S").to_string(), "17:05:09");
}

#[test]
fn test_non_numeric_cost_is_ignored() {
    let status = StatusConfig {
        show_model: false,
        show_time: false,
        show_directory: false,
        ..StatusConfig::default()
    };
    let session: SessionInfo = serde_json::from_value(json!({ "cost": { "total_cost_usd": "n/a" } })).unwrap();
    let ctx = FormatContext {
        status: &status,
        session: &session,
        git: None,
        multiplier: None,
        now: now(),
        color: false,
    };
    assert!(ctx.segments(&[], &AggregateResult::new()).is_empty());
}
