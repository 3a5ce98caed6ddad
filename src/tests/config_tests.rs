//! Tests for platform and status configuration loading.

use super::*;
use tempfile::tempdir;

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load(dir.path()).unwrap();

    let ids: Vec<&str> = config.platforms.platforms.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["gaccode", "deepseek", "kimi", "siliconflow"]);
    assert_eq!(config.status.fetch.max_workers, 4);
    assert_eq!(config.status.cache_timeout.ttl_seconds(QueryKind::Usage), 60);
    assert_eq!(config.status.cache_timeout.ttl_seconds(QueryKind::Balance), 300);
    assert_eq!(config.status.multiplier_config.periods.len(), 2);
}

#[test]
fn test_platform_order_follows_file() {
    let value = serde_json::json!({
        "platforms": {
            "zeta": { "name": "Z", "platform_type": "deepseek", "api_key": "k" },
            "alpha": { "name": "A", "platform_type": "kimi", "api_key": "k" }
        }
    });
    let platforms = PlatformsConfig::from_json(value).unwrap();
    let ids: Vec<&str> = platforms.platforms.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["zeta", "alpha"]);
    assert_eq!(platforms.platforms[0].adapter_key(), "deepseek");
}

#[test]
fn test_non_string_token_is_kept_as_raw_json() {
    let value = serde_json::json!({
        "platforms": { "deepseek": { "api_key": 12345 } }
    });
    let platforms = PlatformsConfig::from_json(value).unwrap();
    let deepseek = &platforms.platforms[0];
    assert_eq!(deepseek.api_key, Some(serde_json::json!(12345)));
    assert!(!deepseek.enabled, "entries without an enabled key stay off");
    assert_eq!(deepseek.label(), "deepseek");
}

#[test]
fn test_aliases_resolve_to_platforms() {
    let platforms = PlatformsConfig::from_json(default_platforms_json()).unwrap();
    assert_eq!(platforms.get("sf").unwrap().id, "siliconflow");
    assert_eq!(platforms.get("ds").unwrap().id, "deepseek");
    assert_eq!(platforms.get("kimi").unwrap().label(), "Kimi");
    assert!(platforms.get("nope").is_none());
}

#[test]
fn test_validate_rejects_bad_values() {
    let dir = tempdir().unwrap();

    std::fs::write(
        dir.path().join(STATUS_FILE),
        r#"{ "fetch": { "max_workers": 0 } }"#,
    )
    .unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("max_workers"), "got: {}", err);

    std::fs::write(
        dir.path().join(STATUS_FILE),
        r#"{ "multiplier_config": { "timezone": "Nowhere/Land" } }"#,
    )
    .unwrap();
    assert!(Config::load(dir.path()).is_err());

    std::fs::write(dir.path().join(STATUS_FILE), "{}").unwrap();
    std::fs::write(
        dir.path().join(PLATFORMS_FILE),
        r#"{ "platforms": { "kimi": { "api_key": "k", "auth_style": "digest" } } }"#,
    )
    .unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("auth_style"), "got: {}", err);
}

#[test]
fn test_malformed_json_reports_path() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join(PLATFORMS_FILE), "{ not json").unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("platforms.json"));
}

#[test]
fn test_init_config_never_overwrites() {
    let dir = tempdir().unwrap();
    let existing = dir.path().join(STATUS_FILE);
    std::fs::write(&existing, r#"{ "show_time": false }"#).unwrap();

    let created = init_config(dir.path()).unwrap();

    assert_eq!(created, vec![dir.path().join(PLATFORMS_FILE)]);
    let status = std::fs::read_to_string(&existing).unwrap();
    assert_eq!(status, r#"{ "show_time": false }"#);

    let config = Config::load(dir.path()).unwrap();
    assert!(!config.status.show_time);
    assert_eq!(config.platforms.default_platform.as_deref(), Some("gaccode"));
}

#[test]
fn test_default_status_round_trips_through_init() {
    let dir = tempdir().unwrap();
    init_config(dir.path()).unwrap();
    let config = Config::load(dir.path()).unwrap();
    assert_eq!(config.status, StatusConfig::default());
}

#[test]
fn test_layout_and_session_cost_options() {
    let status = StatusConfig::from_json(serde_json::json!({
        "layout": "multi_line",
        "show_session_cost": false
    }))
    .unwrap();
    assert_eq!(status.layout, Layout::MultiLine);
    assert!(!status.show_session_cost);

    let defaults = StatusConfig::from_json(serde_json::json!({})).unwrap();
    assert_eq!(defaults.layout, Layout::SingleLine);
    assert!(defaults.show_session_cost);
    assert!(StatusConfig::from_json(serde_json::json!({ "layout": "diagonal" })).is_err());
}

#[test]
fn test_select_filters_by_id_or_alias() {
    let platforms = PlatformsConfig::from_json(default_platforms_json()).unwrap();
    assert_eq!(platforms.select(None).len(), 4);

    let selected = platforms.select(Some("ds"));
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, "deepseek");

    assert!(platforms.select(Some("unknown")).is_empty());
}

#[test]
fn test_only_explicitly_enabled_entries_are_enabled() {
    let value = serde_json::json!({
        "platforms": {
            "deepseek": { "api_key": "sk-a" },
            "kimi": { "api_key": "sk-b", "enabled": true },
            "glm": { "api_key": "sk-c", "enabled": false }
        }
    });
    let platforms = PlatformsConfig::from_json(value).unwrap();
    let enabled: Vec<&str> = platforms.enabled().map(|p| p.id.as_str()).collect();
    assert_eq!(enabled, vec!["kimi"]);
}

#[test]
fn test_default_platform_resolves_through_aliases() {
    let platforms = PlatformsConfig::from_json(serde_json::json!({
        "platforms": { "deepseek": { "api_key": "k", "enabled": true } },
        "default_platform": "ds",
        "aliases": { "ds": "deepseek" }
    }))
    .unwrap();
    assert_eq!(platforms.default_entry().unwrap().id, "deepseek");

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(PLATFORMS_FILE),
        r#"{ "platforms": { "kimi": { "api_key": "k" } }, "default_platform": "gaccode" }"#,
    )
    .unwrap();
    let err = Config::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("default_platform"), "got: {}", err);
}

#[test]
fn test_lock_timeout_defaults_to_cache_default() {
    assert_eq!(
        FetchSettings::default().lock_timeout(),
        crate::cache::DEFAULT_LOCK_TIMEOUT
    );
}
