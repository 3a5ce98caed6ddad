//! Time-of-day billing multiplier windows.
//!
//! A window is active when the local time-of-day falls in `[start, end)`.
//! Windows whose end precedes their start wrap past midnight, and a window
//! with `start == end` is empty. The first active window in configuration
//! order wins.

use anyhow::Result;
use chrono::{DateTime, Datelike, Local, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierWindow {
    pub name: String,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub multiplier: f64,
    pub display_text: String,
    #[serde(default)]
    pub weekdays_only: bool,
    #[serde(default)]
    pub color: Option<String>,
}

impl MultiplierWindow {
    /// Whether `now` (in whatever zone it carries) falls inside this window.
    pub fn is_active<Z: TimeZone>(&self, now: &DateTime<Z>) -> bool {
        if self.weekdays_only && matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let time = now.time();
        let (start, end) = (self.start_time, self.end_time);
        if start == end {
            false
        } else if start < end {
            start <= time && time < end
        } else {
            time >= start || time < end
        }
    }
}

/// Returns the first window active at `now`.
pub fn active_multiplier<'a, Z: TimeZone>(
    now: &DateTime<Z>,
    windows: &'a [MultiplierWindow],
) -> Option<&'a MultiplierWindow> {
    windows.iter().find(|window| window.is_active(now))
}

/// Resolves the active window for a UTC instant, evaluated in `zone` or the
/// machine's local zone when none is configured.
pub fn active_in_zone<'a>(
    now: DateTime<Utc>,
    zone: Option<Tz>,
    windows: &'a [MultiplierWindow],
) -> Option<&'a MultiplierWindow> {
    match zone {
        Some(tz) => active_multiplier(&now.with_timezone(&tz), windows),
        None => active_multiplier(&now.with_timezone(&Local), windows),
    }
}

/// Parses an IANA zone name such as `Asia/Shanghai`.
pub fn parse_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Invalid multiplier timezone '{}': {}", name, e))
}

pub fn validate_windows(windows: &[MultiplierWindow]) -> Result<()> {
    for window in windows {
        if !window.multiplier.is_finite() || window.multiplier <= 0.0 {
            anyhow::bail!(
                "Multiplier window '{}' has non-positive multiplier {}",
                window.name,
                window.multiplier
            );
        }
        if window.display_text.trim().is_empty() {
            anyhow::bail!("Multiplier window '{}' has empty display_text", window.name);
        }
    }
    Ok(())
}

/// Built-in peak/off-peak windows.
pub fn default_windows() -> Vec<MultiplierWindow> {
    vec![
        MultiplierWindow {
            name: "peak_hour".to_string(),
            start_time: hm(16, 30),
            end_time: hm(18, 30),
            multiplier: 5.0,
            display_text: "5X".to_string(),
            weekdays_only: true,
            color: Some("red".to_string()),
        },
        MultiplierWindow {
            name: "off_peak".to_string(),
            start_time: hm(1, 0),
            end_time: hm(10, 0),
            multiplier: 0.8,
            display_text: "0.8X".to_string(),
            weekdays_only: false,
            color: Some("green".to_string()),
        },
    ]
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .map_err(|e| serde::de::Error::custom(format!("invalid HH:MM time '{}': {}", raw, e)))
    }
}

#[cfg(test)]
#[path = "tests/multiplier_tests.rs"]
mod tests;
