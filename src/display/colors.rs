//! Threshold coloring for status-line values.

use crate::platform::{BalanceRecord, UsageRecord};
use chrono::NaiveDate;
use crossterm::style::Stylize;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Yellow,
    Green,
    Blue,
    Magenta,
    Cyan,
    Plain,
}

impl Tone {
    /// Maps a configured color name; unknown names render uncolored.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "red" => Tone::Red,
            "yellow" => Tone::Yellow,
            "green" => Tone::Green,
            "blue" => Tone::Blue,
            "magenta" | "purple" => Tone::Magenta,
            "cyan" => Tone::Cyan,
            _ => Tone::Plain,
        }
    }
}

/// Wraps `text` in the tone's ANSI color when `enabled`.
pub fn paint(text: &str, tone: Tone, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    match tone {
        Tone::Red => text.red().to_string(),
        Tone::Yellow => text.yellow().to_string(),
        Tone::Green => text.green().to_string(),
        Tone::Blue => text.blue().to_string(),
        Tone::Magenta => text.magenta().to_string(),
        Tone::Cyan => text.cyan().to_string(),
        Tone::Plain => text.to_string(),
    }
}

pub fn balance_tone(balance: &BalanceRecord) -> Tone {
    if !balance.available {
        return Tone::Red;
    }
    let (red, yellow) = match balance.currency.to_ascii_uppercase().as_str() {
        "CNY" => (Decimal::from(10), Decimal::from(50)),
        "POINTS" => return points_tone(balance),
        _ => (Decimal::ONE, Decimal::from(10)),
    };
    if balance.amount <= red {
        Tone::Red
    } else if balance.amount <= yellow {
        Tone::Yellow
    } else {
        Tone::Green
    }
}

fn points_tone(balance: &BalanceRecord) -> Tone {
    match balance.limit {
        Some(limit) if limit > Decimal::ZERO => {
            let ratio = balance.amount / limit;
            if ratio <= Decimal::new(1, 1) {
                Tone::Red
            } else if ratio <= Decimal::new(3, 1) {
                Tone::Yellow
            } else {
                Tone::Green
            }
        }
        _ if balance.amount <= Decimal::ZERO => Tone::Red,
        _ => Tone::Green,
    }
}

pub fn usage_tone(usage: &UsageRecord) -> Tone {
    if usage.remaining <= 50 {
        Tone::Red
    } else if usage.remaining <= 200 {
        Tone::Yellow
    } else {
        Tone::Green
    }
}

pub fn subscription_tone(expires_on: Option<NaiveDate>, today: NaiveDate) -> Tone {
    let Some(expires_on) = expires_on else {
        return Tone::Blue;
    };
    let days_left = (expires_on - today).num_days();
    if days_left <= 3 {
        Tone::Red
    } else if days_left <= 7 {
        Tone::Yellow
    } else {
        Tone::Green
    }
}
