//! Claude Code status line aggregating balances and quotas from API
//! relay platforms, with a shared on-disk TTL cache.

pub mod cache;
pub mod clock;
pub mod config;
pub mod display;
pub mod fetch;
pub mod logging;
pub mod multiplier;
pub mod paths;
pub mod platform;
pub mod token;

#[cfg(test)]
mod testing;
