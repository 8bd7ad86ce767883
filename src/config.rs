//! System configuration for the penalty pipeline.
//!
//! API endpoint constants and environment variable parsing. Every numeric
//! getter is cached on first call so a value stays consistent for the whole
//! run.

use anyhow::{Context, Result};

/// CollegeFootballData REST API base URL
pub const CFBD_API_BASE: &str = "https://api.collegefootballdata.com";

/// Default season to collect
const DEFAULT_YEAR: u16 = 2025;

/// Default last week of the regular season to fetch (weeks 1..=N)
const DEFAULT_MAX_WEEK: u8 = 15;

/// Default delay between API requests in milliseconds. The free CFBD tier is
/// rate limited; 350ms keeps a full-season fetch comfortably under it.
const DEFAULT_API_DELAY_MS: u64 = 350;

/// Default directory for cached API responses
const DEFAULT_CACHE_DIR: &str = "cache";

/// Default directory for CSV outputs
const DEFAULT_OUTPUT_DIR: &str = "out";

/// The CFBD API bearer token. Required; there is no unauthenticated access.
pub fn api_key() -> Result<String> {
    std::env::var("CFBD_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .context("CFBD_API_KEY is not set; get a free key at collegefootballdata.com")
}

/// Season year to collect, from CFBD_YEAR. Cached after first call.
pub fn season_year() -> u16 {
    use std::sync::OnceLock;
    use tracing::warn;

    static CACHED: OnceLock<u16> = OnceLock::new();
    *CACHED.get_or_init(|| {
        if let Ok(val_str) = std::env::var("CFBD_YEAR") {
            if let Ok(year) = val_str.parse::<u16>() {
                if (1900..=2100).contains(&year) {
                    return year;
                }
                warn!(
                    "Invalid CFBD_YEAR={} (must be 1900-2100), using default {}",
                    year, DEFAULT_YEAR
                );
            } else {
                warn!(
                    "Failed to parse CFBD_YEAR='{}', using default {}",
                    val_str, DEFAULT_YEAR
                );
            }
        }
        DEFAULT_YEAR
    })
}

/// Last week to fetch (inclusive), from CFBD_MAX_WEEK. Cached after first call.
pub fn max_week() -> u8 {
    use std::sync::OnceLock;
    use tracing::warn;

    static CACHED: OnceLock<u8> = OnceLock::new();
    *CACHED.get_or_init(|| {
        if let Ok(val_str) = std::env::var("CFBD_MAX_WEEK") {
            if let Ok(week) = val_str.parse::<u8>() {
                if (1..=20).contains(&week) {
                    return week;
                }
                warn!(
                    "Invalid CFBD_MAX_WEEK={} (must be 1-20), using default {}",
                    week, DEFAULT_MAX_WEEK
                );
            } else {
                warn!(
                    "Failed to parse CFBD_MAX_WEEK='{}', using default {}",
                    val_str, DEFAULT_MAX_WEEK
                );
            }
        }
        DEFAULT_MAX_WEEK
    })
}

/// Delay between API requests, from CFBD_API_DELAY_MS. Cached after first call.
pub fn api_delay_ms() -> u64 {
    use std::sync::OnceLock;
    use tracing::warn;

    static CACHED: OnceLock<u64> = OnceLock::new();
    *CACHED.get_or_init(|| {
        if let Ok(val_str) = std::env::var("CFBD_API_DELAY_MS") {
            if let Ok(ms) = val_str.parse::<u64>() {
                return ms;
            }
            warn!(
                "Failed to parse CFBD_API_DELAY_MS='{}', using default {}",
                val_str, DEFAULT_API_DELAY_MS
            );
        }
        DEFAULT_API_DELAY_MS
    })
}

/// Directory for cached API responses, from CFBD_CACHE_DIR.
pub fn cache_dir() -> String {
    std::env::var("CFBD_CACHE_DIR").unwrap_or_else(|_| DEFAULT_CACHE_DIR.to_string())
}

/// Directory for CSV outputs, from OUTPUT_DIR.
pub fn output_dir() -> String {
    std::env::var("OUTPUT_DIR").unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string())
}

/// File name prefix shared by all outputs for a season.
pub fn output_prefix(year: u16) -> String {
    format!("penalties_{}_FBS", year)
}
