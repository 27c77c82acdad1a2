use std::time::Duration;

use portal_core::insights::DEFAULT_WINDOW_DAYS;

/// Ads platform client configuration loaded from environment variables.
///
/// | Env var                    | Default                              |
/// |----------------------------|--------------------------------------|
/// | `ADS_API_BASE_URL`         | `https://graph.facebook.com/v19.0`   |
/// | `ADS_API_TIMEOUT_SECS`     | `15`                                 |
/// | `ADS_INSIGHTS_WINDOW_DAYS` | `30`                                 |
#[derive(Debug, Clone)]
pub struct AdsConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Length of the trailing insights window in days.
    pub window_days: i64,
}

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com/v19.0";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl AdsConfig {
    /// Load from environment variables, falling back to the defaults above
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let base_url = std::env::var("ADS_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs: u64 = std::env::var("ADS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let window_days: i64 = std::env::var("ADS_INSIGHTS_WINDOW_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_WINDOW_DAYS);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            window_days,
        }
    }
}
