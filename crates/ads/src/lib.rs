//! Client for the external ads platform.
//!
//! [`AdsPlatform`] is the seam the rest of the system depends on; the
//! production implementation is [`AdsPlatformApi`], a thin `reqwest` wrapper
//! around the platform's Graph-style REST endpoints.

pub mod api;
pub mod config;

use async_trait::async_trait;
use portal_core::insights::InsightWindow;
use serde::{Deserialize, Serialize};

pub use api::{AdsApiError, AdsPlatformApi};
pub use config::AdsConfig;

/// An ad account reachable with a customer's access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdAccount {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_status: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Operations consumed from the ads platform.
#[async_trait]
pub trait AdsPlatform: Send + Sync {
    /// List the ad accounts the access token can read.
    async fn list_ad_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, AdsApiError>;

    /// Fetch the daily insight records of one ad account over `window`.
    ///
    /// Records are returned raw; aggregation happens in
    /// [`portal_core::insights::aggregate_insights`].
    async fn fetch_insights(
        &self,
        access_token: &str,
        ad_account_id: &str,
        window: InsightWindow,
    ) -> Result<Vec<serde_json::Value>, AdsApiError>;
}
