//! REST client for the ads platform.
//!
//! Two endpoints are used:
//! - `GET {base}/me/adaccounts` lists the accounts behind an access token.
//! - `GET {base}/{account}/insights` returns one record per day for a date
//!   range (`time_increment=1`).
//!
//! Both return `{"data": [...], "paging": {"next": ...}}`; `next` links are
//! followed up to [`MAX_PAGES`].

use async_trait::async_trait;
use portal_core::insights::{InsightWindow, INSIGHT_FIELDS};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::AdsConfig;
use crate::{AdAccount, AdsPlatform};

/// Upper bound on followed pagination links per request.
pub const MAX_PAGES: usize = 20;

/// Platform error code for an invalid or expired OAuth access token.
const INVALID_TOKEN_CODE: i64 = 190;

const ACCOUNT_FIELDS: &str = "id,name,account_status,currency";

/// Errors from the ads platform client.
#[derive(Debug, thiserror::Error)]
pub enum AdsApiError {
    /// The platform rejected the access token; the customer must reconnect.
    #[error("Ads platform rejected the access token: {0}")]
    Auth(String),

    /// The platform returned a non-2xx status for another reason.
    #[error("Ads platform API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The request never completed (connect failure, timeout, TLS).
    #[error("Ads platform request failed: {0}")]
    Network(reqwest::Error),

    /// A 2xx response whose body could not be read.
    #[error("Ads platform returned an unreadable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for AdsApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}

/// One page of a list response.
#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

/// Error envelope: `{"error": {"message": ..., "code": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<i64>,
}

/// HTTP client for the ads platform.
pub struct AdsPlatformApi {
    client: reqwest::Client,
    base_url: String,
}

impl AdsPlatformApi {
    /// Build a client with the configured request timeout.
    pub fn new(config: &AdsConfig) -> Result<Self, AdsApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AdsApiError::Network)?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch every page of a list endpoint, starting at `first`.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        first: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, AdsApiError> {
        let mut items = Vec::new();
        let mut page: Page<T> = Self::parse_response(first.send().await?).await?;

        for fetched in 1.. {
            items.append(&mut page.data);
            let next = page.paging.and_then(|p| p.next);
            match next {
                Some(url) if fetched < MAX_PAGES => {
                    page = Self::parse_response(self.client.get(url).send().await?).await?;
                }
                Some(_) => {
                    tracing::warn!(pages = fetched, "Ads platform pagination truncated");
                    break;
                }
                None => break,
            }
        }

        Ok(items)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, classifying failures
    /// into [`AdsApiError::Auth`] or [`AdsApiError::Api`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AdsApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let envelope = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        let token_rejected = envelope
            .as_ref()
            .and_then(|e| e.error.code)
            .is_some_and(|code| code == INVALID_TOKEN_CODE);

        if status.as_u16() == 401 || status.as_u16() == 403 || token_rejected {
            let message = envelope
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(AdsApiError::Auth(message));
        }

        Err(AdsApiError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AdsApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Accounts are addressed as `act_<id>`; accept the bare numeric id too.
pub fn account_path(ad_account_id: &str) -> String {
    let id = ad_account_id.trim();
    if id.starts_with("act_") {
        id.to_string()
    } else {
        format!("act_{id}")
    }
}

#[async_trait]
impl AdsPlatform for AdsPlatformApi {
    async fn list_ad_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, AdsApiError> {
        let request = self
            .client
            .get(format!("{}/me/adaccounts", self.base_url))
            .query(&[("fields", ACCOUNT_FIELDS), ("access_token", access_token)]);
        self.fetch_all(request).await
    }

    async fn fetch_insights(
        &self,
        access_token: &str,
        ad_account_id: &str,
        window: InsightWindow,
    ) -> Result<Vec<serde_json::Value>, AdsApiError> {
        let time_range = serde_json::json!({
            "since": window.since.format("%Y-%m-%d").to_string(),
            "until": window.until.format("%Y-%m-%d").to_string(),
        })
        .to_string();
        let fields = INSIGHT_FIELDS.join(",");

        let request = self
            .client
            .get(format!("{}/{}/insights", self.base_url, account_path(ad_account_id)))
            .query(&[
                ("fields", fields.as_str()),
                ("time_range", time_range.as_str()),
                ("time_increment", "1"),
                ("access_token", access_token),
            ]);

        let records: Vec<serde_json::Value> = self.fetch_all(request).await?;
        tracing::debug!(
            ad_account_id,
            since = %window.since,
            until = %window.until,
            records = records.len(),
            "Fetched ads insights"
        );
        Ok(records)
    }
}
