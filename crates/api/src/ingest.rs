//! Metrics ingestion: fetch insights from the ads platform, aggregate them,
//! store one snapshot, and derive the lead notification.
//!
//! Locking: the outbound HTTP call runs without any customer lock held. Only
//! the snapshot insert takes the customer row lock (inside
//! [`MetricsRepo::insert`]).
//!
//! Completion is best effort rather than transactional with the client
//! connection: handlers run [`MetricsIngestor::fetch_and_store`] in a spawned
//! task, so a client that disconnects mid-fetch does not cancel the write.

use std::sync::Arc;

use chrono::Utc;
use portal_ads::{AdsApiError, AdsPlatform};
use portal_core::insights::{aggregate_insights, InsightWindow};
use portal_core::types::DbId;
use portal_db::models::metrics::{MetricsSnapshot, NewSnapshot};
use portal_db::repositories::{AdsCredentialRepo, CustomerRepo, MetricsRepo, NotificationRepo};
use portal_db::DbPool;
use portal_events::bus::{LEAD_NOTIFICATION_CREATED, METRICS_CAPTURED};
use portal_events::{EventBus, PlatformEvent};

use crate::state::AppState;

/// Errors from a fetch-and-store cycle.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The customer has no stored ads-platform access token.
    #[error("Customer {0} has no ads platform credential")]
    MissingCredential(DbId),

    #[error("Customer {0} not found")]
    CustomerNotFound(DbId),

    #[error(transparent)]
    Ads(#[from] AdsApiError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Runs fetch-and-store cycles for one ads platform.
#[derive(Clone)]
pub struct MetricsIngestor {
    pool: DbPool,
    ads: Arc<dyn AdsPlatform>,
    event_bus: Arc<EventBus>,
    window_days: i64,
}

impl MetricsIngestor {
    pub fn new(
        pool: DbPool,
        ads: Arc<dyn AdsPlatform>,
        event_bus: Arc<EventBus>,
        window_days: i64,
    ) -> Self {
        Self {
            pool,
            ads,
            event_bus,
            window_days,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.pool.clone(),
            Arc::clone(&state.ads),
            Arc::clone(&state.event_bus),
            state.config.ads.window_days,
        )
    }

    /// Load the customer's stored access token.
    pub async fn access_token(pool: &DbPool, customer_id: DbId) -> Result<String, IngestError> {
        AdsCredentialRepo::find(pool, customer_id)
            .await?
            .map(|c| c.access_token)
            .ok_or(IngestError::MissingCredential(customer_id))
    }

    /// Fetch the trailing window of insights for `ad_account_id` and append
    /// one snapshot for the customer.
    ///
    /// An unknown customer fails before the credential lookup and before
    /// any platform call.
    ///
    /// Lead-notification derivation runs after the snapshot is committed;
    /// a failure there is logged and does not fail the fetch.
    pub async fn fetch_and_store(
        &self,
        customer_id: DbId,
        ad_account_id: &str,
    ) -> Result<MetricsSnapshot, IngestError> {
        if CustomerRepo::find_by_id(&self.pool, customer_id).await?.is_none() {
            return Err(IngestError::CustomerNotFound(customer_id));
        }
        let access_token = Self::access_token(&self.pool, customer_id).await?;
        let window = InsightWindow::trailing(Utc::now().date_naive(), self.window_days);

        let records = self
            .ads
            .fetch_insights(&access_token, ad_account_id, window)
            .await?;
        let totals = aggregate_insights(&records);

        let snapshot = MetricsRepo::insert(
            &self.pool,
            &NewSnapshot {
                customer_id,
                ad_account_id: ad_account_id.to_string(),
                totals,
                window,
            },
        )
        .await?
        .ok_or(IngestError::CustomerNotFound(customer_id))?;

        tracing::info!(
            customer_id,
            snapshot_id = snapshot.id,
            ad_account_id,
            leads = snapshot.leads,
            records = records.len(),
            "Metrics snapshot stored"
        );
        self.event_bus.publish(
            PlatformEvent::new(METRICS_CAPTURED)
                .with_customer(customer_id)
                .with_payload(serde_json::json!({
                    "snapshot_id": snapshot.id,
                    "ad_account_id": snapshot.ad_account_id,
                    "leads": snapshot.leads,
                })),
        );

        match NotificationRepo::derive_for_snapshot(&self.pool, &snapshot).await {
            Ok(Some(notification)) => {
                self.event_bus.publish(
                    PlatformEvent::new(LEAD_NOTIFICATION_CREATED)
                        .with_customer(customer_id)
                        .with_payload(serde_json::json!({
                            "notification_id": notification.id,
                            "message": notification.message,
                        })),
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    customer_id,
                    snapshot_id = snapshot.id,
                    "Lead notification derivation failed"
                );
            }
        }

        Ok(snapshot)
    }

    /// Run [`fetch_and_store`](Self::fetch_and_store) in its own task and
    /// wait for it. Dropping the returned future does not cancel the task.
    pub async fn spawn_fetch_and_store(
        &self,
        customer_id: DbId,
        ad_account_id: String,
    ) -> Result<Result<MetricsSnapshot, IngestError>, tokio::task::JoinError> {
        let ingestor = self.clone();
        tokio::spawn(async move { ingestor.fetch_and_store(customer_id, &ad_account_id).await })
            .await
    }
}
