//! Repository for the append-only `metrics_snapshots` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::metrics::{MetricsSnapshot, NewSnapshot};
use crate::repositories::customer_repo::CustomerRepo;

/// Column list for `metrics_snapshots` queries.
pub(crate) const COLUMNS: &str = "\
    id, customer_id, ad_account_id, leads, ad_spend, clicks, impressions, \
    reach, cpc, cpm, window_start, window_end, captured_at";

/// Newest-first ordering shared by every snapshot query.
pub(crate) const NEWEST_FIRST: &str = "ORDER BY captured_at DESC, id DESC";

/// Provides snapshot inserts and ordered reads.
pub struct MetricsRepo;

impl MetricsRepo {
    /// Append a snapshot. Every call inserts a new row, even for a window
    /// that was already fetched.
    ///
    /// The insert runs under the customer row lock so concurrent fetches for
    /// one customer are stored one after the other. `captured_at` is read
    /// after the lock is granted, so snapshot order matches commit order.
    /// Returns `None` if the customer does not exist.
    pub async fn insert(
        pool: &PgPool,
        input: &NewSnapshot,
    ) -> Result<Option<MetricsSnapshot>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if CustomerRepo::lock(&mut tx, input.customer_id).await?.is_none() {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO metrics_snapshots \
                (customer_id, ad_account_id, leads, ad_spend, clicks, impressions, \
                 reach, cpc, cpm, window_start, window_end, captured_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, clock_timestamp()) \
             RETURNING {COLUMNS}"
        );
        let totals = &input.totals;
        let snapshot = sqlx::query_as::<_, MetricsSnapshot>(&query)
            .bind(input.customer_id)
            .bind(&input.ad_account_id)
            .bind(totals.leads)
            .bind(totals.spend)
            .bind(totals.clicks)
            .bind(totals.impressions)
            .bind(totals.reach)
            .bind(totals.cpc)
            .bind(totals.cpm)
            .bind(input.window.since)
            .bind(input.window.until)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(snapshot))
    }

    /// The customer's most recent snapshot.
    pub async fn latest(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Option<MetricsSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metrics_snapshots WHERE customer_id = $1 {NEWEST_FIRST} LIMIT 1"
        );
        sqlx::query_as::<_, MetricsSnapshot>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// The snapshot stored for the same customer immediately before `snapshot`.
    pub async fn previous(
        pool: &PgPool,
        snapshot: &MetricsSnapshot,
    ) -> Result<Option<MetricsSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metrics_snapshots \
             WHERE customer_id = $1 AND (captured_at, id) < ($2, $3) \
             {NEWEST_FIRST} LIMIT 1"
        );
        sqlx::query_as::<_, MetricsSnapshot>(&query)
            .bind(snapshot.customer_id)
            .bind(snapshot.captured_at)
            .bind(snapshot.id)
            .fetch_optional(pool)
            .await
    }

    /// Snapshot history for a customer, newest first.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MetricsSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM metrics_snapshots WHERE customer_id = $1 \
             {NEWEST_FIRST} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MetricsSnapshot>(&query)
            .bind(customer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_customer(pool: &PgPool, customer_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM metrics_snapshots WHERE customer_id = $1")
            .bind(customer_id)
            .fetch_one(pool)
            .await
    }
}
