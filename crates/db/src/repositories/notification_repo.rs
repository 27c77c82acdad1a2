//! Repository for the `notifications` table, including lead-alert
//! derivation from metrics snapshots.

use portal_core::lead_alert::{derive_lead_alert, LEAD_NOTIFICATION_KIND};
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::metrics::MetricsSnapshot;
use crate::models::notification::Notification;
use crate::repositories::metrics_repo::MetricsRepo;

/// Column list for `notifications` queries.
const COLUMNS: &str =
    "id, customer_id, snapshot_id, kind, message, is_read, read_at, created_at";

/// Provides notification derivation, listing, and read-state updates.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Derive a lead alert for the customer's newest snapshot.
    ///
    /// Returns `None` when the customer has fewer than two snapshots, when
    /// leads did not increase, or when the newest snapshot already produced
    /// its notification.
    pub async fn derive_for_latest(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Option<Notification>, sqlx::Error> {
        match MetricsRepo::latest(pool, customer_id).await? {
            Some(latest) => Self::derive_for_snapshot(pool, &latest).await,
            None => Ok(None),
        }
    }

    /// Derive a lead alert for `snapshot` relative to the snapshot stored
    /// just before it.
    ///
    /// At most one notification is ever stored per snapshot (unique
    /// `snapshot_id`), so repeated calls are harmless.
    pub async fn derive_for_snapshot(
        pool: &PgPool,
        snapshot: &MetricsSnapshot,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let previous = MetricsRepo::previous(pool, snapshot).await?;
        let Some(alert) = derive_lead_alert(previous.map(|p| p.leads), snapshot.leads) else {
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO notifications (customer_id, snapshot_id, kind, message) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (snapshot_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Notification>(&query)
            .bind(snapshot.customer_id)
            .bind(snapshot.id)
            .bind(LEAD_NOTIFICATION_KIND)
            .bind(&alert.message)
            .fetch_optional(pool)
            .await?;

        if let Some(ref n) = created {
            tracing::info!(
                customer_id = snapshot.customer_id,
                snapshot_id = snapshot.id,
                new_leads = alert.new_leads,
                notification_id = n.id,
                "Lead notification created"
            );
        }

        Ok(created)
    }

    /// List notifications for a customer, newest first.
    ///
    /// When `unread_only` is `true`, only notifications with `is_read = false`
    /// are returned.
    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let filter = if unread_only { "AND is_read = false" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE customer_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(customer_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a single notification as read.
    ///
    /// Returns `true` if the notification belongs to the customer. Marking
    /// an already-read notification is not an error.
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: DbId,
        customer_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND customer_id = $2",
        )
        .bind(notification_id)
        .bind(customer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark all unread notifications as read for a customer.
    ///
    /// Returns the number of notifications that were marked read.
    pub async fn mark_all_read(pool: &PgPool, customer_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET is_read = true, read_at = NOW() \
             WHERE customer_id = $1 AND is_read = false",
        )
        .bind(customer_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn unread_count(pool: &PgPool, customer_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE customer_id = $1 AND is_read = false",
        )
        .bind(customer_id)
        .fetch_one(pool)
        .await
    }
}
