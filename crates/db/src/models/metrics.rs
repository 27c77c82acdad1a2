//! Metrics snapshot model and DTOs.

use chrono::NaiveDate;
use portal_core::insights::{InsightTotals, InsightWindow};
use portal_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `metrics_snapshots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetricsSnapshot {
    pub id: DbId,
    pub customer_id: DbId,
    pub ad_account_id: String,
    pub leads: i64,
    pub ad_spend: Decimal,
    pub clicks: i64,
    pub impressions: i64,
    pub reach: i64,
    pub cpc: Option<Decimal>,
    pub cpm: Option<Decimal>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub captured_at: Timestamp,
}

/// DTO for appending a snapshot.
#[derive(Debug, Clone)]
pub struct NewSnapshot {
    pub customer_id: DbId,
    pub ad_account_id: String,
    pub totals: InsightTotals,
    pub window: InsightWindow,
}
