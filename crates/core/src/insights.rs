//! Aggregation of raw ads-platform insight records.
//!
//! The platform returns one JSON object per day. Numeric fields may arrive
//! as JSON numbers or as strings (`"spend": "5.50"`), and any field may be
//! missing. Aggregation never fails: a value that cannot be read as a number
//! counts as zero and the remaining records are still summed.

use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

/// Trailing window, in days, used when fetching insights.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// `action_type` that counts as a lead.
pub const LEAD_ACTION_TYPE: &str = "lead";

/// Fields requested from the insights endpoint.
pub const INSIGHT_FIELDS: &[&str] = &[
    "impressions",
    "clicks",
    "spend",
    "reach",
    "cpc",
    "cpm",
    "actions",
];

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Inclusive date range for an insights request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsightWindow {
    pub since: NaiveDate,
    pub until: NaiveDate,
}

impl InsightWindow {
    /// The `days`-long window ending on `until`, both ends inclusive.
    /// Anything below one day yields the single day `until`.
    pub fn trailing(until: NaiveDate, days: i64) -> Self {
        Self {
            since: until - Duration::days(days.max(1) - 1),
            until,
        }
    }
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// Window totals produced by [`aggregate_insights`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsightTotals {
    pub impressions: i64,
    pub clicks: i64,
    pub reach: i64,
    pub spend: Decimal,
    pub leads: i64,
    /// Spend per click over the window; `None` without clicks.
    pub cpc: Option<Decimal>,
    /// Spend per thousand impressions over the window; `None` without impressions.
    pub cpm: Option<Decimal>,
    /// Number of daily records that went into the totals.
    pub records: usize,
}

/// Sum a series of daily insight records.
///
/// `cpc` and `cpm` are derived from the window totals rather than taken
/// from any single day, so they are the spend-weighted averages.
///
/// A record value that would overflow its running total is dropped with a
/// warning; a ratio that overflows is left as `None`.
pub fn aggregate_insights(records: &[Value]) -> InsightTotals {
    let mut totals = InsightTotals {
        records: records.len(),
        ..Default::default()
    };

    for record in records {
        add_count(&mut totals.impressions, count_field(record, "impressions"), "impressions");
        add_count(&mut totals.clicks, count_field(record, "clicks"), "clicks");
        add_count(&mut totals.reach, count_field(record, "reach"), "reach");
        add_count(&mut totals.leads, lead_count(record), "leads");

        let spend = record.get("spend").map(coerce_amount).unwrap_or_default();
        match totals.spend.checked_add(spend) {
            Some(sum) => totals.spend = sum,
            None => tracing::warn!(%spend, "Spend overflows window total, record value ignored"),
        }
    }

    if totals.clicks > 0 {
        totals.cpc = totals
            .spend
            .checked_div(Decimal::from(totals.clicks))
            .map(|cpc| cpc.round_dp(2));
    }
    if totals.impressions > 0 {
        totals.cpm = totals
            .spend
            .checked_mul(Decimal::ONE_THOUSAND)
            .and_then(|scaled| scaled.checked_div(Decimal::from(totals.impressions)))
            .map(|cpm| cpm.round_dp(2));
        if totals.cpm.is_none() {
            tracing::warn!(spend = %totals.spend, "cpm overflows, left empty");
        }
    }

    totals
}

fn add_count(total: &mut i64, value: i64, field: &'static str) {
    match total.checked_add(value) {
        Some(sum) => *total = sum,
        None => tracing::warn!(field, value, "Count overflows window total, record value ignored"),
    }
}

/// Sum of `value` over the record's `actions` whose `action_type` is a lead.
/// Saturates at `i64::MAX`.
pub fn lead_count(record: &Value) -> i64 {
    let Some(actions) = record.get("actions").and_then(Value::as_array) else {
        return 0;
    };
    actions
        .iter()
        .filter(|a| a.get("action_type").and_then(Value::as_str) == Some(LEAD_ACTION_TYPE))
        .map(|a| a.get("value").map(coerce_count).unwrap_or(0))
        .fold(0i64, i64::saturating_add)
}

fn count_field(record: &Value, field: &str) -> i64 {
    record.get(field).map(coerce_count).unwrap_or(0)
}

/// Read an integer count from a JSON number or numeric string. Fractions are
/// truncated; anything unreadable is zero.
pub fn coerce_count(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => Decimal::from_str(s.trim())
            .ok()
            .and_then(|d| d.trunc().to_i64())
            .unwrap_or(0),
        _ => 0,
    }
}

/// Read a monetary amount from a JSON number or numeric string; anything
/// unreadable is zero.
pub fn coerce_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Decimal::from(i),
            None => Decimal::from_str(&n.to_string()).unwrap_or_default(),
        },
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
