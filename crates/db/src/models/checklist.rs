//! Onboarding checklist submission model.

use portal_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `checklist_submissions` table.
///
/// Nested sections are stored as JSONB in the shape of the corresponding
/// `portal_core::checklist` structs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChecklistSubmission {
    pub id: DbId,
    pub customer_id: DbId,
    pub payment_option: String,
    pub tax_id: String,
    pub domain: String,
    pub target_audience: String,
    pub company_info: String,
    pub web_design: serde_json::Value,
    pub market_research: serde_json::Value,
    pub legal_info: serde_json::Value,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}
