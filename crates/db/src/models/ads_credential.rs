//! Stored ads-platform credential.

use portal_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ads_credentials` table.
///
/// The token itself is never serialized back to clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdsCredential {
    pub customer_id: DbId,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub connected_at: Timestamp,
    pub updated_at: Timestamp,
}
