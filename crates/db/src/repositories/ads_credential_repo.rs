//! Repository for the `ads_credentials` table.

use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::ads_credential::AdsCredential;

const COLUMNS: &str = "customer_id, access_token, connected_at, updated_at";

pub struct AdsCredentialRepo;

impl AdsCredentialRepo {
    /// Store or replace a customer's access token.
    pub async fn upsert(
        pool: &PgPool,
        customer_id: DbId,
        access_token: &str,
    ) -> Result<AdsCredential, sqlx::Error> {
        let query = format!(
            "INSERT INTO ads_credentials (customer_id, access_token) \
             VALUES ($1, $2) \
             ON CONFLICT (customer_id) DO UPDATE \
             SET access_token = EXCLUDED.access_token, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdsCredential>(&query)
            .bind(customer_id)
            .bind(access_token)
            .fetch_one(pool)
            .await
    }

    pub async fn find(pool: &PgPool, customer_id: DbId) -> Result<Option<AdsCredential>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ads_credentials WHERE customer_id = $1");
        sqlx::query_as::<_, AdsCredential>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove a customer's token. Returns `true` if one was stored.
    pub async fn delete(pool: &PgPool, customer_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ads_credentials WHERE customer_id = $1")
            .bind(customer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
