//! Repository for the `customers` table.

use sqlx::{PgConnection, PgPool};
use portal_core::types::DbId;

use crate::models::customer::{CreateCustomer, Customer};

/// Column list for `customers` queries.
pub(crate) const COLUMNS: &str = "\
    id, name, email, is_approved, approved_at, current_phase, \
    completed_phases, progress, onboarding_completed, created_at, updated_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Create a customer with the initial onboarding state.
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, email) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List customers, newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Mark a customer as approved. Approving twice keeps the original
    /// `approved_at`. Returns `None` if the customer does not exist.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers \
             SET is_approved = TRUE, \
                 approved_at = COALESCE(approved_at, NOW()), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a customer row for the rest of the enclosing transaction.
    ///
    /// Every read-modify-write of per-customer state goes through this lock
    /// so concurrent requests for the same customer are serialized while
    /// requests for different customers proceed independently.
    pub(crate) async fn lock(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
