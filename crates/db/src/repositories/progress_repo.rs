//! Progress read/update operations on the `customers` table.
//!
//! All updates lock the customer row (`SELECT ... FOR UPDATE`), apply a pure
//! [`ProgressState`] transition from `portal_core`, and write the result in
//! the same transaction, so concurrent updates for one customer cannot
//! duplicate completed phases or regress progress.

use portal_core::phase::Phase;
use portal_core::progress::ProgressState;
use portal_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::customer::{Customer, CustomerProgress};
use crate::repositories::customer_repo::{CustomerRepo, COLUMNS};

/// Provides progress reads and phase transitions.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Read a customer's progress. Returns `None` if the customer does not exist.
    pub async fn get(pool: &PgPool, customer_id: DbId) -> Result<Option<CustomerProgress>, sqlx::Error> {
        let customer = CustomerRepo::find_by_id(pool, customer_id).await?;
        Ok(customer.as_ref().map(CustomerProgress::from))
    }

    /// Move a customer to `target`, recording the target's predecessor as
    /// completed.
    pub async fn advance_phase(
        pool: &PgPool,
        customer_id: DbId,
        target: Phase,
    ) -> Result<Option<CustomerProgress>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated =
            Self::transition(&mut tx, customer_id, false, |s| s.advance_to(target)).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Mark `phase` as completed and move the customer to the next phase.
    pub async fn complete_phase(
        pool: &PgPool,
        customer_id: DbId,
        phase: Phase,
    ) -> Result<Option<CustomerProgress>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated = Self::transition(&mut tx, customer_id, false, |s| s.complete(phase)).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Lock the customer row, apply `f` to its progress, and write the result.
    ///
    /// Runs on the caller's connection so it can join a larger transaction.
    /// When `mark_onboarding_completed` is set the flag is turned on as part
    /// of the same write; it is never turned off.
    pub(crate) async fn transition<F>(
        conn: &mut PgConnection,
        customer_id: DbId,
        mark_onboarding_completed: bool,
        f: F,
    ) -> Result<Option<CustomerProgress>, sqlx::Error>
    where
        F: FnOnce(&ProgressState) -> ProgressState,
    {
        let Some(customer) = CustomerRepo::lock(conn, customer_id).await? else {
            return Ok(None);
        };

        let current = customer.progress_state();
        let next = f(&current);

        let query = format!(
            "UPDATE customers \
             SET current_phase = $2, \
                 completed_phases = $3, \
                 progress = $4, \
                 onboarding_completed = onboarding_completed OR $5, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Customer>(&query)
            .bind(customer_id)
            .bind(next.current_phase.as_str())
            .bind(next.completed_names())
            .bind(i32::from(next.progress))
            .bind(mark_onboarding_completed)
            .fetch_one(&mut *conn)
            .await?;

        tracing::debug!(
            customer_id,
            from = %current.current_phase,
            to = %next.current_phase,
            progress = next.progress,
            "Progress updated"
        );

        Ok(Some(CustomerProgress::from(&updated)))
    }
}
