//! Repository for the `checklist_submissions` table.

use portal_core::checklist::ChecklistPayload;
use portal_core::phase::Phase;
use portal_core::types::DbId;
use sqlx::PgPool;

use crate::models::checklist::ChecklistSubmission;
use crate::models::customer::CustomerProgress;
use crate::repositories::customer_repo::CustomerRepo;
use crate::repositories::progress_repo::ProgressRepo;

/// Column list for `checklist_submissions` queries.
const COLUMNS: &str = "\
    id, customer_id, payment_option, tax_id, domain, target_audience, \
    company_info, web_design, market_research, legal_info, notes, created_at";

/// Result of a checklist submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The checklist was stored and the onboarding phase completed.
    Submitted {
        submission: ChecklistSubmission,
        progress: CustomerProgress,
    },
    /// The customer already has a checklist on file; nothing was written.
    AlreadySubmitted,
    /// No customer with the given id.
    CustomerNotFound,
}

/// Provides checklist intake and reads.
pub struct ChecklistRepo;

impl ChecklistRepo {
    /// Store a (pre-validated) checklist and complete the onboarding phase.
    ///
    /// The insert, the phase transition, and the `onboarding_completed` flag
    /// are one transaction under the customer row lock. A customer can
    /// submit only once; later submissions return
    /// [`SubmitOutcome::AlreadySubmitted`] without touching progress.
    pub async fn submit(
        pool: &PgPool,
        customer_id: DbId,
        payload: &ChecklistPayload,
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if CustomerRepo::lock(&mut tx, customer_id).await?.is_none() {
            return Ok(SubmitOutcome::CustomerNotFound);
        }

        // The customer row is locked from here on, so this check cannot race
        // with another submission for the same customer.
        let existing: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM checklist_submissions WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_some() {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }

        let query = format!(
            "INSERT INTO checklist_submissions \
                (customer_id, payment_option, tax_id, domain, target_audience, \
                 company_info, web_design, market_research, legal_info, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        let submission = sqlx::query_as::<_, ChecklistSubmission>(&query)
            .bind(customer_id)
            .bind(payload.payment_option.trim())
            .bind(payload.tax_id.trim())
            .bind(payload.domain.trim())
            .bind(payload.target_audience.trim())
            .bind(payload.company_info.trim())
            .bind(to_json(&payload.web_design)?)
            .bind(to_json(&payload.market_research)?)
            .bind(to_json(&payload.legal_info)?)
            .bind(&payload.notes)
            .fetch_one(&mut *tx)
            .await?;

        let progress = ProgressRepo::transition(&mut tx, customer_id, true, |s| {
            s.complete(Phase::Onboarding)
        })
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;

        Ok(SubmitOutcome::Submitted {
            submission,
            progress,
        })
    }

    /// The customer's checklist, if one has been submitted.
    pub async fn find_for_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Option<ChecklistSubmission>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checklist_submissions WHERE customer_id = $1");
        sqlx::query_as::<_, ChecklistSubmission>(&query)
            .bind(customer_id)
            .fetch_optional(pool)
            .await
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, sqlx::Error> {
    serde_json::to_value(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}
