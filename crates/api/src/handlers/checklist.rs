//! Handlers for the onboarding checklist.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use portal_core::checklist::{validate_checklist, ChecklistPayload};
use portal_core::error::CoreError;
use portal_db::models::checklist::ChecklistSubmission;
use portal_db::models::customer::CustomerProgress;
use portal_db::repositories::{ChecklistRepo, SubmitOutcome};
use portal_events::bus::CHECKLIST_SUBMITTED;
use portal_events::PlatformEvent;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireCustomer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmittedChecklist {
    pub submission: ChecklistSubmission,
    pub progress: CustomerProgress,
}

/// POST /api/v1/checklist
///
/// Submit the business checklist. Every invalid field is reported at once.
/// On success the onboarding phase is completed; a customer can submit only
/// once.
pub async fn submit_checklist(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
    Json(payload): Json<ChecklistPayload>,
) -> AppResult<impl IntoResponse> {
    validate_checklist(&payload)?;

    match ChecklistRepo::submit(&state.pool, auth.user_id, &payload).await? {
        SubmitOutcome::Submitted {
            submission,
            progress,
        } => {
            tracing::info!(
                customer_id = auth.user_id,
                submission_id = submission.id,
                phase = %progress.state.current_phase,
                "Checklist submitted"
            );
            state.event_bus.publish(
                PlatformEvent::new(CHECKLIST_SUBMITTED)
                    .with_customer(auth.user_id)
                    .with_actor(auth.user_id)
                    .with_payload(serde_json::json!({ "submission_id": submission.id })),
            );
            Ok((
                StatusCode::CREATED,
                Json(DataResponse {
                    data: SubmittedChecklist {
                        submission,
                        progress,
                    },
                }),
            ))
        }
        SubmitOutcome::AlreadySubmitted => Err(CoreError::Conflict(
            "The checklist has already been submitted".into(),
        )
        .into()),
        SubmitOutcome::CustomerNotFound => Err(CoreError::NotFound {
            entity: "Customer",
            id: auth.user_id,
        }
        .into()),
    }
}

/// GET /api/v1/checklist
pub async fn get_checklist(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let submission = ChecklistRepo::find_for_customer(&state.pool, auth.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Checklist",
            id: auth.user_id,
        })?;
    Ok(Json(DataResponse { data: submission }))
}
