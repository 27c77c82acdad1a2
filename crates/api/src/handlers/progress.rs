//! Handlers for onboarding progress.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::phase::{Phase, PHASES};
use portal_core::types::DbId;
use portal_db::models::customer::CustomerProgress;
use portal_db::repositories::ProgressRepo;
use portal_events::bus::PHASE_ADVANCED;
use portal_events::PlatformEvent;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireCustomer};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PhaseRequest {
    pub phase: String,
}

fn not_found(customer_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Customer",
        id: customer_id,
    }
}

/// GET /api/v1/phases
///
/// The phase table: name, percentage, and label of every step.
pub async fn list_phases(_auth: AuthUser) -> impl IntoResponse {
    Json(DataResponse { data: PHASES })
}

/// GET /api/v1/progress
pub async fn get_my_progress(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::get(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| not_found(auth.user_id))?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/admin/customers/{id}/progress
pub async fn get_customer_progress(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let progress = ProgressRepo::get(&state.pool, customer_id)
        .await?
        .ok_or_else(|| not_found(customer_id))?;
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/admin/customers/{id}/phase
///
/// Move a customer to the given phase, recording its predecessor as
/// completed. Moving to an earlier phase never lowers progress.
pub async fn advance_phase(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
    Json(input): Json<PhaseRequest>,
) -> AppResult<impl IntoResponse> {
    let target = Phase::parse_strict(&input.phase)?;
    let progress = ProgressRepo::advance_phase(&state.pool, customer_id, target)
        .await?
        .ok_or_else(|| not_found(customer_id))?;

    publish_phase_change(&state, admin.user_id, &progress);
    Ok(Json(DataResponse { data: progress }))
}

/// POST /api/v1/admin/customers/{id}/phase/complete
///
/// Mark a phase completed and move the customer on to the next one.
/// Completing the last phase sets progress to 100.
pub async fn complete_phase(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
    Json(input): Json<PhaseRequest>,
) -> AppResult<impl IntoResponse> {
    let phase = Phase::parse_strict(&input.phase)?;
    let progress = ProgressRepo::complete_phase(&state.pool, customer_id, phase)
        .await?
        .ok_or_else(|| not_found(customer_id))?;

    publish_phase_change(&state, admin.user_id, &progress);
    Ok(Json(DataResponse { data: progress }))
}

fn publish_phase_change(state: &AppState, actor: DbId, progress: &CustomerProgress) {
    tracing::info!(
        admin_id = actor,
        customer_id = progress.customer_id,
        phase = %progress.state.current_phase,
        progress = progress.state.progress,
        "Customer phase updated"
    );
    state.event_bus.publish(
        PlatformEvent::new(PHASE_ADVANCED)
            .with_customer(progress.customer_id)
            .with_actor(actor)
            .with_payload(serde_json::json!({
                "current_phase": progress.state.current_phase,
                "progress": progress.state.progress,
            })),
    );
}
