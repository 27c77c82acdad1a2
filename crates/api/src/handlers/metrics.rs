//! Handlers for ads metrics snapshots.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use portal_core::types::DbId;
use portal_db::repositories::MetricsRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::page_bounds;
use crate::ingest::MetricsIngestor;
use crate::middleware::rbac::{RequireAdmin, RequireCustomer};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct FetchMetricsRequest {
    #[validate(length(min = 1, max = 64, message = "Ad account id is required"))]
    pub ad_account_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn run_fetch(state: &AppState, customer_id: DbId, ad_account_id: &str) -> AppResult<impl IntoResponse> {
    let snapshot = MetricsIngestor::from_state(state)
        .spawn_fetch_and_store(customer_id, ad_account_id.trim().to_string())
        .await
        .map_err(|e| AppError::InternalError(format!("Metrics fetch task failed: {e}")))??;
    Ok((StatusCode::CREATED, Json(DataResponse { data: snapshot })))
}

/// POST /api/v1/metrics/fetch
///
/// Pull the trailing insights window for one ad account and store a new
/// snapshot.
pub async fn fetch_metrics(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
    Json(input): Json<FetchMetricsRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    run_fetch(&state, auth.user_id, &input.ad_account_id).await
}

/// POST /api/v1/admin/customers/{id}/metrics/fetch
pub async fn fetch_customer_metrics(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
    Json(input): Json<FetchMetricsRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    tracing::info!(admin_id = admin.user_id, customer_id, "Admin-triggered metrics fetch");
    run_fetch(&state, customer_id, &input.ad_account_id).await
}

/// GET /api/v1/metrics/latest
///
/// The newest snapshot, or `null` before the first fetch.
pub async fn latest_snapshot(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let snapshot = MetricsRepo::latest(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// GET /api/v1/metrics/snapshots
///
/// Snapshot history, newest first.
pub async fn list_snapshots(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
    Query(params): Query<SnapshotQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let items = MetricsRepo::list_for_customer(&state.pool, auth.user_id, limit, offset).await?;
    let total = MetricsRepo::count_for_customer(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}
