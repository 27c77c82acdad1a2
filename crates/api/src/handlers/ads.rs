//! Handlers for the customer's ads-platform connection.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use portal_core::error::CoreError;
use portal_db::repositories::AdsCredentialRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::ingest::MetricsIngestor;
use crate::middleware::rbac::RequireCustomer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct StoreCredentialRequest {
    #[validate(length(min = 1, max = 4096, message = "Access token is required"))]
    pub access_token: String,
}

/// PUT /api/v1/ads/credential
///
/// Store or replace the customer's ads-platform access token. The token is
/// never returned.
pub async fn store_credential(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
    Json(input): Json<StoreCredentialRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let credential =
        AdsCredentialRepo::upsert(&state.pool, auth.user_id, input.access_token.trim()).await?;

    tracing::info!(customer_id = auth.user_id, "Ads credential stored");
    Ok(Json(DataResponse { data: credential }))
}

/// DELETE /api/v1/ads/credential
pub async fn delete_credential(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    if !AdsCredentialRepo::delete(&state.pool, auth.user_id).await? {
        return Err(CoreError::NotFound {
            entity: "AdsCredential",
            id: auth.user_id,
        }
        .into());
    }

    tracing::info!(customer_id = auth.user_id, "Ads credential removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/ads/accounts
///
/// Ad accounts reachable with the stored token.
pub async fn list_ad_accounts(
    RequireCustomer(auth): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let token = MetricsIngestor::access_token(&state.pool, auth.user_id).await?;
    let accounts = state.ads.list_ad_accounts(&token).await?;
    Ok(Json(DataResponse { data: accounts }))
}
