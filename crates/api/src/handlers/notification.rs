//! Customer notifications: currently the "new leads via ads" alerts derived
//! after each metrics fetch.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::types::DbId;
use portal_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::page_bounds;
use crate::middleware::rbac::RequireCustomer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/v1/notifications?unread_only=&limit=&offset=
///
/// Newest first.
pub async fn list_notifications(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let data = NotificationRepo::list_for_customer(
        &state.pool,
        customer.user_id,
        query.unread_only,
        limit,
        offset,
    )
    .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/notifications/{id}/read
///
/// 204 on success. Another customer's notification is reported as 404.
pub async fn mark_read(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
    Path(notification_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if NotificationRepo::mark_read(&state.pool, notification_id, customer.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CoreError::NotFound {
            entity: "Notification",
            id: notification_id,
        }
        .into())
    }
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let marked_read = NotificationRepo::mark_all_read(&state.pool, customer.user_id).await?;
    tracing::debug!(customer_id = customer.user_id, marked_read, "Notifications marked read");
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    RequireCustomer(customer): RequireCustomer,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let count = NotificationRepo::unread_count(&state.pool, customer.user_id).await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}
