//! Admin handlers for customer accounts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use portal_core::error::CoreError;
use portal_core::types::DbId;
use portal_db::models::customer::{CreateCustomer, CustomerProgress};
use portal_db::repositories::CustomerRepo;
use portal_events::bus::CUSTOMER_APPROVED;
use portal_events::PlatformEvent;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::page_bounds;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A customer as shown in the admin list.
#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub is_approved: bool,
    pub progress: CustomerProgress,
}

/// POST /api/v1/admin/customers
///
/// Register a customer. New customers start unapproved in the onboarding
/// phase.
pub async fn create_customer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let customer = CustomerRepo::create(
        &state.pool,
        &CreateCustomer {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_lowercase(),
        },
    )
    .await?;

    tracing::info!(admin_id = admin.user_id, customer_id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: customer })))
}

/// GET /api/v1/admin/customers
pub async fn list_customers(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let customers = CustomerRepo::list(&state.pool, limit, offset).await?;

    let data: Vec<CustomerSummary> = customers
        .iter()
        .map(|c| CustomerSummary {
            id: c.id,
            name: c.name.clone(),
            email: c.email.clone(),
            is_approved: c.is_approved,
            progress: CustomerProgress::from(c),
        })
        .collect();

    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/customers/{id}/approve
///
/// Approve a customer account. Approving twice keeps the original
/// approval time. The approval email is sent in the background.
pub async fn approve_customer(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let already_approved = CustomerRepo::find_by_id(&state.pool, customer_id)
        .await?
        .map(|c| c.is_approved)
        .ok_or(CoreError::NotFound {
            entity: "Customer",
            id: customer_id,
        })?;

    let customer = CustomerRepo::approve(&state.pool, customer_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Customer",
            id: customer_id,
        })?;

    if !already_approved {
        tracing::info!(admin_id = admin.user_id, customer_id, "Customer approved");
        state.event_bus.publish(
            PlatformEvent::new(CUSTOMER_APPROVED)
                .with_customer(customer_id)
                .with_actor(admin.user_id)
                .with_payload(serde_json::json!({
                    "email": customer.email,
                    "name": customer.name,
                })),
        );
    }

    Ok(Json(DataResponse { data: customer }))
}
