//! Role gates layered on top of [`AuthUser`].
//!
//! A valid token with the wrong role is 403, not 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use portal_core::error::CoreError;
use portal_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if user.role != role {
        tracing::debug!(user_id = user.user_id, role = %user.role, required = %role, "Role check failed");
        return Err(CoreError::Forbidden(message.to_string()).into());
    }
    Ok(user)
}

/// Admin-only endpoints.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}

/// Customer-only endpoints. `user_id` is the customer id.
pub struct RequireCustomer(pub AuthUser);

impl FromRequestParts<AppState> for RequireCustomer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Customer, "Customer account required")
            .await
            .map(RequireCustomer)
    }
}
