use axum::routing::{get, put};
use axum::Router;

use crate::handlers::ads;
use crate::state::AppState;

/// Routes mounted at `/ads`.
///
/// ```text
/// PUT    /credential                -> store_credential
/// DELETE /credential                -> delete_credential
/// GET    /accounts                  -> list_ad_accounts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/credential",
            put(ads::store_credential).delete(ads::delete_credential),
        )
        .route("/accounts", get(ads::list_ad_accounts))
}
