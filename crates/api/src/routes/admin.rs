//! Admin-only routes. Every handler requires [`RequireAdmin`](crate::middleware::rbac::RequireAdmin).

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{customer, metrics, progress};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /customers                           -> list_customers
/// POST   /customers                           -> create_customer
/// POST   /customers/{id}/approve              -> approve_customer
/// GET    /customers/{id}/progress             -> get_customer_progress
/// POST   /customers/{id}/phase                -> advance_phase
/// POST   /customers/{id}/phase/complete       -> complete_phase
/// POST   /customers/{id}/metrics/fetch        -> fetch_customer_metrics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/customers",
            get(customer::list_customers).post(customer::create_customer),
        )
        .route("/customers/{id}/approve", post(customer::approve_customer))
        .route("/customers/{id}/progress", get(progress::get_customer_progress))
        .route("/customers/{id}/phase", post(progress::advance_phase))
        .route("/customers/{id}/phase/complete", post(progress::complete_phase))
        .route(
            "/customers/{id}/metrics/fetch",
            post(metrics::fetch_customer_metrics),
        )
}
