pub mod admin;
pub mod ads;
pub mod checklist;
pub mod health;
pub mod metrics;
pub mod notification;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /phases                                          phase table (any role)
/// /progress                                        own progress (customer)
///
/// /checklist                                       submit, read back (customer)
///
/// /ads/credential                                  store, remove token (customer)
/// /ads/accounts                                    list ad accounts (customer)
///
/// /metrics/fetch                                   fetch and store (customer)
/// /metrics/latest                                  newest snapshot
/// /metrics/snapshots                               snapshot history
///
/// /notifications                                   list
/// /notifications/unread-count                      unread count
/// /notifications/read-all                          mark all read
/// /notifications/{id}/read                         mark one read
///
/// /admin/customers                                 list, create (admin)
/// /admin/customers/{id}/approve                    approve
/// /admin/customers/{id}/progress                   read progress
/// /admin/customers/{id}/phase                      advance phase
/// /admin/customers/{id}/phase/complete             complete phase
/// /admin/customers/{id}/metrics/fetch              fetch and store for customer
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/phases", get(handlers::progress::list_phases))
        .route("/progress", get(handlers::progress::get_my_progress))
        .nest("/checklist", checklist::router())
        .nest("/ads", ads::router())
        .nest("/metrics", metrics::router())
        .nest("/notifications", notification::router())
        .nest("/admin", admin::router())
}
