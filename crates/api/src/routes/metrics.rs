use axum::routing::{get, post};
use axum::Router;

use crate::handlers::metrics;
use crate::state::AppState;

/// Routes mounted at `/metrics`.
///
/// ```text
/// POST   /fetch                     -> fetch_metrics
/// GET    /latest                    -> latest_snapshot
/// GET    /snapshots                 -> list_snapshots
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fetch", post(metrics::fetch_metrics))
        .route("/latest", get(metrics::latest_snapshot))
        .route("/snapshots", get(metrics::list_snapshots))
}
