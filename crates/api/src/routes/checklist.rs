use axum::routing::get;
use axum::Router;

use crate::handlers::checklist;
use crate::state::AppState;

/// Routes mounted at `/checklist`.
///
/// ```text
/// GET    /                          -> get_checklist
/// POST   /                          -> submit_checklist
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(checklist::get_checklist).post(checklist::submit_checklist),
    )
}
