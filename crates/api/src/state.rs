use std::sync::Arc;

use portal_ads::AdsPlatform;
use portal_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: portal_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Ads platform client. Tests substitute a fake implementation.
    pub ads: Arc<dyn AdsPlatform>,
    pub event_bus: Arc<EventBus>,
}
