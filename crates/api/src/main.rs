use std::sync::Arc;
use std::time::Duration;

use portal_ads::{AdsPlatform, AdsPlatformApi};
use portal_api::config::ServerConfig;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_events::{ApprovalMailer, EmailConfig, EmailDelivery, EventBus};
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "portal_api=debug,portal_db=debug,portal_ads=debug,tower_http=debug";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, verify, and migrate. Any failure aborts startup.
async fn connect_database() -> portal_db::DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = portal_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    portal_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    portal_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");
    pool
}

/// Start the approval mailer when SMTP is configured.
fn spawn_approval_mailer(event_bus: &EventBus) -> Option<JoinHandle<()>> {
    let Some(email_config) = EmailConfig::from_env() else {
        tracing::warn!("SMTP_HOST not set, approval emails disabled");
        return None;
    };
    let smtp_host = email_config.smtp_host.clone();
    let delivery = match EmailDelivery::new(email_config) {
        Ok(delivery) => delivery,
        Err(e) => {
            tracing::error!(error = %e, "Invalid SMTP configuration, approval emails disabled");
            return None;
        }
    };
    tracing::info!(%smtp_host, "Approval emails enabled");
    Some(tokio::spawn(ApprovalMailer::run(
        Arc::new(delivery),
        event_bus.subscribe(),
    )))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        ads_base_url = %config.ads.base_url,
        insights_window_days = config.ads.window_days,
        "Configuration loaded"
    );

    let pool = connect_database().await;

    let ads: Arc<dyn AdsPlatform> =
        Arc::new(AdsPlatformApi::new(&config.ads).expect("Failed to build ads platform client"));
    let event_bus = Arc::new(EventBus::default());
    let mailer = spawn_approval_mailer(&event_bus);

    let app = build_app_router(AppState {
        pool,
        config: Arc::new(config.clone()),
        ads,
        event_bus: Arc::clone(&event_bus),
    });

    let addr = config.bind_addr().expect("HOST must be an IP address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(%addr, "Portal API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // The router's state clone is gone; the last bus handle closes the
    // channel and lets the mailer finish its loop.
    drop(event_bus);
    if let Some(handle) = mailer {
        let grace = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Approval mailer did not stop within the shutdown timeout");
        }
    }
    tracing::info!("Shutdown complete");
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to listen for Ctrl-C");
                tracing::info!("SIGINT received, shutting down");
            }
            _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl-C");
        tracing::info!("Ctrl-C received, shutting down");
    }
}
