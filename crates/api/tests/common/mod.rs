#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use portal_ads::{AdAccount, AdsApiError, AdsConfig, AdsPlatform};
use portal_api::auth::jwt::{generate_access_token, JwtConfig};
use portal_api::config::ServerConfig;
use portal_api::router::build_app_router;
use portal_api::state::AppState;
use portal_core::insights::InsightWindow;
use portal_core::roles::Role;
use portal_core::types::DbId;
use portal_events::EventBus;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Fake ads platform
// ---------------------------------------------------------------------------

/// Scripted answer for one `fetch_insights` call.
pub enum FakeInsights {
    Records(Vec<Value>),
    RejectToken,
    PlatformError(u16),
}

/// In-memory [`AdsPlatform`] whose insight responses are queued by tests.
/// With an empty queue it returns no records.
#[derive(Default)]
pub struct FakeAds {
    queue: Mutex<VecDeque<FakeInsights>>,
    pub insight_calls: AtomicUsize,
}

impl FakeAds {
    pub fn push(&self, response: FakeInsights) {
        self.queue.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.insight_calls.load(Ordering::SeqCst)
    }
}

pub const REVOKED_TOKEN: &str = "revoked-token";

#[async_trait]
impl AdsPlatform for FakeAds {
    async fn list_ad_accounts(&self, access_token: &str) -> Result<Vec<AdAccount>, AdsApiError> {
        if access_token == REVOKED_TOKEN {
            return Err(AdsApiError::Auth("Session has been invalidated".into()));
        }
        Ok(vec![AdAccount {
            id: "act_1001".into(),
            name: Some("Main account".into()),
            account_status: Some(1),
            currency: Some("EUR".into()),
        }])
    }

    async fn fetch_insights(
        &self,
        _access_token: &str,
        _ad_account_id: &str,
        _window: InsightWindow,
    ) -> Result<Vec<Value>, AdsApiError> {
        self.insight_calls.fetch_add(1, Ordering::SeqCst);
        match self.queue.lock().unwrap().pop_front() {
            None => Ok(Vec::new()),
            Some(FakeInsights::Records(records)) => Ok(records),
            Some(FakeInsights::RejectToken) => {
                Err(AdsApiError::Auth("Error validating access token".into()))
            }
            Some(FakeInsights::PlatformError(status)) => Err(AdsApiError::Api {
                status,
                body: "{\"error\":{\"message\":\"boom\"}}".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub pool: PgPool,
    pub ads: Arc<FakeAds>,
    pub event_bus: Arc<EventBus>,
    pub config: ServerConfig,
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret-with-enough-bytes".to_string(),
            access_token_expiry_mins: 15,
        },
        ads: AdsConfig::default(),
    }
}

/// Build the full application router, with the fake ads platform, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let ads = Arc::new(FakeAds::default());
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        ads: ads.clone(),
        event_bus: Arc::clone(&event_bus),
    };

    TestApp {
        router: build_app_router(state),
        pool,
        ads,
        event_bus,
        config,
    }
}

impl TestApp {
    pub fn customer_token(&self, customer_id: DbId) -> String {
        generate_access_token(customer_id, Role::Customer, &self.config.jwt).unwrap()
    }

    pub fn admin_token(&self) -> String {
        generate_access_token(1, Role::Admin, &self.config.jwt).unwrap()
    }

    /// Create a customer through the admin API and return its id.
    pub async fn create_customer(&self, email: &str) -> DbId {
        let response = self
            .send(
                Method::POST,
                "/api/v1/admin/customers",
                Some(&self.admin_token()),
                Some(serde_json::json!({"name": "Test Customer", "email": email})),
            )
            .await;
        assert_eq!(response.status(), 201, "customer creation failed");
        body_json(response).await["data"]["id"].as_i64().unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::POST, uri, Some(token), None).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A checklist with every required field filled in.
pub fn complete_checklist() -> Value {
    serde_json::json!({
        "payment_option": "invoice",
        "tax_id": "DE123456789",
        "domain": "mueller-bau.de",
        "target_audience": "Homeowners in Bavaria",
        "company_info": "Construction company, 12 employees",
        "web_design": {
            "color_scheme": "green and white",
            "reference_sites": ["https://example.com"]
        },
        "market_research": {
            "competitors": ["Bau AG", "Haus GmbH"],
            "unique_selling_points": "Fixed-price offers"
        },
        "legal_info": {
            "address": "Bahnhofstr. 5, 80335 München",
            "impressum": "Müller Bau GmbH, HRB 12345",
            "privacy_policy": "We only store what we need."
        }
    })
}

/// One day of insights with the given lead count.
pub fn insight_day(impressions: i64, clicks: i64, spend: &str, leads: i64) -> Value {
    serde_json::json!({
        "impressions": impressions.to_string(),
        "clicks": clicks.to_string(),
        "spend": spend,
        "actions": [{"action_type": "lead", "value": leads.to_string()}]
    })
}
