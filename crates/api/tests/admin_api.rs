//! HTTP-level tests for the admin customer surface.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{body_json, build_test_app, insight_day, FakeInsights};
use portal_events::bus::CUSTOMER_APPROVED;
use sqlx::PgPool;
use tokio::sync::broadcast::error::TryRecvError;

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_email_conflicts(pool: PgPool) {
    let app = build_test_app(pool);
    app.create_customer("dup@test.com").await;

    let response = app
        .post_json(
            "/api/v1/admin/customers",
            &app.admin_token(),
            serde_json::json!({"name": "Again", "email": "DUP@test.com"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_customer_validates_input(pool: PgPool) {
    let app = build_test_app(pool);
    let response = app
        .post_json(
            "/api/v1/admin/customers",
            &app.admin_token(),
            serde_json::json!({"name": "", "email": "not-an-email"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["details"]["name"].is_array());
    assert!(json["details"]["email"].is_array());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_publishes_event_once(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("approve@test.com").await;
    let mut events = app.event_bus.subscribe();
    let uri = format!("/api/v1/admin/customers/{customer_id}/approve");

    let response = app.post(&uri, &app.admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_approved"], true);

    let event = events.try_recv().expect("approval event");
    assert_eq!(event.event_type, CUSTOMER_APPROVED);
    assert_eq!(event.customer_id, Some(customer_id));
    assert_eq!(event.payload_str("email"), Some("approve@test.com"));

    let response = app.post(&uri, &app.admin_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_matches!(events.try_recv(), Err(TryRecvError::Empty));

    let response = app
        .post("/api/v1/admin/customers/424242/approve", &app.admin_token())
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_advances_phase_without_duplicates(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("advance@test.com").await;
    let admin = app.admin_token();
    let uri = format!("/api/v1/admin/customers/{customer_id}/phase");

    for _ in 0..3 {
        let response = app
            .post_json(&uri, &admin, serde_json::json!({"phase": "ads"}))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .post_json(&uri, &admin, serde_json::json!({"phase": "landingpage"}))
        .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_phase"], "ads");
    assert_eq!(json["data"]["progress"], 60);
    assert_eq!(
        json["data"]["completed_phases"],
        serde_json::json!(["onboarding", "landingpage"])
    );

    let response = app
        .get(&format!("/api/v1/admin/customers/{customer_id}/progress"), &admin)
        .await;
    assert_eq!(body_json(response).await["data"]["progress"], 60);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_webinar_finishes_onboarding(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("webinar@test.com").await;
    let admin = app.admin_token();

    app.post_json(
        &format!("/api/v1/admin/customers/{customer_id}/phase"),
        &admin,
        serde_json::json!({"phase": "webinar"}),
    )
    .await;
    let response = app
        .post_json(
            &format!("/api/v1/admin/customers/{customer_id}/phase/complete"),
            &admin,
            serde_json::json!({"phase": "webinar"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["progress"], 100);
    assert_eq!(json["data"]["current_phase"], "webinar");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_phase_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("badphase@test.com").await;

    let response = app
        .post_json(
            &format!("/api/v1/admin/customers/{customer_id}/phase"),
            &app.admin_token(),
            serde_json::json!({"phase": "launch"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = app
        .post_json(
            "/api/v1/admin/customers/999999/phase",
            &app.admin_token(),
            serde_json::json!({"phase": "ads"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_routes_reject_customers(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("sneaky@test.com").await;
    let token = app.customer_token(customer_id);

    let response = app.get("/api/v1/admin/customers", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app
        .post(&format!("/api/v1/admin/customers/{customer_id}/approve"), &token)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_customers_includes_progress(pool: PgPool) {
    let app = build_test_app(pool);
    app.create_customer("a@test.com").await;
    app.create_customer("b@test.com").await;

    let response = app
        .get("/api/v1/admin/customers?limit=10", &app.admin_token())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let customers = json["data"].as_array().unwrap();
    assert_eq!(customers.len(), 2);
    assert!(customers
        .iter()
        .all(|c| c["progress"]["current_phase"] == "onboarding"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_can_fetch_metrics_for_customer(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("adminfetch@test.com").await;
    app.put_json(
        "/api/v1/ads/credential",
        &app.customer_token(customer_id),
        serde_json::json!({"access_token": "tok"}),
    )
    .await;
    app.ads
        .push(FakeInsights::Records(vec![insight_day(40, 4, "2.00", 3)]));

    let response = app
        .post_json(
            &format!("/api/v1/admin/customers/{customer_id}/metrics/fetch"),
            &app.admin_token(),
            serde_json::json!({"ad_account_id": "act_9"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["customer_id"], customer_id);
    assert_eq!(json["data"]["leads"], 3);
    assert_eq!(json["data"]["cpc"].as_f64(), Some(0.5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_fetch_for_unknown_customer_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);
    app.ads
        .push(FakeInsights::Records(vec![insight_day(40, 4, "2.00", 3)]));

    let response = app
        .post_json(
            "/api/v1/admin/customers/999999/metrics/fetch",
            &app.admin_token(),
            serde_json::json!({"ad_account_id": "act_9"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert_eq!(app.ads.calls(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database(pool: PgPool) {
    let app = build_test_app(pool);
    let response = app
        .send(axum::http::Method::GET, "/health", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
