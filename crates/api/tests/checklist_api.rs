//! HTTP-level tests for checklist intake and progress.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, complete_checklist};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn checklist_submission_advances_onboarding(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("flow@test.com").await;
    let token = app.customer_token(customer_id);

    let response = app.get("/api/v1/progress", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let before = body_json(response).await;
    assert_eq!(before["data"]["current_phase"], "onboarding");
    assert_eq!(before["data"]["progress"], 20);

    let response = app
        .post_json("/api/v1/checklist", &token, complete_checklist())
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let progress = &json["data"]["progress"];
    assert_eq!(progress["current_phase"], "landingpage");
    assert_eq!(progress["progress"], 40);
    assert_eq!(progress["completed_phases"], serde_json::json!(["onboarding"]));
    assert_eq!(progress["onboarding_completed"], true);
    assert_eq!(json["data"]["submission"]["domain"], "mueller-bau.de");

    let response = app.get("/api/v1/progress", &token).await;
    let after = body_json(response).await;
    assert_eq!(after["data"]["current_phase"], "landingpage");
    assert_eq!(after["data"]["steps"][1]["reached"], true);
    assert_eq!(after["data"]["steps"][2]["reached"], false);

    let response = app.get("/api/v1/checklist", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = body_json(response).await;
    assert_eq!(stored["data"]["legal_info"]["impressum"], "Müller Bau GmbH, HRB 12345");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_submission_conflicts(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("twice@test.com").await;
    let token = app.customer_token(customer_id);

    let first = app
        .post_json("/api/v1/checklist", &token, complete_checklist())
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .post_json("/api/v1/checklist", &token, complete_checklist())
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "CONFLICT");

    let progress = body_json(app.get("/api/v1/progress", &token).await).await;
    assert_eq!(
        progress["data"]["completed_phases"],
        serde_json::json!(["onboarding"])
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_checklist_lists_every_field(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("invalid@test.com").await;
    let token = app.customer_token(customer_id);

    let mut payload = complete_checklist();
    payload["tax_id"] = "".into();
    payload["legal_info"]["privacy_policy"] = "  ".into();
    payload["market_research"]["competitors"] = serde_json::json!([]);

    let response = app.post_json("/api/v1/checklist", &token, payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let mut fields: Vec<&str> = json["details"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    fields.sort_unstable();
    assert_eq!(
        fields,
        vec![
            "legal_info.privacy_policy",
            "market_research.competitors",
            "tax_id"
        ]
    );

    // Nothing was stored and progress is untouched.
    let response = app.get("/api/v1/checklist", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let progress = body_json(app.get("/api/v1/progress", &token).await).await;
    assert_eq!(progress["data"]["current_phase"], "onboarding");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_checklist_reports_all_required_fields(pool: PgPool) {
    let app = build_test_app(pool);
    let customer_id = app.create_customer("empty@test.com").await;
    let token = app.customer_token(customer_id);

    let response = app
        .post_json("/api/v1/checklist", &token, serde_json::json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"].as_object().unwrap().len(), 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checklist_requires_customer_token(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app
        .send(
            axum::http::Method::POST,
            "/api/v1/checklist",
            None,
            Some(complete_checklist()),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_json("/api/v1/checklist", &app.admin_token(), complete_checklist())
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/api/v1/progress", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_for_unknown_customer_is_not_found(pool: PgPool) {
    let app = build_test_app(pool);
    let response = app
        .get("/api/v1/progress", &app.customer_token(987_654))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn phase_table_is_public_to_any_role(pool: PgPool) {
    let app = build_test_app(pool);
    let response = app.get("/api/v1/phases", &app.customer_token(1)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let percents: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["percent"].as_i64().unwrap())
        .collect();
    assert_eq!(percents, vec![20, 40, 60, 80, 100]);
}
