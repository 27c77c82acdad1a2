//! Integration tests for customer progress tracking.

use portal_core::phase::Phase;
use portal_db::models::customer::{CreateCustomer, Customer};
use portal_db::repositories::{CustomerRepo, ProgressRepo};
use sqlx::PgPool;

async fn new_customer(pool: &PgPool, email: &str) -> Customer {
    CustomerRepo::create(
        pool,
        &CreateCustomer {
            name: "Test Customer".to_string(),
            email: email.to_string(),
        },
    )
    .await
    .expect("customer creation should succeed")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_customer_starts_in_onboarding(pool: PgPool) {
    let customer = new_customer(&pool, "start@test.com").await;

    let progress = ProgressRepo::get(&pool, customer.id).await.unwrap().unwrap();
    assert_eq!(progress.state.current_phase, Phase::Onboarding);
    assert_eq!(progress.state.progress, 20);
    assert!(progress.state.completed_phases.is_empty());
    assert!(!progress.onboarding_completed);
    assert_eq!(progress.steps.len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_customer_has_no_progress(pool: PgPool) {
    assert!(ProgressRepo::get(&pool, 999_999).await.unwrap().is_none());
    assert!(ProgressRepo::advance_phase(&pool, 999_999, Phase::Ads)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_advance_never_duplicates_completed_phases(pool: PgPool) {
    let customer = new_customer(&pool, "repeat@test.com").await;

    for _ in 0..3 {
        ProgressRepo::advance_phase(&pool, customer.id, Phase::Landingpage)
            .await
            .unwrap();
    }

    let stored = CustomerRepo::find_by_id(&pool, customer.id).await.unwrap().unwrap();
    assert_eq!(stored.completed_phases, vec!["onboarding".to_string()]);
    assert_eq!(stored.current_phase, "landingpage");
    assert_eq!(stored.progress, 40);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn earlier_phase_does_not_regress_progress(pool: PgPool) {
    let customer = new_customer(&pool, "regress@test.com").await;

    ProgressRepo::advance_phase(&pool, customer.id, Phase::Whatsapp)
        .await
        .unwrap();
    let after = ProgressRepo::advance_phase(&pool, customer.id, Phase::Landingpage)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.state.current_phase, Phase::Whatsapp);
    assert_eq!(after.state.progress, 80);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_advances_are_serialized(pool: PgPool) {
    let customer = new_customer(&pool, "race@test.com").await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move {
                ProgressRepo::complete_phase(&pool, customer.id, Phase::Onboarding).await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = CustomerRepo::find_by_id(&pool, customer.id).await.unwrap().unwrap();
    assert_eq!(stored.completed_phases, vec!["onboarding".to_string()]);
    assert_eq!(stored.progress, 40);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_last_phase_reaches_one_hundred(pool: PgPool) {
    let customer = new_customer(&pool, "finish@test.com").await;

    ProgressRepo::advance_phase(&pool, customer.id, Phase::Webinar)
        .await
        .unwrap();
    let done = ProgressRepo::complete_phase(&pool, customer.id, Phase::Webinar)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(done.state.current_phase, Phase::Webinar);
    assert_eq!(done.state.progress, 100);
    assert!(done.state.is_completed(Phase::Webinar));
    assert!(done.steps.iter().all(|s| s.reached));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approve_is_idempotent(pool: PgPool) {
    let customer = new_customer(&pool, "approve@test.com").await;
    assert!(!customer.is_approved);

    let first = CustomerRepo::approve(&pool, customer.id).await.unwrap().unwrap();
    let second = CustomerRepo::approve(&pool, customer.id).await.unwrap().unwrap();

    assert!(first.is_approved);
    assert_eq!(first.approved_at, second.approved_at);
    assert!(CustomerRepo::approve(&pool, 999_999).await.unwrap().is_none());
}
