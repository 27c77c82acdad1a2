//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Operations that must be atomic
//! open their own transaction.

pub mod ads_credential_repo;
pub mod checklist_repo;
pub mod customer_repo;
pub mod metrics_repo;
pub mod notification_repo;
pub mod progress_repo;

pub use ads_credential_repo::AdsCredentialRepo;
pub use checklist_repo::{ChecklistRepo, SubmitOutcome};
pub use customer_repo::CustomerRepo;
pub use metrics_repo::MetricsRepo;
pub use notification_repo::NotificationRepo;
pub use progress_repo::ProgressRepo;
