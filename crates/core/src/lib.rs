//! Domain logic for the customer onboarding portal.
//!
//! Everything in this crate is pure: phase ordering, progress transitions,
//! checklist validation, insight aggregation, and lead-alert derivation.
//! Callers in `portal-db` and `portal-api` load state, hand it to these
//! functions, and persist the result.

pub mod checklist;
pub mod error;
pub mod insights;
pub mod lead_alert;
pub mod phase;
pub mod progress;
pub mod roles;
pub mod types;
