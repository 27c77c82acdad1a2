//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` struct matching the
//! database row, plus any input DTOs the repositories accept.

pub mod ads_credential;
pub mod checklist;
pub mod customer;
pub mod metrics;
pub mod notification;
