//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] requires the `admin` role.
//! - [`rbac::RequireCustomer`] requires the `customer` role.

pub mod auth;
pub mod rbac;
