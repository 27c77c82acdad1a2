//! Authentication primitives.
//!
//! Sessions are issued by an external auth provider; the portal only
//! validates the HS256 access tokens it receives (see [`jwt`]).

pub mod jwt;
