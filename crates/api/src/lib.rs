//! Customer portal API server library.
//!
//! Exposes config, state, error handling, routes, and the metrics ingestor
//! so integration tests and the binary entrypoint can both use them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
