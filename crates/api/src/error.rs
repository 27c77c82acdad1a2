use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use portal_ads::AdsApiError;
use portal_core::checklist::field_messages;
use portal_core::error::CoreError;
use serde_json::json;

use crate::ingest::IngestError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failure talking to the ads platform.
    #[error(transparent)]
    Ads(#[from] AdsApiError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::InvalidFields(errors))
    }
}

/// Status, machine-readable code, message, and optional per-field details.
type Classified = (
    StatusCode,
    &'static str,
    String,
    Option<BTreeMap<String, Vec<String>>>,
);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Database(err) => without_details(classify_sqlx_error(err)),
            AppError::Ads(err) => without_details(classify_ads_error(err)),
            AppError::Ingest(err) => without_details(match err {
                IngestError::MissingCredential(_) => (
                    StatusCode::UNAUTHORIZED,
                    "EXTERNAL_AUTH_ERROR",
                    "No ads account connected. Connect your ads account and try again."
                        .to_string(),
                ),
                IngestError::CustomerNotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Customer with id {id} not found"),
                ),
                IngestError::Ads(err) => classify_ads_error(err),
                IngestError::Database(err) => classify_sqlx_error(err),
            }),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, axum::Json(body)).into_response()
    }
}

fn without_details((status, code, message): (StatusCode, &'static str, String)) -> Classified {
    (status, code, message, None)
}

fn classify_core_error(err: &CoreError) -> Classified {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
            None,
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None),
        CoreError::InvalidFields(errors) => {
            let details = field_messages(errors);
            let fields: Vec<&str> = details.keys().map(String::as_str).collect();
            (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid or missing fields: {}", fields.join(", ")),
                Some(details),
            )
        }
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone(), None),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
    }
}

/// Classify an ads platform failure so clients can tell "reconnect your
/// account" apart from "try again later".
///
/// - Rejected token maps to 401 `EXTERNAL_AUTH_ERROR`.
/// - Platform errors and unreadable responses map to 502 `EXTERNAL_API_ERROR`.
/// - Transport failures and timeouts map to 504 `NETWORK_ERROR`.
fn classify_ads_error(err: &AdsApiError) -> (StatusCode, &'static str, String) {
    match err {
        AdsApiError::Auth(msg) => (
            StatusCode::UNAUTHORIZED,
            "EXTERNAL_AUTH_ERROR",
            format!("The ads platform rejected your access token ({msg}). Please reconnect."),
        ),
        AdsApiError::Api { status, body } => {
            tracing::warn!(status, body = %body, "Ads platform API error");
            (
                StatusCode::BAD_GATEWAY,
                "EXTERNAL_API_ERROR",
                format!("The ads platform returned an error (status {status})"),
            )
        }
        AdsApiError::Decode(msg) => {
            tracing::warn!(error = %msg, "Unreadable ads platform response");
            (
                StatusCode::BAD_GATEWAY,
                "EXTERNAL_API_ERROR",
                "The ads platform returned an unreadable response".to_string(),
            )
        }
        AdsApiError::Network(e) => {
            tracing::warn!(error = %e, "Ads platform unreachable");
            (
                StatusCode::GATEWAY_TIMEOUT,
                "NETWORK_ERROR",
                "The ads platform could not be reached. Try again later.".to_string(),
            )
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
