use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use homestead_core::compliance::ComplianceViolation;
use homestead_core::error::CoreError;
use serde_json::json;

/// Error returned by every handler and extractor.
///
/// Rendered as `{ "error": <message>, "code": <CODE> }`. A compliance failure
/// adds `violations`, and a rate-limit rejection sets `Retry-After`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The caller exhausted a rate-limit window.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Listing copy failed the pre-publish compliance gate.
    #[error("Listing failed compliance review")]
    ComplianceFailed(Vec<ComplianceViolation>),

    /// A required external dependency is not configured.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal(detail: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

/// Map Postgres failures onto client errors where the schema explains them.
///
/// | SQLSTATE | meaning               | status |
/// |----------|-----------------------|--------|
/// | `23505`  | unique violation      | 409    |
/// | `23503`  | foreign key violation | 409    |
/// | `23514`  | check violation       | 400    |
///
/// Constraint names are schema identifiers and safe to echo back. Anything
/// else is a 500 with the detail only logged.
fn sqlx_parts(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let db_err = match err {
        sqlx::Error::RowNotFound => {
            return (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            )
        }
        sqlx::Error::Database(db_err) => db_err,
        other => return internal(other),
    };

    let constraint = db_err.constraint().unwrap_or("unknown");
    match db_err.code().as_deref() {
        Some("23505") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value violates {constraint}"),
        ),
        Some("23503") => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Referenced record is missing or still in use ({constraint})"),
        ),
        Some("23514") => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value rejected by {constraint}"),
        ),
        _ => internal(db_err),
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => sqlx_parts(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, please slow down".to_string(),
            ),
            AppError::ComplianceFailed(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "COMPLIANCE_FAILED",
                format!(
                    "Listing text has {} compliance issue(s) to fix before publishing",
                    violations.len()
                ),
            ),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::InternalError(msg) => internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let mut body = json!({ "error": message, "code": code });
        let retry_after = match self {
            AppError::ComplianceFailed(violations) => {
                body["violations"] = json!(violations);
                None
            }
            AppError::RateLimited { retry_after_secs } => Some(retry_after_secs.max(1)),
            _ => None,
        };

        let mut response = (status, axum::Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
