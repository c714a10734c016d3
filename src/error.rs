//! Request-level error type shared by mappers and handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::routes::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A business rule was broken (home slug rename, self-parented navigation, ...)
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Storage rejected a write; `rule` names the business rule shown to the user
    #[error("persistence failure ({rule}): {source}")]
    Persistence {
        rule: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    /// Translate constraint violations into a user-facing rule; anything else stays a
    /// plain database error.
    pub fn persistence(err: sqlx::Error, rule: impl Into<String>) -> Self {
        let is_constraint = err
            .as_database_error()
            .map(|db| db.is_unique_violation() || db.is_foreign_key_violation())
            .unwrap_or(false);

        if is_constraint {
            Self::Persistence {
                rule: rule.into(),
                source: err,
            }
        } else {
            Self::Database(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Integrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Persistence { .. } => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::NotFound(what) => ErrorResponse::new("Not found", Some(what.clone())),
            AppError::BadRequest(msg) => ErrorResponse::new("Bad request", Some(msg.clone())),
            AppError::Unauthorized(msg) => ErrorResponse::new(msg.clone(), None),
            AppError::Integrity(msg) => {
                tracing::warn!(error = %msg, "integrity violation");
                ErrorResponse::new("Integrity violation", Some(msg.clone()))
            }
            AppError::Persistence { rule, source } => {
                tracing::warn!(rule = %rule, error = %source, "write rejected by storage");
                ErrorResponse::new(rule.clone(), None)
            }
            AppError::ServiceUnavailable(msg) => ErrorResponse::new(msg.clone(), None),
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                ErrorResponse::new("Database error", None)
            }
        };

        (status, Json(body)).into_response()
    }
}
