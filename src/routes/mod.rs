/**
 * Routes Module
 * API route handlers and the pieces they share
 */

pub mod admin;
pub mod auth;
pub mod front;
pub mod health;

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::convert::Infallible;

use crate::config;
use crate::content::definitions::JsonDefinitions;
use crate::db::{self, store::PgStore};
use crate::error::{AppError, AppResult};

// ============================================================================
// Shared response types
// ============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: Option<String>) -> Self {
        Self {
            error: error.into(),
            message,
        }
    }
}

/// Success response (for deletes and saves without a body)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true, id: None }
    }

    pub fn with_id(id: i64) -> Self {
        Self {
            success: true,
            id: Some(id),
        }
    }
}

// ============================================================================
// Shared state
// ============================================================================

static DEFINITIONS: Lazy<JsonDefinitions> =
    Lazy::new(|| JsonDefinitions::new(config::get().definitions_dir.clone()));

pub fn definitions() -> &'static JsonDefinitions {
    &DEFINITIONS
}

/// Store over the global pool, or 503 when the database is not connected.
pub fn store() -> AppResult<PgStore> {
    db::get_pool()
        .map(PgStore::new)
        .ok_or_else(|| AppError::ServiceUnavailable("Database not available".to_string()))
}

/// Per-request values computed once: the date used for every publish check and
/// the full request target used for pagination links.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub today: NaiveDate,
    pub path: String,
    pub path_and_query: String,
}

impl RequestContext {
    pub fn new(today: NaiveDate, uri: &axum::http::Uri) -> Self {
        Self {
            today,
            path: uri.path().to_string(),
            path_and_query: uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped uri; links must use the one the client sent
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());

        Ok(Self::new(Utc::now().date_naive(), &uri))
    }
}
