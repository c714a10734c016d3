/**
 * Admin Alert Routes
 * Read-and-clear of stored application alerts
 */
use axum::Json;

use crate::content::alerts::Alert;
use crate::db::settings;
use crate::error::AppResult;
use crate::routes::{store, SuccessResponse};

/// GET /api/admin/alerts - returns pending alerts and clears them
pub async fn take_alerts() -> AppResult<Json<Vec<Alert>>> {
    let store = store()?;
    let alerts = settings::take_app_alerts(store.pool()).await?;
    if !alerts.is_empty() {
        tracing::debug!(count = alerts.len(), "Delivered app alerts");
    }

    Ok(Json(alerts))
}

/// POST /api/admin/alerts - queue an alert for the next admin request
pub async fn add_alert(Json(alert): Json<Alert>) -> AppResult<Json<SuccessResponse>> {
    let store = store()?;
    tracing::info!(severity = ?alert.severity, heading = %alert.heading, "App alert stored");
    settings::set_app_alert(store.pool(), alert).await?;

    Ok(Json(SuccessResponse::ok()))
}
