/**
 * Admin Settings Routes
 * Site, contact and social settings merged with siteSettings.json
 */
use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};

use crate::content::alerts::Alert;
use crate::content::definitions::DefinitionResolver;
use crate::content::save::{self, SettingInput};
use crate::content::settings::{self as merger, MergedSetting};
use crate::db::{models::SettingCategory, settings};
use crate::error::{AppError, AppResult};
use crate::routes::{definitions, store, SuccessResponse};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub category: SettingCategory,
    pub settings: Vec<MergedSetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
pub struct SaveSettingsRequest {
    pub settings: Vec<SettingInput>,
}

/// Only site, contact and social settings are edited here
fn site_category(raw: &str) -> AppResult<SettingCategory> {
    let category: SettingCategory = raw.parse().map_err(AppError::BadRequest)?;
    if SettingCategory::site_categories().contains(&category) {
        Ok(category)
    } else {
        Err(AppError::BadRequest(format!(
            "'{}' settings cannot be edited here",
            category
        )))
    }
}

/// GET /api/admin/settings/{category}
pub async fn edit_settings(Path(category): Path<String>) -> AppResult<Json<SettingsResponse>> {
    let category = site_category(&category)?;
    let store = store()?;

    let saved = settings::find_site_settings(store.pool(), Some(category)).await?;

    let response = match definitions().site_settings() {
        Ok(defined) => SettingsResponse {
            category,
            settings: merger::merge(&saved, &defined, Some(category.as_str())),
            alerts: Vec::new(),
        },
        Err(err) => {
            tracing::warn!(error = %err, "Site settings definition unusable");
            SettingsResponse {
                category,
                settings: merger::merge_or_passthrough(&saved, None, Some(category.as_str())),
                alerts: vec![Alert::from(&err)],
            }
        }
    };

    Ok(Json(response))
}

/// POST /api/admin/settings/{category}
pub async fn save_settings(
    Path(category): Path<String>,
    Json(request): Json<SaveSettingsRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let category = site_category(&category)?;
    let store = store()?;

    save::save_site_settings(&store, category, &request.settings).await?;
    tracing::info!(category = %category, count = request.settings.len(), "Site settings saved");

    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::admin::tests::send;
    use axum::http::StatusCode;

    #[test]
    fn test_site_category_rejects_owned_categories() {
        assert_eq!(site_category("social").unwrap(), SettingCategory::Social);
        assert!(matches!(site_category("page"), Err(AppError::BadRequest(_))));
        assert!(matches!(site_category("theme"), Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_internal_settings_are_not_exposed() {
        for method in ["GET", "POST"] {
            let body = (method == "POST").then(|| serde_json::json!({ "settings": [] }));
            let (status, body) = send(method, "/api/admin/settings/piton", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", method);
            assert_eq!(body["message"], "'piton' settings cannot be edited here");
        }
    }

    #[tokio::test]
    async fn test_element_settings_are_not_site_settings() {
        let (status, body) = send("GET", "/api/admin/settings/element", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad request");
    }
}
