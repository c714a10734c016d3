/**
 * Admin Navigation Routes
 * Navigator listing, structure editor, save and delete
 */
use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};

use crate::content::alerts::Alert;
use crate::content::definitions::{DefinitionResolver, NavigatorDefinition};
use crate::content::navigation::{build_navigation, NavNode};
use crate::content::save::{self, NavItemInput};
use crate::db::navigation;
use crate::error::{AppError, AppResult};
use crate::routes::{definitions, store, RequestContext, SuccessResponse};

#[derive(Debug, Serialize)]
pub struct NavigatorListResponse {
    pub navigators: Vec<NavigatorDefinition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

/// Navigator as the editor sees it: every entry, published or not
#[derive(Debug, Serialize)]
pub struct NavigationEditResponse {
    pub navigator: String,
    pub items: Vec<NavNode>,
}

/// Body for POST /api/admin/navigation/{navigator}. Entries listed in `delete`
/// are removed after the save.
#[derive(Debug, Deserialize)]
pub struct SaveNavigationRequest {
    #[serde(default)]
    pub items: Vec<NavItemInput>,
    #[serde(default)]
    pub delete: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SaveNavigationResponse {
    pub success: bool,
    pub ids: Vec<i64>,
    pub deleted: u64,
}

/// GET /api/admin/navigation
pub async fn list_navigators() -> Json<NavigatorListResponse> {
    Json(match definitions().navigators() {
        Ok(navigators) => NavigatorListResponse {
            navigators,
            alerts: Vec::new(),
        },
        Err(err) => NavigatorListResponse {
            navigators: Vec::new(),
            alerts: vec![Alert::from(&err)],
        },
    })
}

/// GET /api/admin/navigation/{navigator}
pub async fn edit_navigation(
    ctx: RequestContext,
    Path(navigator): Path<String>,
) -> AppResult<Json<NavigationEditResponse>> {
    let store = store()?;
    let rows = navigation::find_navigation_structure(store.pool(), &navigator).await?;
    let items = build_navigation(&rows, None, false, ctx.today).unwrap_or_default();

    Ok(Json(NavigationEditResponse { navigator, items }))
}

/// POST /api/admin/navigation/{navigator}
pub async fn save_navigation(
    Path(navigator): Path<String>,
    Json(request): Json<SaveNavigationRequest>,
) -> AppResult<Json<SaveNavigationResponse>> {
    let store = store()?;

    let ids = save::save_navigation(&store, &navigator, &request.items).await?;
    let deleted = navigation::delete_by_ids(store.pool(), &navigator, &request.delete).await?;
    if deleted > 0 {
        tracing::info!(navigator = %navigator, deleted, "Navigation entries deleted");
    }

    Ok(Json(SaveNavigationResponse {
        success: true,
        ids,
        deleted,
    }))
}

/// DELETE /api/admin/navigation/{navigator}/{id}
pub async fn delete_navigation_entry(
    Path((navigator, id)): Path<(String, i64)>,
) -> AppResult<Json<SuccessResponse>> {
    let store = store()?;
    let deleted = navigation::delete_by_ids(store.pool(), &navigator, &[id]).await?;
    if deleted == 0 {
        return Err(AppError::not_found(format!(
            "navigation entry {} in '{}'",
            id, navigator
        )));
    }

    tracing::info!(navigator = %navigator, nav_id = id, "Navigation entry deleted");
    Ok(Json(SuccessResponse::ok()))
}
