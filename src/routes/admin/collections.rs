/**
 * Admin Collection Routes
 */
use axum::{extract::Path, Json};

use crate::content::save::check_collection_deletable;
use crate::content::toolbox::clean_url;
use crate::db::collections::{self, CollectionWrite};
use crate::db::models::Collection;
use crate::error::{AppError, AppResult};
use crate::routes::{store, SuccessResponse};

/// GET /api/admin/collections
pub async fn list_collections() -> AppResult<Json<Vec<Collection>>> {
    let store = store()?;
    Ok(Json(collections::find_all(store.pool()).await?))
}

/// Clean the slug and require a title and a detail template.
fn prepare(mut collection: CollectionWrite) -> AppResult<CollectionWrite> {
    collection.collection_slug = clean_url(&collection.collection_slug);
    collection.collection_title = collection.collection_title.trim().to_string();
    collection.collection_definition = collection.collection_definition.trim().to_string();

    if collection.collection_slug.is_empty() {
        return Err(AppError::BadRequest("Collection slug is required".into()));
    }
    if collection.collection_title.is_empty() {
        return Err(AppError::BadRequest("Collection title is required".into()));
    }
    if collection.collection_definition.is_empty() {
        return Err(AppError::BadRequest("Collection template is required".into()));
    }
    Ok(collection)
}

/// POST /api/admin/collections
pub async fn save_collection(Json(request): Json<CollectionWrite>) -> AppResult<Json<SuccessResponse>> {
    let collection = prepare(request)?;
    let store = store()?;

    if let Some(existing) = collections::find_by_slug(store.pool(), &collection.collection_slug).await? {
        if Some(existing.id) != collection.id {
            return Err(AppError::BadRequest(format!(
                "Collection slug '{}' is already used by '{}'",
                collection.collection_slug, existing.collection_title
            )));
        }
    }

    let id = collections::save(store.pool(), &collection)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                AppError::not_found(format!("collection {}", collection.id.unwrap_or_default()))
            }
            e => AppError::persistence(e, "A collection with this slug already exists"),
        })?;

    tracing::info!(collection_id = id, slug = %collection.collection_slug, "Collection saved");
    Ok(Json(SuccessResponse::with_id(id)))
}

/// DELETE /api/admin/collections/{id}
pub async fn delete_collection(Path(id): Path<i64>) -> AppResult<Json<SuccessResponse>> {
    let store = store()?;
    let pool = store.pool();

    let collection = collections::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("collection {}", id)))?;
    check_collection_deletable(&collection)?;

    collections::delete(pool, id)
        .await
        .map_err(|e| AppError::persistence(e, "Collection is still in use"))?;

    tracing::info!(collection_id = id, slug = %collection.collection_slug, "Collection deleted");
    Ok(Json(SuccessResponse::ok()))
}
