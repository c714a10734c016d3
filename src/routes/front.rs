/**
 * Front Routes
 * Published pages, navigators and collection listings for the site renderer
 */
use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config;
use crate::content::assembler::{ActiveMenus, ContentAssembler, PublishedPage};
use crate::content::navigation::{NavNode, Navigators};
use crate::content::pagination::{Pagination, PaginationView};
use crate::content::save::HOME_SLUG;
use crate::db::{collections, models::Page, pages};
use crate::error::{AppError, AppResult};
use crate::routes::{definitions, store, RequestContext};

// ============================================================================
// Response Types
// ============================================================================

/// A published page with the site navigators it is rendered with
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    #[serde(flatten)]
    pub page: PublishedPage,
    pub navigators: HashMap<String, Vec<NavNode>>,
    /// Active pages of the configured menu collections, keyed by collection id
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub active_menus: HashMap<i64, Vec<PublishedPage>>,
}

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    /// Path of the page the navigator is shown on
    pub current: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveCollectionResponse {
    pub collection_id: i64,
    pub pages: Vec<PublishedPage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPagesResponse {
    pub collection_id: i64,
    pub items: Vec<Page>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationView>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
pub async fn home(ctx: RequestContext) -> AppResult<Json<PageResponse>> {
    render(&ctx, HOME_SLUG, None).await
}

/// GET /{slug}
pub async fn page(ctx: RequestContext, Path(slug): Path<String>) -> AppResult<Json<PageResponse>> {
    render(&ctx, &slug, None).await
}

/// GET /{collection_slug}/{page_slug}
pub async fn collection_page(
    ctx: RequestContext,
    Path((collection, slug)): Path<(String, String)>,
) -> AppResult<Json<PageResponse>> {
    render(&ctx, &collection, Some(&slug)).await
}

async fn render(ctx: &RequestContext, slug: &str, page_slug: Option<&str>) -> AppResult<Json<PageResponse>> {
    let store = store()?;
    let assembler = ContentAssembler::new(&store, &store, &store, definitions());

    let page = assembler.assemble_published(slug, page_slug, ctx.today).await?;

    let mut navigators = Navigators::new(&store, &ctx.path, ctx.today);
    let navigators = navigators.collect(&config::get().front_navigators).await?;

    let mut menus = ActiveMenus::new(&assembler, ctx.today);
    let active_menus = menus.collect(&config::get().active_menu_collections).await?;

    Ok(Json(PageResponse {
        page,
        navigators,
        active_menus,
    }))
}

/// GET /api/navigation/{navigator}?current=/about
pub async fn navigation(
    ctx: RequestContext,
    Path(navigator): Path<String>,
    Query(query): Query<NavigationQuery>,
) -> AppResult<Json<Vec<NavNode>>> {
    let store = store()?;
    let current = query.current.unwrap_or_else(|| "/".to_string());

    let mut navigators = Navigators::new(&store, &current, ctx.today);
    let tree = navigators
        .get(&navigator)
        .await?
        .map(<[NavNode]>::to_vec)
        .unwrap_or_default();

    Ok(Json(tree))
}

/// GET /api/collections/{id}/pages?page=N
pub async fn collection_pages(
    ctx: RequestContext,
    Path(collection_id): Path<i64>,
) -> AppResult<Json<CollectionPagesResponse>> {
    let store = store()?;
    let pool = store.pool();

    collections::find_by_id(pool, collection_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("collection {}", collection_id)))?;

    let pagination = Pagination::from_request(&ctx.path_and_query, &config::get().pagination);
    let items = pages::find_published_collection_pages(
        pool,
        collection_id,
        ctx.today,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;
    let total = pages::count_published_collection_pages(pool, collection_id, ctx.today).await?;

    tracing::debug!(
        collection_id,
        page = pagination.current_page(),
        total,
        "Listed collection pages"
    );

    Ok(Json(CollectionPagesResponse {
        collection_id,
        items,
        total,
        pagination: pagination.view(total),
    }))
}

/// GET /api/collections/{id}/active - pages dated today or later, newest first
pub async fn active_collection_pages(
    ctx: RequestContext,
    Path(collection_id): Path<i64>,
) -> AppResult<Json<ActiveCollectionResponse>> {
    let store = store()?;

    collections::find_by_id(store.pool(), collection_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("collection {}", collection_id)))?;

    let assembler = ContentAssembler::new(&store, &store, &store, definitions());
    let mut menus = ActiveMenus::new(&assembler, ctx.today);
    let pages = menus.get(collection_id).await?.to_vec();

    Ok(Json(ActiveCollectionResponse { collection_id, pages }))
}
