/**
 * Admin Page Routes
 * Content listing, page editor, page and element save/delete
 */
use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::content::alerts::Alert;
use crate::content::assembler::{ContentAssembler, EditablePage};
use crate::content::definitions::{
    DefinitionResolver, ElementDefinition, PageDefinition, TemplateSummary, TemplateType,
};
use crate::content::pagination::{Pagination, PaginationView};
use crate::content::save::{self, PageWriter, SavePageRequest};
use crate::content::settings::MergedSetting;
use crate::db::models::{Page, PublishedStatus};
use crate::db::pages::{self, ContentFilter, StatusFilter, TypeFilter};
use crate::error::AppResult;
use crate::routes::{definitions, store, RequestContext, SuccessResponse};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for GET /api/admin/pages
#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    #[serde(default)]
    pub status: StatusFilter,
    /// all | pages | collection slug
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    #[serde(flatten)]
    pub page: Page,
    pub published_status: PublishedStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageListResponse {
    pub items: Vec<PageSummary>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPageQuery {
    pub template: String,
    pub collection_id: Option<i64>,
}

/// Editor form for a page that has not been saved yet
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPageResponse {
    pub template: String,
    pub collection_id: Option<i64>,
    pub definition: Option<PageDefinition>,
    pub settings: Vec<MergedSetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewElementQuery {
    pub template: String,
    pub block_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewElementResponse {
    pub template: String,
    pub block_key: String,
    pub definition: Option<ElementDefinition>,
    pub settings: Vec<MergedSetting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    #[serde(rename = "type")]
    pub kind: Option<TemplateType>,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/admin/pages?status=draft&type=blog&page=2
pub async fn list_pages(
    ctx: RequestContext,
    Query(query): Query<ContentQuery>,
) -> AppResult<Json<PageListResponse>> {
    let store = store()?;
    let pool = store.pool();

    let filter = ContentFilter {
        status: query.status,
        kind: TypeFilter::parse(query.kind.as_deref()),
    };
    let pagination = Pagination::from_request(&ctx.path_and_query, &config::get().pagination);

    let rows = pages::find_content(pool, &filter, ctx.today, pagination.limit(), pagination.offset()).await?;
    let total = pages::count_content(pool, &filter, ctx.today).await?;

    let items = rows
        .into_iter()
        .map(|page| PageSummary {
            published_status: page.published_status(ctx.today),
            page,
        })
        .collect();

    Ok(Json(PageListResponse {
        items,
        total,
        pagination: pagination.view(total),
    }))
}

/// GET /api/admin/pages/templates?type=collection
pub async fn page_templates(Query(query): Query<TemplateQuery>) -> Json<TemplateListResponse> {
    Json(match definitions().page_templates(query.kind) {
        Ok(templates) => TemplateListResponse {
            templates,
            alerts: Vec::new(),
        },
        Err(err) => TemplateListResponse {
            templates: Vec::new(),
            alerts: vec![Alert::from(&err)],
        },
    })
}

/// GET /api/admin/elements/templates
pub async fn element_templates() -> Json<TemplateListResponse> {
    Json(match definitions().element_templates() {
        Ok(templates) => TemplateListResponse {
            templates,
            alerts: Vec::new(),
        },
        Err(err) => TemplateListResponse {
            templates: Vec::new(),
            alerts: vec![Alert::from(&err)],
        },
    })
}

/// GET /api/admin/pages/new?template=about
pub async fn new_page(Query(query): Query<NewPageQuery>) -> AppResult<Json<NewPageResponse>> {
    let store = store()?;
    let assembler = ContentAssembler::new(&store, &store, &store, definitions());

    let response = match assembler.blank_settings(&query.template) {
        Ok((definition, settings)) => NewPageResponse {
            template: query.template,
            collection_id: query.collection_id,
            definition: Some(definition),
            settings,
            alerts: Vec::new(),
        },
        Err(err) => {
            tracing::warn!(template = %query.template, error = %err, "New page template unusable");
            NewPageResponse {
                template: query.template,
                collection_id: query.collection_id,
                definition: None,
                settings: Vec::new(),
                alerts: vec![Alert::from(&err)],
            }
        }
    };

    Ok(Json(response))
}

/// GET /api/admin/pages/{id}
pub async fn edit_page(ctx: RequestContext, Path(id): Path<i64>) -> AppResult<Json<EditablePage>> {
    let store = store()?;
    let assembler = ContentAssembler::new(&store, &store, &store, definitions());

    Ok(Json(assembler.assemble(id, ctx.today).await?))
}

/// POST /api/admin/pages
pub async fn save_page(
    ctx: RequestContext,
    Json(request): Json<SavePageRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let store = store()?;
    let id = save::save_page(&store, &request, ctx.today, config::get().excerpt_characters).await?;

    Ok(Json(SuccessResponse::with_id(id)))
}

/// DELETE /api/admin/pages/{id}
pub async fn delete_page(Path(id): Path<i64>) -> AppResult<Json<SuccessResponse>> {
    let store = store()?;
    save::delete_page(&store, id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/admin/elements/new?template=text&blockKey=content
pub async fn new_element(Query(query): Query<NewElementQuery>) -> AppResult<Json<NewElementResponse>> {
    let store = store()?;
    let assembler = ContentAssembler::new(&store, &store, &store, definitions());

    let response = match assembler.blank_element_settings(&query.template) {
        Ok((definition, settings)) => NewElementResponse {
            template: query.template,
            block_key: query.block_key,
            definition: Some(definition),
            settings,
            alerts: Vec::new(),
        },
        Err(err) => NewElementResponse {
            template: query.template,
            block_key: query.block_key,
            definition: None,
            settings: Vec::new(),
            alerts: vec![Alert::from(&err)],
        },
    };

    Ok(Json(response))
}

/// DELETE /api/admin/elements/{id}
pub async fn delete_element(Path(id): Path<i64>) -> AppResult<Json<SuccessResponse>> {
    let store = store()?;
    store.delete_element(id).await?;
    tracing::info!(element_id = id, "Element deleted");

    Ok(Json(SuccessResponse::ok()))
}
