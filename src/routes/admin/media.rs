/**
 * Admin Media Routes
 * Paginated media library with size variant URLs
 */
use axum::Json;
use serde::Serialize;

use crate::config;
use crate::content::media::{Media, MediaSize};
use crate::content::pagination::{Pagination, PaginationView};
use crate::db::{media, models::MediaRecord};
use crate::error::AppResult;
use crate::routes::{store, RequestContext};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUrls {
    pub original: String,
    pub xlarge: String,
    pub large: String,
    pub small: String,
    pub thumb: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(flatten)]
    pub media: Media,
    pub mime_type: Option<String>,
    pub optimized: String,
    pub urls: MediaUrls,
}

impl From<MediaRecord> for MediaItem {
    fn from(record: MediaRecord) -> Self {
        let media = record.to_media();
        let urls = MediaUrls {
            original: media.url(MediaSize::Original),
            xlarge: media.url(MediaSize::Xlarge),
            large: media.url(MediaSize::Large),
            small: media.url(MediaSize::Small),
            thumb: media.url(MediaSize::Thumb),
        };

        Self {
            media,
            mime_type: record.mime_type,
            optimized: record.optimized,
            urls,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaListResponse {
    pub items: Vec<MediaItem>,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationView>,
}

/// GET /api/admin/media?page=N
pub async fn list_media(ctx: RequestContext) -> AppResult<Json<MediaListResponse>> {
    let store = store()?;
    let pagination = Pagination::from_request(&ctx.path_and_query, &config::get().pagination);

    let records = media::find_all(store.pool(), pagination.limit(), pagination.offset()).await?;
    let total = media::count_all(store.pool()).await?;

    Ok(Json(MediaListResponse {
        items: records.into_iter().map(MediaItem::from).collect(),
        total,
        pagination: pagination.view(total),
    }))
}
