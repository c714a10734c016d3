//! Postgres implementation of the content layer's storage traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;

use crate::content::assembler::{ElementSource, PageSource, SettingsSource};
use crate::content::navigation::NavigationSource;
use crate::content::save::{
    ElementWrite, NavigationWrite, NavigationWriter, PageWrite, PageWriter, SettingWrite, SettingWriter,
};
use crate::db::models::{Element, NavigationRow, Page, Setting};
use crate::db::{elements, navigation, pages, settings};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a write failure: a missing row on update is a 404, constraint
/// violations carry the business rule.
fn write_error(err: sqlx::Error, what: &str, rule: &str) -> AppError {
    match err {
        sqlx::Error::RowNotFound => AppError::not_found(what.to_string()),
        err => AppError::persistence(err, rule),
    }
}

#[async_trait]
impl PageSource for PgStore {
    async fn page_by_id(&self, id: i64) -> AppResult<Option<Page>> {
        Ok(pages::find_by_id(&self.pool, id).await?)
    }

    async fn published_page_by_slug(&self, slug: &str, today: NaiveDate) -> AppResult<Option<Page>> {
        Ok(pages::find_published_by_slug(&self.pool, slug, today).await?)
    }

    async fn published_collection_page_by_slug(
        &self,
        collection_slug: &str,
        page_slug: &str,
        today: NaiveDate,
    ) -> AppResult<Option<Page>> {
        Ok(pages::find_published_collection_page(&self.pool, collection_slug, page_slug, today).await?)
    }

    async fn active_collection_pages(&self, collection_id: i64, today: NaiveDate) -> AppResult<Vec<Page>> {
        Ok(pages::find_active_collection_pages(&self.pool, collection_id, today).await?)
    }
}

#[async_trait]
impl ElementSource for PgStore {
    async fn elements_by_page_id(&self, page_id: i64) -> AppResult<Vec<Element>> {
        Ok(elements::find_by_page_id(&self.pool, page_id).await?)
    }

    async fn elements_by_page_ids(&self, page_ids: &[i64]) -> AppResult<Vec<Element>> {
        Ok(elements::find_by_page_ids(&self.pool, page_ids).await?)
    }
}

#[async_trait]
impl SettingsSource for PgStore {
    async fn page_and_element_settings(&self, page_id: i64) -> AppResult<Vec<Setting>> {
        Ok(settings::find_page_and_element_settings(&self.pool, page_id).await?)
    }

    async fn page_and_element_settings_in(&self, page_ids: &[i64]) -> AppResult<Vec<Setting>> {
        Ok(settings::find_page_and_element_settings_in_page_ids(&self.pool, page_ids).await?)
    }
}

#[async_trait]
impl NavigationSource for PgStore {
    async fn navigation_rows(&self, navigator: &str) -> AppResult<Vec<NavigationRow>> {
        Ok(navigation::find_navigation(&self.pool, navigator).await?)
    }
}

#[async_trait]
impl PageWriter for PgStore {
    async fn save_page(&self, page: &PageWrite) -> AppResult<i64> {
        pages::save(&self.pool, page).await.map_err(|e| {
            write_error(
                e,
                &format!("page {}", page.id.unwrap_or_default()),
                "A page with this slug already exists",
            )
        })
    }

    async fn delete_page(&self, id: i64) -> AppResult<()> {
        pages::delete(&self.pool, id).await?;
        Ok(())
    }

    async fn save_element(&self, element: &ElementWrite) -> AppResult<i64> {
        elements::save(&self.pool, element).await.map_err(|e| {
            write_error(
                e,
                &format!("element {}", element.id.unwrap_or_default()),
                "Element references a missing page, collection or media",
            )
        })
    }

    async fn delete_element(&self, id: i64) -> AppResult<()> {
        elements::delete(&self.pool, id).await?;
        Ok(())
    }
}

#[async_trait]
impl SettingWriter for PgStore {
    async fn save_setting(&self, setting: &SettingWrite) -> AppResult<i64> {
        settings::save(&self.pool, setting).await.map_err(|e| {
            write_error(
                e,
                &format!("setting {}", setting.id.unwrap_or_default()),
                "Setting references a missing page or element",
            )
        })
    }

    async fn delete_setting(&self, id: i64) -> AppResult<()> {
        settings::delete(&self.pool, id).await?;
        Ok(())
    }
}

#[async_trait]
impl NavigationWriter for PgStore {
    async fn save_navigation(&self, entry: &NavigationWrite) -> AppResult<i64> {
        navigation::save(&self.pool, entry).await.map_err(|e| {
            write_error(
                e,
                &format!("navigation entry {}", entry.id.unwrap_or_default()),
                "Navigation entry references a missing parent, page or collection",
            )
        })
    }
}
