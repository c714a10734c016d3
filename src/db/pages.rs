//! Page queries. Every select joins the collection and the feature media so
//! callers get a complete `Page` in one round trip.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::content::save::PageWrite;
use crate::db::models::Page;

const PAGE_SELECT: &str = r#"
    SELECT
        p.id,
        p.collection_id,
        c.collection_slug,
        c.collection_title,
        p.page_slug,
        p.template,
        p.title,
        p.sub_title,
        p.meta_description,
        p.published_date,
        p.media_id,
        m.filename AS media_filename,
        m.width AS media_width,
        m.height AS media_height,
        m.feature AS media_feature,
        m.caption AS media_caption,
        p.created_date,
        p.updated_date
    FROM page p
    LEFT JOIN collection c ON p.collection_id = c.id
    LEFT JOIN media m ON p.media_id = m.id
"#;

/// Publication filter for the content listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Pending,
    Published,
}

/// `all`, `pages` (no collection) or a collection slug
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Pages,
    Collection(String),
}

impl TypeFilter {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => TypeFilter::All,
            Some("pages") => TypeFilter::Pages,
            Some(slug) => TypeFilter::Collection(slug.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub status: StatusFilter,
    pub kind: TypeFilter,
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ContentFilter, today: NaiveDate) {
    qb.push(" WHERE 1 = 1");

    match filter.status {
        StatusFilter::All => {}
        StatusFilter::Published => {
            qb.push(" AND p.published_date <= ").push_bind(today);
        }
        StatusFilter::Pending => {
            qb.push(" AND p.published_date > ").push_bind(today);
        }
        StatusFilter::Draft => {
            qb.push(" AND p.published_date IS NULL");
        }
    }

    match &filter.kind {
        TypeFilter::All => {}
        TypeFilter::Pages => {
            qb.push(" AND p.collection_id IS NULL");
        }
        TypeFilter::Collection(slug) => {
            qb.push(" AND c.collection_slug = ").push_bind(slug.clone());
        }
    }
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Page>, sqlx::Error> {
    let page = sqlx::query_as::<_, Page>(&format!("{} WHERE p.id = $1", PAGE_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(page.map(Page::with_media))
}

/// Published standalone page (not part of a collection)
pub async fn find_published_by_slug(
    pool: &PgPool,
    page_slug: &str,
    today: NaiveDate,
) -> Result<Option<Page>, sqlx::Error> {
    let page = sqlx::query_as::<_, Page>(&format!(
        "{} WHERE p.collection_id IS NULL AND p.page_slug = $1 AND p.published_date <= $2",
        PAGE_SELECT
    ))
    .bind(page_slug)
    .bind(today)
    .fetch_optional(pool)
    .await?;

    Ok(page.map(Page::with_media))
}

pub async fn find_published_collection_page(
    pool: &PgPool,
    collection_slug: &str,
    page_slug: &str,
    today: NaiveDate,
) -> Result<Option<Page>, sqlx::Error> {
    let page = sqlx::query_as::<_, Page>(&format!(
        "{} WHERE c.collection_slug = $1 AND p.page_slug = $2 AND p.published_date <= $3",
        PAGE_SELECT
    ))
    .bind(collection_slug)
    .bind(page_slug)
    .bind(today)
    .fetch_optional(pool)
    .await?;

    Ok(page.map(Page::with_media))
}

/// Newest first
pub async fn find_published_collection_pages(
    pool: &PgPool,
    collection_id: i64,
    today: NaiveDate,
    limit: i64,
    offset: i64,
) -> Result<Vec<Page>, sqlx::Error> {
    let pages = sqlx::query_as::<_, Page>(&format!(
        "{} WHERE p.collection_id = $1 AND p.published_date <= $2 \
         ORDER BY p.published_date DESC, p.id DESC LIMIT $3 OFFSET $4",
        PAGE_SELECT
    ))
    .bind(collection_id)
    .bind(today)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(pages.into_iter().map(Page::with_media).collect())
}

pub async fn count_published_collection_pages(
    pool: &PgPool,
    collection_id: i64,
    today: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM page WHERE collection_id = $1 AND published_date <= $2",
    )
    .bind(collection_id)
    .bind(today)
    .fetch_one(pool)
    .await
}

/// Pages of a collection dated today or later. The publish date is the day the
/// entry goes live, so drafts (no date) are left out and today is included.
const ACTIVE_COLLECTION_WHERE: &str =
    " WHERE p.collection_id = $1 AND p.published_date >= $2 ORDER BY p.published_date DESC, p.id DESC";

pub async fn find_active_collection_pages(
    pool: &PgPool,
    collection_id: i64,
    today: NaiveDate,
) -> Result<Vec<Page>, sqlx::Error> {
    let pages = sqlx::query_as::<_, Page>(&format!("{}{}", PAGE_SELECT, ACTIVE_COLLECTION_WHERE))
        .bind(collection_id)
        .bind(today)
        .fetch_all(pool)
        .await?;

    Ok(pages.into_iter().map(Page::with_media).collect())
}

/// Admin content listing; drafts sort ahead of dated pages
pub async fn find_content(
    pool: &PgPool,
    filter: &ContentFilter,
    today: NaiveDate,
    limit: i64,
    offset: i64,
) -> Result<Vec<Page>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(PAGE_SELECT);
    push_filter(&mut qb, filter, today);
    qb.push(" ORDER BY p.published_date DESC NULLS FIRST, p.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let pages = qb.build_query_as::<Page>().fetch_all(pool).await?;
    Ok(pages.into_iter().map(Page::with_media).collect())
}

pub async fn count_content(
    pool: &PgPool,
    filter: &ContentFilter,
    today: NaiveDate,
) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "SELECT COUNT(*) FROM page p LEFT JOIN collection c ON p.collection_id = c.id",
    );
    push_filter(&mut qb, filter, today);

    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Insert when `id` is empty, otherwise update. Returns the row id; updating a
/// missing row yields `RowNotFound`.
pub async fn save(pool: &PgPool, page: &PageWrite) -> Result<i64, sqlx::Error> {
    match page.id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE page SET
                    collection_id = $1,
                    template = $2,
                    title = $3,
                    sub_title = $4,
                    page_slug = $5,
                    meta_description = $6,
                    media_id = $7,
                    published_date = $8,
                    updated_date = now()
                WHERE id = $9
                RETURNING id
                "#,
            )
            .bind(page.collection_id)
            .bind(&page.template)
            .bind(&page.title)
            .bind(&page.sub_title)
            .bind(&page.page_slug)
            .bind(&page.meta_description)
            .bind(page.media_id)
            .bind(page.published_date)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO page
                    (collection_id, template, title, sub_title, page_slug,
                     meta_description, media_id, published_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(page.collection_id)
            .bind(&page.template)
            .bind(&page.title)
            .bind(&page.sub_title)
            .bind(&page.page_slug)
            .bind(&page.meta_description)
            .bind(page.media_id)
            .bind(page.published_date)
            .fetch_one(pool)
            .await
        }
    }
}

/// Elements, settings and navigation entries go with the page via cascades.
pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM page WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
