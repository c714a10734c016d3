use sqlx::PgPool;

use crate::content::save::ElementWrite;
use crate::db::models::Element;

const ELEMENT_SELECT: &str = r#"
    SELECT
        e.id,
        e.page_id,
        e.block_key,
        e.template,
        e.element_sort,
        e.title,
        e.content,
        e.excerpt,
        e.collection_id,
        e.gallery_id,
        e.embedded,
        e.media_id,
        m.filename AS media_filename,
        m.width AS media_width,
        m.height AS media_height,
        m.feature AS media_feature,
        m.caption AS media_caption,
        e.created_date,
        e.updated_date
    FROM page_element e
    LEFT JOIN media m ON e.media_id = m.id
"#;

/// Elements for one page with their media, ordered by block then sort.
pub async fn find_by_page_id(pool: &PgPool, page_id: i64) -> Result<Vec<Element>, sqlx::Error> {
    let elements = sqlx::query_as::<_, Element>(&format!(
        "{} WHERE e.page_id = $1 ORDER BY e.block_key, e.element_sort",
        ELEMENT_SELECT
    ))
    .bind(page_id)
    .fetch_all(pool)
    .await?;

    Ok(elements.into_iter().map(Element::with_media).collect())
}

/// Elements of several pages in one query, same ordering as [`find_by_page_id`].
pub async fn find_by_page_ids(pool: &PgPool, page_ids: &[i64]) -> Result<Vec<Element>, sqlx::Error> {
    if page_ids.is_empty() {
        return Ok(Vec::new());
    }

    let elements = sqlx::query_as::<_, Element>(&format!(
        "{} WHERE e.page_id = ANY($1) ORDER BY e.block_key, e.element_sort",
        ELEMENT_SELECT
    ))
    .bind(page_ids)
    .fetch_all(pool)
    .await?;

    Ok(elements.into_iter().map(Element::with_media).collect())
}

pub async fn save(pool: &PgPool, element: &ElementWrite) -> Result<i64, sqlx::Error> {
    match element.id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE page_element SET
                    page_id = $1,
                    block_key = $2,
                    template = $3,
                    element_sort = $4,
                    title = $5,
                    content = $6,
                    excerpt = $7,
                    collection_id = $8,
                    gallery_id = $9,
                    embedded = $10,
                    media_id = $11,
                    updated_date = now()
                WHERE id = $12
                RETURNING id
                "#,
            )
            .bind(element.page_id)
            .bind(&element.block_key)
            .bind(&element.template)
            .bind(element.element_sort)
            .bind(&element.title)
            .bind(&element.content)
            .bind(&element.excerpt)
            .bind(element.collection_id)
            .bind(element.gallery_id)
            .bind(&element.embedded)
            .bind(element.media_id)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO page_element
                    (page_id, block_key, template, element_sort, title, content,
                     excerpt, collection_id, gallery_id, embedded, media_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING id
                "#,
            )
            .bind(element.page_id)
            .bind(&element.block_key)
            .bind(&element.template)
            .bind(element.element_sort)
            .bind(&element.title)
            .bind(&element.content)
            .bind(&element.excerpt)
            .bind(element.collection_id)
            .bind(element.gallery_id)
            .bind(&element.embedded)
            .bind(element.media_id)
            .fetch_one(pool)
            .await
        }
    }
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM page_element WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
