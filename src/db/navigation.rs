use sqlx::PgPool;

use crate::content::save::NavigationWrite;
use crate::db::models::NavigationRow;

/// Rows for display. A collection entry is expanded into one row per collection
/// page, newest first, so the tree builder can nest or filter them like pages.
pub async fn find_navigation(pool: &PgPool, navigator: &str) -> Result<Vec<NavigationRow>, sqlx::Error> {
    sqlx::query_as::<_, NavigationRow>(
        r#"
        SELECT
            n.navigator,
            n.id,
            n.parent_id,
            n.sort,
            n.title AS nav_title,
            n.url,
            n.collection_id,
            c.collection_title,
            c.collection_slug,
            COALESCE(p.id, cp.id) AS page_id,
            COALESCE(p.title, cp.title) AS page_title,
            COALESCE(p.published_date, cp.published_date) AS published_date,
            COALESCE(p.page_slug, cp.page_slug) AS page_slug
        FROM navigation n
        LEFT JOIN page p ON n.page_id = p.id
        LEFT JOIN collection c ON n.collection_id = c.id
        LEFT JOIN page cp ON c.id = cp.collection_id
        WHERE n.navigator = $1
        ORDER BY n.sort, cp.published_date DESC
        "#,
    )
    .bind(navigator)
    .fetch_all(pool)
    .await
}

/// Rows for the navigation editor: one row per stored entry, no collection expansion.
pub async fn find_navigation_structure(
    pool: &PgPool,
    navigator: &str,
) -> Result<Vec<NavigationRow>, sqlx::Error> {
    sqlx::query_as::<_, NavigationRow>(
        r#"
        SELECT
            n.navigator,
            n.id,
            n.parent_id,
            n.sort,
            n.title AS nav_title,
            n.url,
            n.collection_id,
            c.collection_title,
            c.collection_slug,
            p.id AS page_id,
            p.title AS page_title,
            p.published_date,
            p.page_slug
        FROM navigation n
        LEFT JOIN page p ON n.page_id = p.id
        LEFT JOIN collection c ON n.collection_id = c.id
        WHERE n.navigator = $1
        ORDER BY n.sort
        "#,
    )
    .bind(navigator)
    .fetch_all(pool)
    .await
}

pub async fn save(pool: &PgPool, entry: &NavigationWrite) -> Result<i64, sqlx::Error> {
    match entry.id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE navigation SET
                    navigator = $1,
                    parent_id = $2,
                    sort = $3,
                    page_id = $4,
                    collection_id = $5,
                    title = $6,
                    url = $7,
                    updated_date = now()
                WHERE id = $8
                RETURNING id
                "#,
            )
            .bind(&entry.navigator)
            .bind(entry.parent_id)
            .bind(entry.sort)
            .bind(entry.page_id)
            .bind(entry.collection_id)
            .bind(&entry.title)
            .bind(&entry.url)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO navigation
                    (navigator, parent_id, sort, page_id, collection_id, title, url)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(&entry.navigator)
            .bind(entry.parent_id)
            .bind(entry.sort)
            .bind(entry.page_id)
            .bind(entry.collection_id)
            .bind(&entry.title)
            .bind(&entry.url)
            .fetch_one(pool)
            .await
        }
    }
}

/// Children of a deleted entry are removed by the parent foreign key.
pub async fn delete_by_ids(pool: &PgPool, navigator: &str, ids: &[i64]) -> Result<u64, sqlx::Error> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM navigation WHERE navigator = $1 AND id = ANY($2)")
        .bind(navigator)
        .bind(ids)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
