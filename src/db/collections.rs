use serde::Deserialize;
use sqlx::PgPool;

use crate::db::models::Collection;

const COLLECTION_SELECT: &str = r#"
    SELECT
        c.id,
        c.collection_slug,
        c.collection_title,
        c.collection_definition,
        COUNT(p.id) AS page_count
    FROM collection c
    LEFT JOIN page p ON p.collection_id = c.id
"#;

/// Create or update a collection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionWrite {
    pub id: Option<i64>,
    pub collection_slug: String,
    pub collection_title: String,
    pub collection_definition: String,
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(&format!(
        "{} GROUP BY c.id ORDER BY c.collection_title",
        COLLECTION_SELECT
    ))
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(&format!("{} WHERE c.id = $1 GROUP BY c.id", COLLECTION_SELECT))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Collection>, sqlx::Error> {
    sqlx::query_as::<_, Collection>(&format!(
        "{} WHERE c.collection_slug = $1 GROUP BY c.id",
        COLLECTION_SELECT
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn save(pool: &PgPool, collection: &CollectionWrite) -> Result<i64, sqlx::Error> {
    match collection.id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE collection SET
                    collection_slug = $1,
                    collection_title = $2,
                    collection_definition = $3,
                    updated_date = now()
                WHERE id = $4
                RETURNING id
                "#,
            )
            .bind(&collection.collection_slug)
            .bind(&collection.collection_title)
            .bind(&collection.collection_definition)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO collection (collection_slug, collection_title, collection_definition)
                VALUES ($1, $2, $3)
                RETURNING id
                "#,
            )
            .bind(&collection.collection_slug)
            .bind(&collection.collection_title)
            .bind(&collection.collection_definition)
            .fetch_one(pool)
            .await
        }
    }
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM collection WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
