use sqlx::PgPool;

use crate::db::models::MediaRecord;

/// Media library page, newest upload first.
pub async fn find_all(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<MediaRecord>, sqlx::Error> {
    sqlx::query_as::<_, MediaRecord>(
        r#"
        SELECT id, filename, width, height, feature, caption, mime_type, optimized, created_date
        FROM media
        ORDER BY created_date DESC, id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM media")
        .fetch_one(pool)
        .await
}
