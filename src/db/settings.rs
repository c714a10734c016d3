//! `data_store` queries: site settings, page and element settings, and the
//! application alert slot.

use sqlx::PgPool;

use crate::content::alerts::{append_alert, decode_alerts, Alert};
use crate::content::save::SettingWrite;
use crate::db::models::{Setting, SettingCategory};

const SETTING_COLUMNS: &str = "d.id, d.category, d.page_id, d.element_id, d.setting_key, \
     d.setting_value, d.created_by, d.created_date, d.updated_by, d.updated_date";

const APP_ALERT_KEY: &str = "appAlert";

/// One category, or every site-level category when `category` is `None`.
/// The alert slot is never returned as a setting.
pub async fn find_site_settings(
    pool: &PgPool,
    category: Option<SettingCategory>,
) -> Result<Vec<Setting>, sqlx::Error> {
    let categories: Vec<String> = match category {
        Some(category) => vec![category.as_str().to_string()],
        None => SettingCategory::site_categories()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
    };

    sqlx::query_as::<_, Setting>(&format!(
        "SELECT {} FROM data_store d \
         WHERE d.category = ANY($1) AND NOT (d.category = 'piton' AND d.setting_key = $2) \
         ORDER BY d.id",
        SETTING_COLUMNS
    ))
    .bind(categories)
    .bind(APP_ALERT_KEY)
    .fetch_all(pool)
    .await
}

/// Page settings plus the settings of every element on the page.
pub async fn find_page_and_element_settings(
    pool: &PgPool,
    page_id: i64,
) -> Result<Vec<Setting>, sqlx::Error> {
    sqlx::query_as::<_, Setting>(&format!(
        r#"
        SELECT {cols} FROM data_store d
        WHERE d.page_id = $1 AND d.category = 'page'
        UNION ALL
        SELECT {cols} FROM data_store d
        JOIN page_element e ON d.element_id = e.id
        WHERE e.page_id = $1 AND d.category = 'element'
        ORDER BY id
        "#,
        cols = SETTING_COLUMNS
    ))
    .bind(page_id)
    .fetch_all(pool)
    .await
}

/// Page and element settings of several pages in one query.
pub async fn find_page_and_element_settings_in_page_ids(
    pool: &PgPool,
    page_ids: &[i64],
) -> Result<Vec<Setting>, sqlx::Error> {
    if page_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Setting>(&format!(
        r#"
        SELECT {cols} FROM data_store d
        WHERE d.page_id = ANY($1) AND d.category = 'page'
        UNION ALL
        SELECT {cols} FROM data_store d
        JOIN page_element e ON d.element_id = e.id
        WHERE e.page_id = ANY($1) AND d.category = 'element'
        ORDER BY id
        "#,
        cols = SETTING_COLUMNS
    ))
    .bind(page_ids)
    .fetch_all(pool)
    .await
}

pub async fn save(pool: &PgPool, setting: &SettingWrite) -> Result<i64, sqlx::Error> {
    match setting.id {
        Some(id) => {
            sqlx::query_scalar::<_, i64>(
                r#"
                UPDATE data_store SET
                    setting_value = $1,
                    updated_date = now()
                WHERE id = $2
                RETURNING id
                "#,
            )
            .bind(&setting.setting_value)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
        }
        None => {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO data_store
                    (category, page_id, element_id, setting_key, setting_value)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(setting.category.as_str())
            .bind(setting.page_id)
            .bind(setting.element_id)
            .bind(&setting.setting_key)
            .bind(&setting.setting_value)
            .fetch_one(pool)
            .await
        }
    }
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM data_store WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Append an alert to the stored list. The row stays locked until commit.
pub async fn set_app_alert(pool: &PgPool, alert: Alert) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (i64, Option<String>)>(
        r#"
        SELECT id, setting_value FROM data_store
        WHERE category = 'piton' AND setting_key = $1
        FOR UPDATE
        "#,
    )
    .bind(APP_ALERT_KEY)
    .fetch_optional(&mut *tx)
    .await?;

    let stored = current.as_ref().and_then(|(_, value)| value.as_deref());
    let encoded = append_alert(stored, alert).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    match current {
        Some((id, _)) => {
            sqlx::query("UPDATE data_store SET setting_value = $1, updated_date = now() WHERE id = $2")
                .bind(&encoded)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO data_store (category, setting_key, setting_value) VALUES ('piton', $1, $2)",
            )
            .bind(APP_ALERT_KEY)
            .bind(&encoded)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await
}

/// Read the pending alerts and clear the slot in one statement.
pub async fn take_app_alerts(pool: &PgPool) -> Result<Vec<Alert>, sqlx::Error> {
    let stored = sqlx::query_scalar::<_, Option<String>>(
        r#"
        WITH previous AS (
            SELECT id, setting_value FROM data_store
            WHERE category = 'piton' AND setting_key = $1
            FOR UPDATE
        )
        UPDATE data_store d SET setting_value = NULL, updated_date = now()
        FROM previous
        WHERE d.id = previous.id
        RETURNING previous.setting_value
        "#,
    )
    .bind(APP_ALERT_KEY)
    .fetch_optional(pool)
    .await?
    .flatten();

    Ok(decode_alerts(stored.as_deref()))
}
