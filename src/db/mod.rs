pub mod collections;
pub mod elements;
pub mod media;
pub mod models;
pub mod navigation;
pub mod pages;
pub mod settings;
pub mod store;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use tokio::sync::OnceCell;

static DB_POOL: OnceCell<Arc<PgPool>> = OnceCell::const_new();

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/cms".to_string()),
            max_connections: std::env::var("DB_POOL_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: std::env::var("DB_POOL_MIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}

pub async fn init_pool(config: Option<DbConfig>) -> Result<Arc<PgPool>, sqlx::Error> {
    let config = config.unwrap_or_default();

    tracing::info!("Initializing database connection pool...");
    tracing::debug!(
        "Database URL: {}",
        config.url.replace(
            |c: char| !c.is_ascii_alphanumeric() && c != ':' && c != '/' && c != '@' && c != '.',
            "*"
        )
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(std::time::Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").fetch_one(&pool).await?;

    tracing::info!("Database connection pool initialized successfully");

    let pool = Arc::new(pool);
    let _ = DB_POOL.set(pool.clone());

    Ok(pool)
}

pub fn get_pool() -> Option<Arc<PgPool>> {
    DB_POOL.get().cloned()
}

pub async fn health_check() -> Result<std::time::Duration, sqlx::Error> {
    let pool = get_pool()
        .ok_or_else(|| sqlx::Error::Configuration("Database pool not initialized".into()))?;

    let start = std::time::Instant::now();
    sqlx::query("SELECT 1").fetch_one(pool.as_ref()).await?;

    Ok(start.elapsed())
}

/// Idempotent schema set-up. Page deletion cascades to elements, settings and
/// navigation entries through foreign keys.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collection (
            id BIGSERIAL PRIMARY KEY,
            collection_slug TEXT UNIQUE NOT NULL,
            collection_title TEXT NOT NULL,
            collection_definition TEXT NOT NULL,
            created_by BIGINT,
            created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_by BIGINT,
            updated_date TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media (
            id BIGSERIAL PRIMARY KEY,
            filename TEXT NOT NULL,
            width INTEGER,
            height INTEGER,
            feature BOOLEAN NOT NULL DEFAULT false,
            caption TEXT,
            mime_type TEXT,
            optimized TEXT NOT NULL DEFAULT 'new',
            created_by BIGINT,
            created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_by BIGINT,
            updated_date TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS page (
            id BIGSERIAL PRIMARY KEY,
            collection_id BIGINT REFERENCES collection(id),
            page_slug TEXT NOT NULL,
            template TEXT NOT NULL,
            title TEXT NOT NULL,
            sub_title TEXT,
            meta_description TEXT,
            published_date DATE,
            media_id BIGINT REFERENCES media(id) ON DELETE SET NULL,
            created_by BIGINT,
            created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_by BIGINT,
            updated_date TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_page_slug ON page(COALESCE(collection_id, 0), page_slug)",
        "CREATE INDEX IF NOT EXISTS idx_page_published_date ON page(published_date DESC)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS page_element (
            id BIGSERIAL PRIMARY KEY,
            page_id BIGINT NOT NULL REFERENCES page(id) ON DELETE CASCADE,
            block_key TEXT NOT NULL,
            template TEXT NOT NULL,
            element_sort INTEGER NOT NULL DEFAULT 1,
            title TEXT,
            content TEXT,
            excerpt TEXT,
            collection_id BIGINT REFERENCES collection(id) ON DELETE SET NULL,
            gallery_id BIGINT,
            embedded TEXT,
            media_id BIGINT REFERENCES media(id) ON DELETE SET NULL,
            created_by BIGINT,
            created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_by BIGINT,
            updated_date TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_page_element_page_block
            ON page_element(page_id, block_key, element_sort)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS data_store (
            id BIGSERIAL PRIMARY KEY,
            category TEXT NOT NULL,
            page_id BIGINT REFERENCES page(id) ON DELETE CASCADE,
            element_id BIGINT REFERENCES page_element(id) ON DELETE CASCADE,
            setting_key TEXT NOT NULL,
            setting_value TEXT,
            created_by BIGINT,
            created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_by BIGINT,
            updated_date TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_data_store_category ON data_store(category, setting_key)",
        "CREATE INDEX IF NOT EXISTS idx_data_store_page ON data_store(page_id)",
        "CREATE INDEX IF NOT EXISTS idx_data_store_element ON data_store(element_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS navigation (
            id BIGSERIAL PRIMARY KEY,
            navigator TEXT NOT NULL,
            parent_id BIGINT REFERENCES navigation(id) ON DELETE CASCADE,
            sort INTEGER NOT NULL DEFAULT 1,
            page_id BIGINT REFERENCES page(id) ON DELETE CASCADE,
            collection_id BIGINT REFERENCES collection(id) ON DELETE CASCADE,
            title TEXT,
            url TEXT,
            created_by BIGINT,
            created_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_by BIGINT,
            updated_date TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_navigation_navigator ON navigation(navigator, sort)
        "#,
    )
    .execute(pool)
    .await?;

    // The app alert slot is a single row that is updated in place
    sqlx::query(
        r#"
        INSERT INTO data_store (category, setting_key, setting_value)
        SELECT 'piton', 'appAlert', NULL
        WHERE NOT EXISTS (
            SELECT 1 FROM data_store WHERE category = 'piton' AND setting_key = 'appAlert'
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}
