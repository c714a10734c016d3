//! Application configuration, read once from the environment.

use once_cell::sync::Lazy;
use std::path::PathBuf;

use crate::content::pagination::PaginationConfig;

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Process-wide configuration.
pub fn get() -> &'static AppConfig {
    &CONFIG
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub pagination: PaginationConfig,
    /// Character budget for element excerpts
    pub excerpt_characters: usize,
    /// Root of the JSON definition tree (templates/, definitions/)
    pub definitions_dir: PathBuf,
    /// Navigators embedded in every public page response
    pub front_navigators: Vec<String>,
    /// Collections whose active pages are embedded in every public page response
    pub active_menu_collections: Vec<i64>,
    pub jwt_secret: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            pagination: PaginationConfig::default(),
            excerpt_characters: 60,
            definitions_dir: PathBuf::from("structure"),
            front_navigators: vec!["main".to_string()],
            active_menu_collections: Vec::new(),
            jwt_secret: "default-jwt-secret-change-in-production".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let pagination = PaginationConfig {
            results_per_page: env_parse("PAGINATION_RESULTS_PER_PAGE")
                .filter(|n: &i64| *n > 0)
                .unwrap_or(defaults.pagination.results_per_page),
            adjacent_links: env_parse("PAGINATION_ADJACENT_LINKS")
                .filter(|n: &i64| *n >= 0)
                .unwrap_or(defaults.pagination.adjacent_links),
            page_param: std::env::var("PAGINATION_PAGE_PARAM")
                .unwrap_or(defaults.pagination.page_param),
            domain: std::env::var("SITE_DOMAIN").unwrap_or(defaults.pagination.domain),
        };

        let front_navigators = std::env::var("FRONT_NAVIGATORS")
            .ok()
            .map(|s| split_list(&s))
            .unwrap_or(defaults.front_navigators);

        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            pagination,
            excerpt_characters: env_parse("EXCERPT_CHARACTERS")
                .unwrap_or(defaults.excerpt_characters),
            definitions_dir: std::env::var("DEFINITIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.definitions_dir),
            front_navigators,
            active_menu_collections: std::env::var("ACTIVE_MENU_COLLECTIONS")
                .map(|s| parse_ids(&s))
                .unwrap_or(defaults.active_menu_collections),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Comma-separated ids; entries that are not numbers are skipped.
fn parse_ids(s: &str) -> Vec<i64> {
    split_list(s)
        .iter()
        .filter_map(|item| item.parse().ok())
        .collect()
}
