/**
 * Admin Routes
 * Content management API, every route behind `require_admin`
 */

pub mod alerts;
pub mod collections;
pub mod media;
pub mod navigation;
pub mod pages;
pub mod settings;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use crate::routes::auth::require_admin;

/// Routes relative to `/api/admin`
pub fn router() -> Router {
    Router::new()
        .route("/pages", get(pages::list_pages).post(pages::save_page))
        .route("/pages/new", get(pages::new_page))
        .route("/pages/templates", get(pages::page_templates))
        .route("/pages/{id}", get(pages::edit_page).delete(pages::delete_page))
        .route("/elements/new", get(pages::new_element))
        .route("/elements/templates", get(pages::element_templates))
        .route("/elements/{id}", delete(pages::delete_element))
        .route("/navigation", get(navigation::list_navigators))
        .route(
            "/navigation/{navigator}",
            get(navigation::edit_navigation).post(navigation::save_navigation),
        )
        .route(
            "/navigation/{navigator}/{id}",
            delete(navigation::delete_navigation_entry),
        )
        .route(
            "/settings/{category}",
            get(settings::edit_settings).post(settings::save_settings),
        )
        .route(
            "/collections",
            get(collections::list_collections).post(collections::save_collection),
        )
        .route("/collections/{id}", delete(collections::delete_collection))
        .route("/media", get(media::list_media))
        .route("/alerts", get(alerts::take_alerts).post(alerts::add_alert))
        .route_layer(middleware::from_fn(require_admin))
}
