//! HTTP surface: router assembly and request handlers

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod export;
pub mod pages;

/// Create the application router with all routes and middleware attached
///
/// Page flows render HTML; export flows stream file downloads or JSON error
/// bodies. The state owns the active connection config.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/database/connect", post(pages::connect))
        .route("/database/view-table", post(pages::view_table))
        .route("/database/disconnect", post(pages::disconnect))
        .route("/database/export/{format}/{table_name}", get(export::export_table))
        .route("/database/export-query", post(export::export_query))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
