//! HTTP surface: gateway verification routes plus the tester JSON routes.

pub mod error;
pub mod gateway;
pub mod tester;

use std::sync::Arc;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::store::FileStore;

pub use error::AppError;

pub struct AppState {
    pub store: Arc<FileStore>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(FileStore::new(config.data_dir.clone())),
            config,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/operation/check",
            get(gateway::operation_check).post(gateway::operation_check),
        )
        .route(
            "/operation/callback",
            get(gateway::operation_callback).post(gateway::operation_callback),
        )
        .route("/ping", get(gateway::ping))
        .route("/tester/settings", get(tester::get_settings))
        .route("/tester/save_settings", post(tester::save_settings))
        .route("/tester/create_order", post(tester::create_order))
        .route("/tester/get_callbacks", get(tester::get_callbacks))
        .route("/tester/get_callback_details", get(tester::get_callback_details))
        .route("/tester/get_cards", get(tester::get_cards))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}
