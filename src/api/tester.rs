//! JSON routes backing the tester UI: settings, test orders, recorded callbacks and
//! saved cards.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use super::error::AppError;
use super::AppState;
use crate::order::{CreateOrderRequest, CreatedOrder};
use crate::settings::SettingsUpdate;
use crate::store::SettingsSource;

/// Current settings snapshot
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<JsonValue> {
    Json(state.store.snapshot().to_json())
}

pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<SettingsUpdate>>,
) -> Result<Json<JsonValue>, AppError> {
    let Json(update) =
        payload.ok_or_else(|| AppError::ValidationError("No JSON data".to_string()))?;

    state.store.save_settings(&update)?;
    Ok(Json(json!({"success": true})))
}

/// Allocate an order id and build the gateway initiation link
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<CreateOrderRequest>>,
) -> Result<Json<CreatedOrder>, AppError> {
    let Json(request) =
        payload.ok_or_else(|| AppError::ValidationError("No JSON data".to_string()))?;

    let settings = state.store.snapshot();
    let order_id = state.store.next_order_id();
    let link = request.initiation_link(&state.config, &settings, &order_id);

    tracing::info!(order_id = %order_id, "Created test order: {}", link);
    Ok(Json(request.into_created(link, order_id)))
}

pub async fn get_callbacks(State(state): State<Arc<AppState>>) -> Json<JsonValue> {
    Json(json!({
        "success": true,
        "callbacks": state.store.load_callbacks(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CallbackDetailsQuery {
    #[serde(default)]
    pub token: String,
}

pub async fn get_callback_details(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackDetailsQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let data = state
        .store
        .find_callback(&query.token)
        .ok_or_else(|| AppError::NotFound("Callback not found".to_string()))?;

    Ok(Json(json!({"success": true, "data": data})))
}

pub async fn get_cards(State(state): State<Arc<AppState>>) -> Json<JsonValue> {
    Json(json!({
        "success": true,
        "cards": state.store.load_cards(),
    }))
}
