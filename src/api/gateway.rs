//! Routes called by the payment gateway.
//!
//! Both verification routes always answer 200 with an XML document. Recording the
//! inbound request is best effort and never changes the answer.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Local;

use super::AppState;
use crate::response::{compose_callback_result, AvailabilityResponse, CONTENT_TYPE};
use crate::store::{CallbackData, CallbackKind, CallbackSink, SettingsSource};

type QueryParams = Option<Query<BTreeMap<String, String>>>;

fn query_params(query: QueryParams) -> BTreeMap<String, String> {
    query.map(|Query(params)| params).unwrap_or_default()
}

fn non_empty<'a>(params: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    params.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn xml_response(xml: String) -> Response {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], xml).into_response()
}

fn record_request(
    sink: &impl CallbackSink,
    kind: CallbackKind,
    params: &BTreeMap<String, String>,
) {
    let Some(token) = non_empty(params, "trx_id") else {
        return;
    };

    let data = CallbackData::new(kind, token, params.clone());
    if let Err(e) = sink.record(token, data) {
        tracing::warn!(token, "Failed to record {:?} callback: {}", kind, e);
    }
}

/// Payment availability check (`CPAReq`)
pub async fn operation_check(State(state): State<Arc<AppState>>, query: QueryParams) -> Response {
    let params = query_params(query);
    let config = state.store.snapshot();

    let order_id = non_empty(&params, "o.order_id").unwrap_or("1");
    record_request(state.store.as_ref(), CallbackKind::CpaReq, &params);

    let request_forces_aft = params.get("paymentId").is_some_and(|id| id == "aft");
    tracing::info!(order_id, request_forces_aft, "Payment availability check");

    let xml = AvailabilityResponse::from_config(order_id, &config, request_forces_aft).to_xml();
    tracing::debug!("Availability response:\n{}", xml);

    xml_response(xml)
}

/// Payment result registration (`RPReq`)
pub async fn operation_callback(State(state): State<Arc<AppState>>, query: QueryParams) -> Response {
    let params = query_params(query);
    record_request(state.store.as_ref(), CallbackKind::RpReq, &params);

    let result_code = params.get("result_code").map(String::as_str);
    tracing::info!(result_code = result_code.unwrap_or(""), "Payment result callback");

    xml_response(compose_callback_result(result_code))
}

/// Liveness check
pub async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "time": Local::now().naive_local(),
    }))
}
