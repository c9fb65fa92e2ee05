use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::AdminState;
use crate::routing::{Route, RuleDescriptor, RuleId};

/// Body of `POST /list`. Any `id` field is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateRule {
    pub from: String,
    pub to: String,
}

pub async fn list_rules(State(state): State<AdminState>) -> Json<Vec<RuleDescriptor>> {
    Json(state.registry.descriptors())
}

/// Registry mutations take the write lock and write the rule document, so they
/// run on the blocking pool rather than on a runtime worker.
pub async fn create_rule(State(state): State<AdminState>, body: Bytes) -> StatusCode {
    let request: CreateRule = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected malformed rule body");
            return StatusCode::BAD_REQUEST;
        }
    };

    let route = match Route::parse(&request.from, &request.to, &state.client) {
        Ok(route) => route,
        Err(e) => {
            tracing::warn!(from = %request.from, to = %request.to, error = %e, "Rejected invalid rule");
            return StatusCode::BAD_REQUEST;
        }
    };

    let registry = state.registry.clone();
    match tokio::task::spawn_blocking(move || registry.append(route)).await {
        Ok(id) => {
            tracing::info!(id, from = %request.from, to = %request.to, "Rule created");
            StatusCode::OK
        }
        Err(e) => {
            tracing::error!(error = %e, "Rule creation task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn delete_rule(
    State(state): State<AdminState>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    let Some(id) = params.get("id").and_then(|v| v.parse::<RuleId>().ok()) else {
        tracing::warn!(id = ?params.get("id"), "Rejected delete without a valid id");
        return StatusCode::BAD_REQUEST;
    };

    let registry = state.registry.clone();
    match tokio::task::spawn_blocking(move || registry.remove(id)).await {
        Ok(true) => {
            tracing::info!(id, "Rule deleted");
            StatusCode::OK
        }
        Ok(false) => {
            tracing::warn!(id, "Delete for unknown rule");
            StatusCode::BAD_REQUEST
        }
        Err(e) => {
            tracing::error!(id, error = %e, "Rule deletion task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub async fn method_not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
