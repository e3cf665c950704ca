use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::db::Connector;
use crate::models::ConnectionOptions;
use crate::AppState;

/// Connects with the environment's default connection settings and runs `SELECT 1`.
pub async fn health_check<C: Connector>(State(state): State<AppState<C>>) -> (StatusCode, Json<Value>) {
    match state.provisioner.ping(&ConnectionOptions::default()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected" })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "db": e.to_string() })),
        ),
    }
}
