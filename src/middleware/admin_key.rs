use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::AppState;

/// Extractor that validates the `X-Admin-Key` header against `config.admin_key`.
pub struct AdminKey;

impl<C: Send + Sync> FromRequestParts<AppState<C>> for AdminKey {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<C>,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get("X-Admin-Key")
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing X-Admin-Key header" })),
            ))?;

        if key != state.config.admin_key {
            return Err((StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid admin key" }))));
        }

        Ok(AdminKey)
    }
}
