use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{
    db::Connector,
    error::ProvisionError,
    middleware::admin_key::AdminKey,
    models::{FailureInfo, ProvisionRequest, ProvisioningResult},
    AppState,
};

pub async fn provision<C: Connector>(
    State(state): State<AppState<C>>,
    _auth: AdminKey,
    Json(body): Json<ProvisionRequest>,
) -> Result<Json<ProvisioningResult>, (StatusCode, Json<Value>)> {
    state.provisioner.execute(&body).await.map(Json).map_err(|e| {
        tracing::error!(schema = ?body.schema, "provisioning failed: {e}");
        error_response(&e)
    })
}

fn error_response(err: &ProvisionError) -> (StatusCode, Json<Value>) {
    let status = match err {
        ProvisionError::MissingField(_) | ProvisionError::InvalidIdentifier { .. } => {
            StatusCode::BAD_REQUEST
        }
        ProvisionError::Connect { .. } => StatusCode::BAD_GATEWAY,
        ProvisionError::Statement { .. } | ProvisionError::Close(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let mut body = json!({ "error": err.to_string() });
    if let ProvisionError::Statement { index, .. } = err {
        body["statement"] = json!(index);
    }
    if let Some(db_err) = err.database_error() {
        body["details"] = json!(FailureInfo::from(db_err));
    }

    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::db::mock::MockConnector;
    use crate::services::{PlanPolicy, Provisioner};
    use crate::AppState;

    fn app(connector: &MockConnector) -> Router {
        let config = Config {
            host: "127.0.0.1".into(),
            port: 0,
            admin_key: "letmein".into(),
            plan_policy: PlanPolicy::default(),
        };
        crate::routes::router(AppState {
            provisioner: Arc::new(Provisioner::new(connector.clone(), config.plan_policy)),
            config: Arc::new(config),
        })
    }

    async fn post(app: Router, key: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut req = Request::post("/provision").header("content-type", "application/json");
        if let Some(key) = key {
            req = req.header("X-Admin-Key", key);
        }
        let resp = app
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_key() {
        let connector = MockConnector::new();
        let (status, _) = post(app(&connector), None, json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = post(app(&connector), Some("nope"), json!({})).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(connector.state().connects, 0);
    }

    #[tokio::test]
    async fn returns_credentials_in_default_mode() {
        let connector = MockConnector::new();
        let (status, body) = post(
            app(&connector),
            Some("letmein"),
            json!({ "user": "admin", "schema": "acme", "schema_password": "s3cret" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "username": "acme", "password": "s3cret" }));
    }

    #[tokio::test]
    async fn returns_outcomes_in_queries_mode() {
        let connector = MockConnector::new();
        let (status, body) = post(
            app(&connector),
            Some("letmein"),
            json!({ "queries": [
                { "query": "SELECT 1", "required": true },
                { "query": "BAD SQL" }
            ] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0], json!({ "rows": [{ "?column?": 1 }] }));
        assert!(body[1]["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn maps_errors_to_statuses() {
        let connector = MockConnector::new();
        let (status, body) = post(app(&connector), Some("letmein"), json!({ "user": "admin" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("missing required field `schema`"));

        let (status, body) = post(
            app(&connector),
            Some("letmein"),
            json!({ "queries": [{ "query": "BAD", "required": true }] }),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["statement"], json!(0));
        assert!(body["details"]["message"].is_string());

        let refusing = MockConnector::refusing();
        let (status, _) = post(
            app(&refusing),
            Some("letmein"),
            json!({ "queries": [] }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn health_reports_database_reachability() {
        let ok = app(&MockConnector::new())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let down = app(&MockConnector::refusing())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(down.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
