pub mod health;
pub mod provision;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::db::Connector;
use crate::AppState;

pub fn router<C: Connector + 'static>(state: AppState<C>) -> Router {
    Router::new()
        .route("/health", get(health::health_check::<C>))
        .route("/provision", post(provision::provision::<C>))
        .layer(TraceLayer::new_for_http())
        // Events are small; 1 MB leaves room for long caller-supplied statement lists.
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}
