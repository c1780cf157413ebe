use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::{json, Value};

use crate::controller::AppState;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health_check))
        .route_layer(Extension(app_state))
}

/// Liveness plus a peek at the cache and the pick button.
async fn get_health_check(Extension(app_state): Extension<AppState>) -> (StatusCode, Json<Value>) {
    let cached = app_state.session.cached_restaurants().await.len();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "cached_restaurants": cached,
            "pick_ready": app_state.pick_trigger.is_ready(),
        })),
    )
}
