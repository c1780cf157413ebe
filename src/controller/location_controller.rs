use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::put;
use axum::{Extension, Json, Router};
use tracing::warn;

use crate::controller::AppState;
use crate::models::coordinate::Coordinate;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/location", put(report_location))
        .route_layer(Extension(app_state))
}

/// The device's geolocation callback lands here.
pub async fn report_location(
    Extension(app_state): Extension<AppState>,
    Json(body): Json<Coordinate>,
) -> impl IntoResponse {
    if !body.is_valid() {
        warn!("Rejected out of range location: {:?}", body);
        return (StatusCode::BAD_REQUEST, "Latitude or longitude out of range").into_response();
    }

    app_state.reported_location.report(body);
    (StatusCode::OK, "Location updated").into_response()
}
