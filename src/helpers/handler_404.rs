use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn page_not_found_handler(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::IM_A_TEAPOT,
        Json(json!({ "error": format!("Nothing to pick at {}, try POST /pick", uri.path()) })),
    )
}
