use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use tracing::warn;

use crate::controller::AppState;
use crate::models::restaurant::RestaurantCard;
use crate::session::PickError;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/pick", post(pick_restaurant))
        .route("/restaurants", get(retrieve_cached_restaurants))
        .route_layer(Extension(app_state))
}

fn status_for(error: &PickError) -> StatusCode {
    match error {
        PickError::LocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        PickError::SearchFailed(_) => StatusCode::BAD_GATEWAY,
        PickError::NoResultsFound => StatusCode::NOT_FOUND,
    }
}

pub async fn pick_restaurant(Extension(app_state): Extension<AppState>) -> impl IntoResponse {
    let Some(_pick_guard) = app_state.pick_trigger.try_begin() else {
        return (StatusCode::CONFLICT, Json(json!({ "error": "Fetching..." }))).into_response();
    };

    return match app_state.session.on_user_requests_pick().await {
        Ok(restaurant) => {
            (StatusCode::OK, Json(RestaurantCard::from(&restaurant))).into_response()
        }
        Err(e) => {
            warn!("Something went wrong picking a restaurant due to: {}", e);
            (status_for(&e), Json(json!({ "error": e.to_string() }))).into_response()
        }
    };
}

pub async fn retrieve_cached_restaurants(
    Extension(app_state): Extension<AppState>,
) -> impl IntoResponse {
    let restaurants = app_state.session.cached_restaurants().await;
    (StatusCode::OK, Json(restaurants))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    use super::*;
    use crate::models::coordinate::Coordinate;
    use crate::providers::reported_location::ReportedLocation;
    use crate::providers::LocationError;
    use crate::repositories::key_value_store::MemoryStore;
    use crate::session::test_support::*;

    fn app(location: Arc<FakeLocation>, search: Arc<FakeSearch>) -> (AppState, Router) {
        let session = Arc::new(session_with(Arc::new(MemoryStore::new()), location, search));
        let state = AppState::new(session, Arc::new(ReportedLocation::new(None)));
        (state.clone(), router(state))
    }

    fn pick_request() -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/pick")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn pick_returns_ok_and_releases_the_trigger() {
        let (state, router) = app(FakeLocation::at(Coordinate::new(0.0, 0.0)), FakeSearch::paged(1, 3));

        let response = router.oneshot(pick_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.pick_trigger.is_ready());
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let (_, router) = app(FakeLocation::failing(LocationError::Denied), FakeSearch::paged(1, 3));
        let response = router.oneshot(pick_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (state, router) = app(FakeLocation::at(Coordinate::new(0.0, 0.0)), FakeSearch::paged(0, 0));
        let response = router.oneshot(pick_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(state.pick_trigger.is_ready());
    }

    #[tokio::test]
    async fn busy_trigger_rejects_a_second_pick() {
        let (state, router) = app(FakeLocation::at(Coordinate::new(0.0, 0.0)), FakeSearch::paged(1, 3));
        let _held = state.pick_trigger.try_begin().unwrap();

        let response = router.oneshot(pick_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn search_failures_are_bad_gateway() {
        assert_eq!(
            status_for(&PickError::SearchFailed("boom".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }
}
