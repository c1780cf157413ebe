use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::providers::reported_location::ReportedLocation;
use crate::session::PickerSession;

pub mod health_check;
pub mod location_controller;
pub mod pick_controller;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<PickerSession>,
    pub reported_location: Arc<ReportedLocation>,
    pub pick_trigger: Arc<PickTrigger>,
}

impl AppState {
    pub fn new(session: Arc<PickerSession>, reported_location: Arc<ReportedLocation>) -> Self {
        Self {
            session,
            reported_location,
            pick_trigger: Arc::new(PickTrigger::default()),
        }
    }
}

/// The pick button: disabled while a pick is in flight.
#[derive(Default)]
pub struct PickTrigger {
    busy: AtomicBool,
}

impl PickTrigger {
    /// Claims the trigger, or `None` when a pick is already running.
    pub fn try_begin(&self) -> Option<PickGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PickGuard { trigger: self })
    }

    pub fn is_ready(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }
}

/// Puts the trigger back in its ready state when dropped.
pub struct PickGuard<'a> {
    trigger: &'a PickTrigger,
}

impl Drop for PickGuard<'_> {
    fn drop(&mut self) {
        self.trigger.busy.store(false, Ordering::Release);
    }
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let application = router_endpoints(app_state).layer(
        ServiceBuilder::new()
            .layer(cors_layer(&config.origins()))
            .layer(CompressionLayer::new()),
    );

    let address = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("API server listening on: {}", address);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("Error spinning up the API server")
}

/// `*` anywhere in the list opens the API to every origin.
pub fn cors_layer(origins: &[&str]) -> CorsLayer {
    let allow_origin = if origins.contains(&"*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping invalid origin {} due to: {}", origin, e);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_origin(allow_origin)
        .allow_headers([CONTENT_TYPE])
}

pub fn router_endpoints(app_state: AppState) -> Router {
    health_check::router(app_state.clone())
        .merge(pick_controller::router(app_state.clone()))
        .merge(location_controller::router(app_state))
        .fallback(page_not_found_handler)
}
