use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use pick_a_restaurant::config::Config;
use pick_a_restaurant::controller::{self, AppState};
use pick_a_restaurant::providers::google_places::GooglePlacesClient;
use pick_a_restaurant::providers::reported_location::ReportedLocation;
use pick_a_restaurant::repositories::cache_repo::CacheStore;
use pick_a_restaurant::repositories::key_value_store::JsonFileStore;
use pick_a_restaurant::session::{PickerSession, SessionSignal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    info!("Starting restaurant picker in {} environment", config.environment);

    let store = Arc::new(JsonFileStore::open(&config.cache_file));
    let reported_location = Arc::new(ReportedLocation::new(config.seed_location()));
    let places = GooglePlacesClient::new(
        config.google_places_api_key.clone(),
        config.places_base_url.clone(),
        config.page_token_delay(),
    )
    .context("Failed to build the places client")?;

    if config.disable_geolocation {
        warn!("Geolocation is disabled, picks will fail until it is switched back on");
    }

    let session = Arc::new(PickerSession::new(
        CacheStore::new(store),
        config.location_provider(reported_location.clone()),
        Arc::new(places),
        config.session_settings(),
    ));

    let mut signals = session.subscribe();
    tokio::spawn(async move {
        loop {
            match signals.recv().await {
                Ok(SessionSignal::Reset) => info!("Session reset to its initial state"),
                Ok(SessionSignal::Displayed(restaurant)) => {
                    info!("Displaying {} ({})", restaurant.name, restaurant.maps_link())
                }
                Ok(SessionSignal::Error(message)) => info!("Displaying error: {}", message),
                Err(RecvError::Lagged(skipped)) => warn!("Missed {} session signals", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    session.on_startup().await;
    let monitor = session.spawn_location_monitor(config.location_check_interval());

    let app_state = AppState::new(session, reported_location);
    let served = controller::serve(app_state, &config, shutdown_signal()).await;

    monitor.shutdown().await;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c due to: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
