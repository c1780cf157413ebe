use std::time::Duration;

use std::sync::Arc;

use clap::Parser;

use crate::models::coordinate::Coordinate;
use crate::providers::google_places::DEFAULT_BASE_URL;
use crate::providers::reported_location::{ReportedLocation, UnsupportedLocation};
use crate::providers::LocationProvider;
use crate::session::SessionSettings;

#[derive(Parser, Clone, Debug)]
#[command(version, about = "Picks a random open restaurant near you")]
pub struct Config {
    #[clap(env, long, default_value = "development")]
    pub environment: String,

    #[clap(env, long, default_value_t = 3000)]
    pub port: u16,

    /// Comma separated list of origins allowed to call the API.
    #[clap(env, long, default_value = "")]
    pub origin_urls: String,

    #[clap(env, long)]
    pub google_places_api_key: String,

    #[clap(env, long, default_value = DEFAULT_BASE_URL)]
    pub places_base_url: String,

    /// Where cached restaurants and the last location are kept between runs.
    #[clap(env, long, default_value = "restaurant_cache.json")]
    pub cache_file: String,

    /// Starting device location, used until one is reported.
    #[clap(env, long, requires = "longitude", allow_hyphen_values = true)]
    pub latitude: Option<f64>,

    #[clap(env, long, requires = "latitude", allow_hyphen_values = true)]
    pub longitude: Option<f64>,

    /// Ignore device reports; every pick fails with "Geolocation is not supported."
    #[clap(env, long)]
    pub disable_geolocation: bool,

    #[clap(env, long, default_value_t = 600_000)]
    pub location_check_interval_ms: u64,

    #[clap(env, long, default_value_t = 500)]
    pub pick_delay_ms: u64,

    #[clap(env, long, default_value_t = 2_000)]
    pub page_token_delay_ms: u64,
}

impl Config {
    pub fn seed_location(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate::new(latitude, longitude)),
            _ => None,
        }
    }

    /// The location source the session reads from.
    pub fn location_provider(&self, reported: Arc<ReportedLocation>) -> Arc<dyn LocationProvider> {
        if self.disable_geolocation {
            Arc::new(UnsupportedLocation)
        } else {
            reported
        }
    }

    pub fn origins(&self) -> Vec<&str> {
        self.origin_urls
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    pub fn location_check_interval(&self) -> Duration {
        Duration::from_millis(self.location_check_interval_ms)
    }

    pub fn page_token_delay(&self) -> Duration {
        Duration::from_millis(self.page_token_delay_ms)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            pick_delay: Duration::from_millis(self.pick_delay_ms),
            rng_seed: None,
        }
    }
}
