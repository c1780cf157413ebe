//! External collaborators the picker depends on: where the user is, and
//! what is open nearby.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::coordinate::Coordinate;
use crate::models::restaurant::Restaurant;

pub mod google_places;
pub mod reported_location;

/// 10 miles.
pub const SEARCH_RADIUS_METERS: f64 = 16_093.4;
pub const RESTAURANT_CATEGORY: &str = "restaurant";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("location permission denied")]
    Denied,

    #[error("location unavailable")]
    Unavailable,

    #[error("geolocation is not supported")]
    NotSupported,
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest {
    pub center: Coordinate,
    pub radius_meters: f64,
    pub category: String,
    pub open_now: bool,
}

impl SearchRequest {
    /// Open restaurants within ten miles of `center`.
    pub fn open_restaurants_near(center: Coordinate) -> Self {
        Self {
            center,
            radius_meters: SEARCH_RADIUS_METERS,
            category: RESTAURANT_CATEGORY.to_string(),
            open_now: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchStatus {
    Ok,
    ZeroResults,
    Other(String),
}

impl SearchStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "OK" => SearchStatus::Ok,
            "ZERO_RESULTS" => SearchStatus::ZeroResults,
            other => SearchStatus::Other(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SearchStatus::Ok)
    }
}

/// Opaque handle for the page after the one it came with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageToken(pub String);

#[derive(Clone, Debug, PartialEq)]
pub struct SearchPage {
    pub status: SearchStatus,
    pub results: Vec<Restaurant>,
    pub next_page: Option<PageToken>,
}

/// Paginated nearby search. A page with `next_page == None` is the last one.
#[async_trait]
pub trait NearbySearch: Send + Sync {
    async fn first_page(&self, request: &SearchRequest) -> Result<SearchPage, SearchError>;

    async fn next_page(&self, token: &PageToken) -> Result<SearchPage, SearchError>;
}
