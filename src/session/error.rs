use thiserror::Error;

use crate::providers::{LocationError, SearchError};

/// Everything a pick can fail with. The `Display` text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PickError {
    #[error("{0}")]
    LocationUnavailable(String),

    #[error("Failed to fetch restaurant. {0}")]
    SearchFailed(String),

    #[error("No open restaurants found.")]
    NoResultsFound,
}

impl From<LocationError> for PickError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::NotSupported => {
                PickError::LocationUnavailable("Geolocation is not supported.".to_string())
            }
            LocationError::Denied | LocationError::Unavailable => {
                PickError::LocationUnavailable("Failed to get your location.".to_string())
            }
        }
    }
}

impl From<SearchError> for PickError {
    fn from(e: SearchError) -> Self {
        PickError::SearchFailed(e.to_string())
    }
}
