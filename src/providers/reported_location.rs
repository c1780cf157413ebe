use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

use crate::models::coordinate::Coordinate;
use crate::providers::{LocationError, LocationProvider};

/// Location pushed in by the device (or seeded from config). Until the first
/// report arrives the location is unavailable.
pub struct ReportedLocation {
    sender: watch::Sender<Option<Coordinate>>,
}

impl ReportedLocation {
    pub fn new(seed: Option<Coordinate>) -> Self {
        let (sender, _) = watch::channel(seed);
        Self { sender }
    }

    pub fn report(&self, location: Coordinate) {
        debug!("Device reported location {:?}", location);
        self.sender.send_replace(Some(location));
    }

    pub fn latest(&self) -> Option<Coordinate> {
        *self.sender.borrow()
    }
}

#[async_trait]
impl LocationProvider for ReportedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        self.latest().ok_or(LocationError::Unavailable)
    }
}

/// Used when geolocation is switched off: every lookup is `NotSupported`.
pub struct UnsupportedLocation;

#[async_trait]
impl LocationProvider for UnsupportedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::NotSupported)
    }
}
