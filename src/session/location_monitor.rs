use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::helpers::distance::haversine_distance;
use crate::models::coordinate::Coordinate;
use crate::providers::LocationError;
use crate::session::PickerSession;

/// 5 miles.
pub const SIGNIFICANT_DISTANCE_THRESHOLD_METERS: f64 = 8_046.72;
/// 10 minutes.
pub const LOCATION_CHECK_INTERVAL: Duration = Duration::from_millis(600_000);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocationCheck {
    /// No earlier location to compare against.
    FirstFix,
    Stable { distance_meters: f64 },
    SignificantChange { distance_meters: f64 },
}

pub fn classify_move(previous: Option<Coordinate>, current: Coordinate) -> LocationCheck {
    let Some(previous) = previous else {
        return LocationCheck::FirstFix;
    };

    let distance_meters = haversine_distance(previous, current);
    if distance_meters > SIGNIFICANT_DISTANCE_THRESHOLD_METERS {
        LocationCheck::SignificantChange { distance_meters }
    } else {
        LocationCheck::Stable { distance_meters }
    }
}

impl PickerSession {
    /// Samples the current location and resets the session when the user
    /// has moved more than five miles since the last sample. The new
    /// location is recorded either way.
    pub async fn check_for_significant_change(&self) -> Result<LocationCheck, LocationError> {
        let current = self.location_provider.current_location().await?;

        let mut state = self.state.lock().await;
        let check = classify_move(state.location, current);
        if let LocationCheck::SignificantChange { distance_meters } = check {
            info!("Moved {:.0}m since last location check", distance_meters);
            self.clear_locked(&mut state, "significant location change");
        }

        state.location = Some(current);
        if let Err(e) = self.cache.write_location(current) {
            warn!("Failed to persist location due to: {}", e);
        }

        Ok(check)
    }

    /// Location check for background callers: failures are logged, never surfaced.
    pub async fn run_location_check(&self) {
        match self.check_for_significant_change().await {
            Ok(check) => debug!("Location check: {:?}", check),
            Err(e) => warn!("Failed to get your location: {}", e),
        }
    }

    /// Re-runs the location check every `every` until the handle is shut down.
    /// The first check fires one period after spawning; startup does its own.
    pub fn spawn_location_monitor(self: &Arc<Self>, every: Duration) -> MonitorHandle {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let session = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Location monitor started, checking every {:?}", every);

            loop {
                tokio::select! {
                    biased;

                    _ = cancelled.cancelled() => {
                        info!("Location monitor shutting down");
                        break;
                    }

                    _ = ticker.tick() => {
                        session.run_location_check().await;
                    }
                }
            }
        });

        MonitorHandle { token, task }
    }
}

pub struct MonitorHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Cancels and waits for the monitor task to finish.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!("Location monitor task ended abnormally: {}", e);
        }
    }
}
