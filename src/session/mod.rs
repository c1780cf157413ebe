//! The picker session: cached nearby restaurants, the location they were
//! fetched at, and the three entry points that act on them (startup, a user
//! asking for a pick, and the periodic location check).

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::models::coordinate::Coordinate;
use crate::models::restaurant::Restaurant;
use crate::providers::{LocationProvider, NearbySearch};
use crate::repositories::cache_repo::CacheStore;

pub mod error;
pub mod location_monitor;
pub mod picker;
pub mod restaurant_fetcher;

pub use error::PickError;
pub use location_monitor::{LocationCheck, MonitorHandle};

/// Extra wait before serving a pick from cache, so the UI does not flicker.
pub const DEFAULT_PICK_DELAY: Duration = Duration::from_millis(500);

const SIGNAL_CAPACITY: usize = 16;

/// What the session tells whoever renders it.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionSignal {
    Displayed(Restaurant),
    Error(String),
    /// Cached results were discarded; the UI should return to its empty state.
    Reset,
}

#[derive(Clone, Debug)]
pub struct SessionSettings {
    pub pick_delay: Duration,
    /// Fixed seed for the pick RNG; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            pick_delay: DEFAULT_PICK_DELAY,
            rng_seed: None,
        }
    }
}

struct SessionState {
    restaurants: Vec<Restaurant>,
    location: Option<Coordinate>,
    /// Bumped on every clear so in-flight fetches can tell they are stale.
    generation: u64,
    rng: StdRng,
}

pub struct PickerSession {
    cache: CacheStore,
    location_provider: Arc<dyn LocationProvider>,
    search: Arc<dyn NearbySearch>,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    signals: broadcast::Sender<SessionSignal>,
}

impl PickerSession {
    /// Builds a session, mirroring whatever the store still holds from a
    /// previous run. `on_startup` is what clears it.
    pub fn new(
        cache: CacheStore,
        location_provider: Arc<dyn LocationProvider>,
        search: Arc<dyn NearbySearch>,
        settings: SessionSettings,
    ) -> Self {
        let record = cache.load_record();
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);

        Self {
            cache,
            location_provider,
            search,
            settings,
            state: Mutex::new(SessionState {
                restaurants: record.restaurants,
                location: record.location,
                generation: 0,
                rng,
            }),
            signals,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    fn emit(&self, signal: SessionSignal) {
        // nobody listening is fine
        let _ = self.signals.send(signal);
    }

    pub async fn cached_restaurants(&self) -> Vec<Restaurant> {
        self.state.lock().await.restaurants.clone()
    }

    pub async fn cached_location(&self) -> Option<Coordinate> {
        self.state.lock().await.location
    }

    /// Fresh load: forget everything from previous runs, then take one
    /// location reading so the monitor has a baseline.
    pub async fn on_startup(&self) {
        {
            let mut state = self.state.lock().await;
            self.clear_locked(&mut state, "application start");
        }
        self.run_location_check().await;
    }

    /// Entry point for the pick button. Emits exactly one signal.
    pub async fn on_user_requests_pick(&self) -> Result<Restaurant, PickError> {
        let outcome = self.pick_random().await;
        match &outcome {
            Ok(restaurant) => {
                info!("Picked {} ({})", restaurant.name, restaurant.vicinity);
                self.emit(SessionSignal::Displayed(restaurant.clone()));
            }
            Err(e) => {
                warn!("Pick failed: {}", e);
                self.emit(SessionSignal::Error(e.to_string()));
            }
        }
        outcome
    }

    fn clear_locked(&self, state: &mut SessionState, reason: &str) {
        if let Err(e) = self.cache.clear() {
            warn!("Failed to clear persisted cache due to: {}", e);
        }
        state.restaurants.clear();
        state.location = None;
        state.generation += 1;
        info!("Cached data cleared due to {}", reason);
        self.emit(SessionSignal::Reset);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;

    use super::*;
    use crate::providers::{LocationError, PageToken, SearchError, SearchPage, SearchRequest, SearchStatus};
    use crate::repositories::key_value_store::{KeyValueStore, MemoryStore};

    pub fn restaurant(name: &str) -> Restaurant {
        Restaurant::new(name, format!("{} street", name), Some(4.0))
    }

    /// Location source scripted by the test.
    pub struct FakeLocation {
        current: StdMutex<Result<Coordinate, LocationError>>,
    }

    impl FakeLocation {
        pub fn at(location: Coordinate) -> Arc<Self> {
            Arc::new(Self {
                current: StdMutex::new(Ok(location)),
            })
        }

        pub fn failing(error: LocationError) -> Arc<Self> {
            Arc::new(Self {
                current: StdMutex::new(Err(error)),
            })
        }

        pub fn move_to(&self, location: Coordinate) {
            *self.current.lock().unwrap() = Ok(location);
        }

        pub fn fail_with(&self, error: LocationError) {
            *self.current.lock().unwrap() = Err(error);
        }
    }

    #[async_trait]
    impl LocationProvider for FakeLocation {
        async fn current_location(&self) -> Result<Coordinate, LocationError> {
            self.current.lock().unwrap().clone()
        }
    }

    /// Serves a fixed sequence of pages, counting requests.
    pub struct FakeSearch {
        pages: StdMutex<VecDeque<SearchPage>>,
        pub requests: AtomicUsize,
    }

    impl FakeSearch {
        pub fn with_pages(pages: Vec<SearchPage>) -> Arc<Self> {
            Arc::new(Self {
                pages: StdMutex::new(pages.into()),
                requests: AtomicUsize::new(0),
            })
        }

        /// Pages of `page_size` uniquely named restaurants, chained by tokens.
        pub fn paged(page_count: usize, page_size: usize) -> Arc<Self> {
            let pages = (0..page_count)
                .map(|page| SearchPage {
                    status: SearchStatus::Ok,
                    results: (0..page_size)
                        .map(|i| restaurant(&format!("Place {}-{}", page, i)))
                        .collect(),
                    next_page: (page + 1 < page_count).then(|| PageToken(format!("token-{}", page + 1))),
                })
                .collect();
            Self::with_pages(pages)
        }

        pub fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn serve(&self) -> Result<SearchPage, SearchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.lock().unwrap().pop_front().unwrap_or(SearchPage {
                status: SearchStatus::ZeroResults,
                results: Vec::new(),
                next_page: None,
            }))
        }
    }

    #[async_trait]
    impl NearbySearch for FakeSearch {
        async fn first_page(&self, _request: &SearchRequest) -> Result<SearchPage, SearchError> {
            self.serve()
        }

        async fn next_page(&self, _token: &PageToken) -> Result<SearchPage, SearchError> {
            self.serve()
        }
    }

    pub fn session_with(
        store: Arc<MemoryStore>,
        location: Arc<FakeLocation>,
        search: Arc<FakeSearch>,
    ) -> PickerSession {
        PickerSession::new(
            CacheStore::new(store as Arc<dyn KeyValueStore>),
            location,
            search,
            SessionSettings {
                pick_delay: Duration::ZERO,
                rng_seed: Some(7),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::repositories::cache_repo::{LOCATION_KEY, RESTAURANTS_KEY};
    use crate::repositories::key_value_store::{KeyValueStore, MemoryStore};

    #[tokio::test]
    async fn new_session_mirrors_persisted_cache() {
        let store = Arc::new(MemoryStore::new());
        CacheStore::new(store.clone())
            .write_record(&[restaurant("Leftover")], Coordinate::new(3.0, 4.0))
            .unwrap();

        let session = session_with(
            store,
            FakeLocation::at(Coordinate::new(3.0, 4.0)),
            FakeSearch::paged(0, 0),
        );

        assert_eq!(session.cached_restaurants().await, vec![restaurant("Leftover")]);
        assert_eq!(session.cached_location().await, Some(Coordinate::new(3.0, 4.0)));
    }

    #[tokio::test]
    async fn startup_clears_cache_and_records_location() {
        let store = Arc::new(MemoryStore::new());
        CacheStore::new(store.clone())
            .write_record(&[restaurant("Leftover")], Coordinate::new(-40.0, 170.0))
            .unwrap();
        let here = Coordinate::new(1.0, 1.0);
        let session = session_with(store.clone(), FakeLocation::at(here), FakeSearch::paged(0, 0));
        let mut signals = session.subscribe();

        session.on_startup().await;

        assert!(session.cached_restaurants().await.is_empty());
        assert_eq!(session.cached_location().await, Some(here));
        assert_eq!(store.get(RESTAURANTS_KEY), None);
        assert!(store.get(LOCATION_KEY).is_some());
        assert_eq!(signals.recv().await.unwrap(), SessionSignal::Reset);
    }

    #[tokio::test]
    async fn each_pick_emits_one_signal() {
        let session = session_with(
            Arc::new(MemoryStore::new()),
            FakeLocation::at(Coordinate::new(0.0, 0.0)),
            FakeSearch::paged(0, 0),
        );
        let mut signals = session.subscribe();

        let outcome = session.on_user_requests_pick().await;

        assert_eq!(outcome, Err(PickError::NoResultsFound));
        assert_eq!(
            signals.recv().await.unwrap(),
            SessionSignal::Error("No open restaurants found.".to_string())
        );
        assert!(signals.try_recv().is_err());
    }
}
