use rand::Rng;
use tracing::debug;

use crate::models::restaurant::Restaurant;
use crate::session::{PickError, PickerSession};

/// Uniformly random element of `restaurants`, `None` when empty.
pub fn pick_from<'a, R: Rng + ?Sized>(restaurants: &'a [Restaurant], rng: &mut R) -> Option<&'a Restaurant> {
    if restaurants.is_empty() {
        return None;
    }
    restaurants.get(rng.gen_range(0..restaurants.len()))
}

impl PickerSession {
    /// Serves from the cached collection when there is one, otherwise runs
    /// a fetch cycle (which picks once it has results).
    pub async fn pick_random(&self) -> Result<Restaurant, PickError> {
        let has_cached = !self.state.lock().await.restaurants.is_empty();
        if has_cached {
            if !self.settings.pick_delay.is_zero() {
                tokio::time::sleep(self.settings.pick_delay).await;
            }

            let mut state = self.state.lock().await;
            let state = &mut *state;
            // a reset may have landed during the delay
            if let Some(restaurant) = pick_from(&state.restaurants, &mut state.rng) {
                return Ok(restaurant.clone());
            }
        }

        debug!("No cached restaurants available, fetching");
        self.fetch_nearby().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::models::coordinate::Coordinate;
    use crate::repositories::cache_repo::CacheStore;
    use crate::repositories::key_value_store::MemoryStore;
    use crate::session::test_support::*;

    #[test]
    fn empty_collection_has_nothing_to_pick() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pick_from(&[], &mut rng).is_none());
    }

    #[test]
    fn picks_are_members_and_roughly_uniform() {
        let restaurants: Vec<_> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"]
            .iter()
            .map(|name| restaurant(name))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 10_000;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let picked = pick_from(&restaurants, &mut rng).unwrap();
            assert!(restaurants.contains(picked));
            *counts.entry(picked.name.clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), restaurants.len());
        let expected = trials / restaurants.len();
        for (name, count) in counts {
            assert!(
                count.abs_diff(expected) < expected / 10,
                "{} picked {} times, expected about {}",
                name,
                count,
                expected
            );
        }
    }

    #[tokio::test]
    async fn cached_collection_is_served_without_searching() {
        let store = Arc::new(MemoryStore::new());
        let cached = vec![restaurant("One"), restaurant("Two")];
        CacheStore::new(store.clone())
            .write_record(&cached, Coordinate::new(0.0, 0.0))
            .unwrap();
        let search = FakeSearch::paged(1, 5);
        let session = session_with(store, FakeLocation::at(Coordinate::new(0.0, 0.0)), search.clone());

        for _ in 0..20 {
            let picked = session.pick_random().await.unwrap();
            assert!(cached.contains(&picked));
        }
        assert_eq!(search.request_count(), 0);
    }

    #[tokio::test]
    async fn empty_cache_falls_through_to_fetch() {
        let search = FakeSearch::paged(1, 4);
        let session = session_with(
            Arc::new(MemoryStore::new()),
            FakeLocation::at(Coordinate::new(0.0, 0.0)),
            search.clone(),
        );

        let picked = session.pick_random().await.unwrap();

        assert!(picked.name.starts_with("Place 0-"));
        assert_eq!(search.request_count(), 1);
        assert_eq!(session.cached_restaurants().await.len(), 4);

        session.pick_random().await.unwrap();
        assert_eq!(search.request_count(), 1);
    }
}
