use std::sync::Arc;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::models::cache_record::CacheRecord;
use crate::models::coordinate::Coordinate;
use crate::models::restaurant::Restaurant;
use crate::repositories::key_value_store::KeyValueStore;

pub const RESTAURANTS_KEY: &str = "cachedRestaurants";
pub const LOCATION_KEY: &str = "cachedLocation";

/// Typed view over the key/value store holding the last fetch cycle.
#[derive(Clone)]
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
}

impl CacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding malformed cache entry {} due to: {}", key, e);
                None
            }
        }
    }

    pub fn load_restaurants(&self) -> Vec<Restaurant> {
        self.read(RESTAURANTS_KEY).unwrap_or_default()
    }

    pub fn load_location(&self) -> Option<Coordinate> {
        self.read(LOCATION_KEY)
    }

    /// Restaurants without the location they were fetched at are not
    /// trusted and read back as a miss. A location alone is fine, the
    /// location monitor records it on its own.
    pub fn load_record(&self) -> CacheRecord {
        let location = self.load_location();
        let restaurants = match location {
            Some(_) => self.load_restaurants(),
            None => {
                if self.store.get(RESTAURANTS_KEY).is_some() {
                    warn!("Cached restaurants have no matching location, treating as a miss");
                }
                Vec::new()
            }
        };

        CacheRecord {
            restaurants,
            location,
        }
    }

    /// Writes both halves of a fetch cycle or neither.
    pub fn write_record(&self, restaurants: &[Restaurant], location: Coordinate) -> anyhow::Result<()> {
        let restaurants_json = serde_json::to_string(restaurants)?;
        let location_json = serde_json::to_string(&location)?;
        let previous_restaurants = self.store.get(RESTAURANTS_KEY);

        self.store
            .set(RESTAURANTS_KEY, restaurants_json)
            .context("Failed to cache restaurants")?;

        if let Err(e) = self.store.set(LOCATION_KEY, location_json) {
            let rollback = match previous_restaurants {
                Some(previous) => self.store.set(RESTAURANTS_KEY, previous),
                None => self.store.remove(RESTAURANTS_KEY),
            };
            if let Err(rollback_err) = rollback {
                warn!("Failed to roll back cached restaurants due to: {}", rollback_err);
            }
            return Err(e.context("Failed to cache location"));
        }

        Ok(())
    }

    pub fn write_location(&self, location: Coordinate) -> anyhow::Result<()> {
        let location_json = serde_json::to_string(&location)?;
        self.store
            .set(LOCATION_KEY, location_json)
            .context("Failed to cache location")
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(RESTAURANTS_KEY)?;
        self.store.remove(LOCATION_KEY)?;
        Ok(())
    }
}
