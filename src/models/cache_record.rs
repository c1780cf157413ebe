use serde::{Deserialize, Serialize};

use crate::models::coordinate::Coordinate;
use crate::models::restaurant::Restaurant;

/// The last fetched collection together with where it was fetched.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct CacheRecord {
    pub restaurants: Vec<Restaurant>,
    pub location: Option<Coordinate>,
}

impl CacheRecord {
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }
}
