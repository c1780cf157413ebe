use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// A single nearby-search result.
///
/// Only the fields the picker displays are typed; everything else the
/// places provider returns (place_id, geometry, photos, ...) rides along in
/// `extra` so a cached collection round-trips exactly.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub vicinity: String,
    /// Absent, explicitly `null`, or a score; kept apart so each is written
    /// back the way it was read.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    rating: Option<Option<f64>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Restaurant {
    pub fn new(name: impl Into<String>, vicinity: impl Into<String>, rating: Option<f64>) -> Self {
        Self {
            name: name.into(),
            vicinity: vicinity.into(),
            rating: rating.map(Some),
            extra: Map::new(),
        }
    }

    pub fn rating(&self) -> Option<f64> {
        self.rating.flatten()
    }

    /// Key used for duplicate detection. Providers do not hand out a stable
    /// id we can rely on across pages, so identity is the lower-cased name.
    pub fn dedup_key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn maps_link(&self) -> String {
        let query: String = url::form_urlencoded::byte_serialize(self.vicinity.as_bytes()).collect();
        format!("{}{}", MAPS_SEARCH_URL, query)
    }
}

/// What gets shown to the user for a picked restaurant.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct RestaurantCard {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub maps_link: String,
}

impl From<&Restaurant> for RestaurantCard {
    fn from(restaurant: &Restaurant) -> Self {
        Self {
            name: restaurant.name.clone(),
            address: restaurant.vicinity.clone(),
            rating: restaurant.rating(),
            maps_link: restaurant.maps_link(),
        }
    }
}
