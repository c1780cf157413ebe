use std::collections::HashSet;

use crate::models::restaurant::Restaurant;

/// Drops every restaurant whose lower-cased name was already seen,
/// keeping the first occurrence and the original order.
pub fn dedup_by_name(restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    let mut seen = HashSet::with_capacity(restaurants.len());
    restaurants
        .into_iter()
        .filter(|restaurant| seen.insert(restaurant.dedup_key()))
        .collect()
}
