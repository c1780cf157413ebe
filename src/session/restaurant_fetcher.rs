use tracing::{debug, info, warn};

use crate::helpers::dedup::dedup_by_name;
use crate::models::restaurant::Restaurant;
use crate::providers::{NearbySearch, SearchRequest, SearchStatus};
use crate::session::picker::pick_from;
use crate::session::{PickError, PickerSession};

/// Upper bound on restaurants kept from one fetch cycle.
pub const MAX_RESULTS: usize = 60;

/// Walks the search pages until they run out or `MAX_RESULTS` have been
/// collected. An empty or failed first page means nothing is open nearby;
/// a failed later page fails the whole search.
pub async fn collect_pages(
    search: &dyn NearbySearch,
    request: &SearchRequest,
) -> Result<Vec<Restaurant>, PickError> {
    let first = search.first_page(request).await?;
    if !first.status.is_success() || first.results.is_empty() {
        debug!("First search page came back {:?} with {} results", first.status, first.results.len());
        return Err(PickError::NoResultsFound);
    }

    let mut accumulated = first.results;
    let mut next_page = first.next_page;
    let mut pages = 1;

    while accumulated.len() < MAX_RESULTS {
        let Some(token) = next_page.take() else {
            break;
        };

        let page = search.next_page(&token).await?;
        pages += 1;
        if page.status == SearchStatus::ZeroResults {
            break;
        }
        if !page.status.is_success() {
            warn!(
                "Search page {} came back {:?}, dropping {} collected results",
                pages,
                page.status,
                accumulated.len()
            );
            return Err(PickError::SearchFailed(format!(
                "Search page {} returned status {:?}",
                pages, page.status
            )));
        }

        accumulated.extend(page.results);
        next_page = page.next_page;
    }

    accumulated.truncate(MAX_RESULTS);
    debug!("Collected {} results over {} pages", accumulated.len(), pages);
    Ok(accumulated)
}

impl PickerSession {
    /// One full fetch cycle: locate, search, dedup, cache, then pick.
    /// Nothing is written unless every step before the write succeeded.
    pub async fn fetch_nearby(&self) -> Result<Restaurant, PickError> {
        let started_in = self.state.lock().await.generation;

        let location = self.location_provider.current_location().await?;
        let request = SearchRequest::open_restaurants_near(location);
        let restaurants = dedup_by_name(collect_pages(self.search.as_ref(), &request).await?);
        info!("Fetched {} unique open restaurants near {:?}", restaurants.len(), location);

        let mut state = self.state.lock().await;
        if state.generation != started_in {
            info!("Session was reset during the fetch, not caching its results");
            return pick_from(&restaurants, &mut state.rng)
                .cloned()
                .ok_or(PickError::NoResultsFound);
        }

        if let Err(e) = self.cache.write_record(&restaurants, location) {
            warn!("Failed to persist fetched restaurants due to: {}", e);
        }
        state.restaurants = restaurants;
        state.location = Some(location);

        let state = &mut *state;
        pick_from(&state.restaurants, &mut state.rng)
            .cloned()
            .ok_or(PickError::NoResultsFound)
    }
}
