use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::restaurant::Restaurant;
use crate::providers::{NearbySearch, PageToken, SearchError, SearchPage, SearchRequest, SearchStatus};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";
const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";

#[derive(Deserialize, Debug)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<Restaurant>,
    status: String,
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Places API Nearby Search over HTTP.
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    base_url: String,
    page_token_delay: Duration,
}

impl GooglePlacesClient {
    /// `page_token_delay` is how long to wait before redeeming a next-page
    /// token; Google rejects tokens used immediately after they are issued.
    pub fn new(
        api_key: String,
        base_url: String,
        page_token_delay: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_token_delay,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, NEARBY_SEARCH_PATH)
    }

    async fn fetch_page(&self, params: &[(&str, String)]) -> Result<SearchPage, SearchError> {
        let url = self.endpoint();
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text().await?;
        let body: NearbySearchResponse =
            serde_json::from_str(&text).map_err(|source| SearchError::Deserialize {
                context: "nearby search response".to_string(),
                source,
            })?;

        let search_status = SearchStatus::from_code(&body.status);
        if let SearchStatus::Other(code) = &search_status {
            warn!(
                "Nearby search returned status {}: {}",
                code,
                body.error_message.as_deref().unwrap_or("no error message")
            );
        }
        debug!(
            "Nearby search page returned {} results (more: {})",
            body.results.len(),
            body.next_page_token.is_some()
        );

        Ok(SearchPage {
            status: search_status,
            results: body.results,
            next_page: body.next_page_token.map(PageToken),
        })
    }
}

#[async_trait]
impl NearbySearch for GooglePlacesClient {
    async fn first_page(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        let mut params = vec![
            (
                "location",
                format!("{},{}", request.center.latitude, request.center.longitude),
            ),
            ("radius", request.radius_meters.to_string()),
            ("type", request.category.clone()),
        ];
        if request.open_now {
            params.push(("opennow", "true".to_string()));
        }

        self.fetch_page(&params).await
    }

    async fn next_page(&self, token: &PageToken) -> Result<SearchPage, SearchError> {
        if !self.page_token_delay.is_zero() {
            tokio::time::sleep(self.page_token_delay).await;
        }

        self.fetch_page(&[("pagetoken", token.0.clone())]).await
    }
}
