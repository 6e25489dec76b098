//! Places provider client.
//!
//! Talks to a Google-Places-style JSON API:
//! - GET {base}/textsearch/json - free-text search ("bars in Lisbon")
//! - GET {base}/details/json - lookup by provider place id

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Category, Venue};
use crate::{Error, Result};

const DETAILS_FIELDS: &str = "place_id,name,formatted_address,rating,price_level,photos,opening_hours";

/// A single text search against the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceSearch {
    pub text: String,
    pub max_price: Option<u8>,
}

impl PlaceSearch {
    /// Build the search for one category in an already-sanitized city.
    pub fn for_category(category: Category, city: &str, price_range: Option<u8>) -> Self {
        Self {
            text: format!("{} in {}", category.search_phrase(), city),
            max_price: price_range,
        }
    }
}

/// Place record as the provider returns it. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPlace {
    pub place_id: Option<String>,
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub rating: Option<f64>,
    pub price_level: Option<u8>,
    #[serde(default)]
    pub photos: Vec<ProviderPhoto>,
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderPhoto {
    pub photo_reference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpeningHours {
    pub open_now: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderPlace {
    /// Map into a Venue, or `None` when the id, name or address is missing.
    pub fn into_venue(self, category: Category) -> Option<Venue> {
        let id = non_blank(self.place_id)?;
        let name = non_blank(self.name)?;
        let address = non_blank(self.formatted_address)?;

        Some(Venue {
            id,
            name,
            category,
            address,
            rating: self.rating.filter(|r| (0.0..=5.0).contains(r)),
            price_level: self.price_level.filter(|p| *p <= 4),
            photo_reference: self
                .photos
                .into_iter()
                .find_map(|photo| non_blank(photo.photo_reference)),
            open_now: self.opening_hours.and_then(|hours| hours.open_now),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<ProviderPlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<ProviderPlace>,
    error_message: Option<String>,
}

/// Source of place data.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Ranked candidates for a free-text search.
    async fn text_search(&self, search: &PlaceSearch) -> Result<Vec<ProviderPlace>>;

    /// Details for one place; `None` when the provider does not know the id.
    async fn place_details(&self, place_id: &str) -> Result<Option<ProviderPlace>>;
}

/// Map a provider `status` field to an error kind.
fn check_status(status: &str, error_message: Option<&str>) -> Result<()> {
    let detail = error_message.unwrap_or("no details");
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        "OVER_QUERY_LIMIT" => Err(Error::ProviderQuotaExceeded(detail.to_string())),
        "INVALID_REQUEST" => Err(Error::InvalidRequest(format!(
            "Places provider rejected the request: {}",
            detail
        ))),
        other => Err(Error::ProviderUnavailable(format!("{}: {}", other, detail))),
    }
}

/// HTTP client for the places provider.
pub struct PlacesClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_http_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_http_client(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Places request to {}", path);

        // Transport errors carry the full URL, which includes the key.
        let response = self
            .http_client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("Places request failed: {}", e.without_url())))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::ProviderQuotaExceeded(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(Error::ProviderUnavailable(format!(
                "Places API returned HTTP {}",
                status
            )));
        }

        response.json::<T>().await.map_err(|e| {
            Error::ProviderUnavailable(format!(
                "Failed to parse places response: {}",
                e.without_url()
            ))
        })
    }
}

#[async_trait]
impl PlacesProvider for PlacesClient {
    async fn text_search(&self, search: &PlaceSearch) -> Result<Vec<ProviderPlace>> {
        let mut params = vec![("query", search.text.clone())];
        if let Some(max_price) = search.max_price {
            params.push(("minprice", "0".to_string()));
            params.push(("maxprice", max_price.to_string()));
        }

        let response: TextSearchResponse = self.get_json("textsearch/json", &params).await?;
        check_status(&response.status, response.error_message.as_deref())?;

        debug!(
            "Text search '{}' returned {} results",
            search.text,
            response.results.len()
        );
        Ok(response.results)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<ProviderPlace>> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", DETAILS_FIELDS.to_string()),
        ];

        let response: DetailsResponse = self.get_json("details/json", &params).await?;
        if response.status == "NOT_FOUND" {
            return Ok(None);
        }
        check_status(&response.status, response.error_message.as_deref())?;

        Ok(response.result)
    }
}
