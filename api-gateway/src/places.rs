//! Places API - venue search and refresh.
//!
//! Endpoints:
//! - POST /search - Venues per category for a city
//! - POST /refresh - Fresh details for a single venue

use std::sync::Arc;

use datethinker_shared::http::{error_response, json_response};
use datethinker_shared::{
    get_places_api_key, parse_body, refresh, search, Category, Config, PlacesClient,
    PlacesProvider, RefreshRequest, SearchQuery,
};
use lambda_http::{Body, Error, Request, Response};
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::{failure_response, route_path};

/// Search request body. Each flag selects a category; none selects all.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub restaurants: bool,
    #[serde(default)]
    pub activities: bool,
    #[serde(default)]
    pub drinks: bool,
    #[serde(default)]
    pub outdoors: bool,
    #[validate(range(min = 1, max = 4))]
    pub price_range: Option<u8>,
}

impl SearchRequest {
    pub fn to_query(&self) -> SearchQuery {
        let flags = [
            (self.restaurants, Category::Restaurant),
            (self.activities, Category::Activity),
            (self.drinks, Category::Drink),
            (self.outdoors, Category::Outdoor),
        ];

        flags
            .into_iter()
            .filter(|(selected, _)| *selected)
            .fold(SearchQuery::new(&self.city), |query, (_, category)| {
                query.with_category(category)
            })
            .with_price_range(self.price_range)
    }
}

/// Refresh request body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    #[serde(rename = "type")]
    pub venue_type: Option<String>,
    pub city: Option<String>,
    pub place_id: Option<String>,
    #[validate(range(min = 1, max = 4))]
    pub price_range: Option<u8>,
}

impl From<RefreshBody> for RefreshRequest {
    fn from(body: RefreshBody) -> Self {
        RefreshRequest {
            category: body.venue_type,
            city: body.city,
            place_id: body.place_id,
            price_range: body.price_range,
        }
    }
}

/// Application state
pub struct AppState {
    pub provider: Arc<dyn PlacesProvider>,
    pub max_results: usize,
}

impl AppState {
    pub fn new(provider: Arc<dyn PlacesProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    /// Build the live provider client from the environment.
    pub async fn from_env() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let api_key = get_places_api_key(&secrets_client, &config).await?;
        let client = PlacesClient::new(&config.places_base_url, api_key);

        info!(
            "Places client ready for {} (max {} results per category)",
            config.places_base_url, config.places_max_results
        );

        Ok(Self::new(Arc::new(client), config.places_max_results))
    }
}

pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = route_path(event.uri().path());

    info!("Places request: {} {}", method, path);

    match (method, path) {
        ("POST", "/search") => handle_search(&state, &event).await,
        ("POST", "/refresh") => handle_refresh(&state, &event).await,
        _ => error_response(404, "Not found"),
    }
}

async fn handle_search(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let request: SearchRequest = parse_body!(event.body());
    if let Err(e) = request.validate() {
        return error_response(400, format!("Invalid request: {}", e));
    }

    let query = request.to_query();
    match search(state.provider.as_ref(), &query, state.max_results).await {
        Ok(result) => json_response(200, &result),
        Err(e) => {
            let context = format!(
                "city='{}', categories={:?}",
                query.city,
                query.requested_categories()
            );
            failure_response("POST /search", &context, &e)
        }
    }
}

async fn handle_refresh(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let body: RefreshBody = parse_body!(event.body());
    if let Err(e) = body.validate() {
        return error_response(400, format!("Invalid request: {}", e));
    }

    let request = RefreshRequest::from(body);
    match refresh(state.provider.as_ref(), &request).await {
        Ok(venue) => json_response(200, &venue),
        Err(e) => {
            let context = format!(
                "type={:?}, city={:?}, placeId={:?}",
                request.category, request.city, request.place_id
            );
            failure_response("POST /refresh", &context, &e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_means_all_categories() {
        let request = SearchRequest {
            city: "Paris".to_string(),
            ..Default::default()
        };
        let query = request.to_query();
        assert!(query.categories.is_empty());
        assert_eq!(query.requested_categories(), Category::ALL.to_vec());
    }

    #[test]
    fn test_flags_select_categories() {
        let request: SearchRequest = serde_json::from_value(serde_json::json!({
            "city": "  Paris<script> ",
            "drinks": true,
            "outdoors": true,
            "priceRange": 2
        }))
        .unwrap();

        let query = request.to_query();
        assert_eq!(query.city, "Parisscript");
        assert_eq!(query.categories, vec![Category::Drink, Category::Outdoor]);
        assert_eq!(query.price_range, Some(2));
    }

    #[test]
    fn test_price_range_bounds() {
        for (price, valid) in [(0u8, false), (1, true), (4, true), (5, false)] {
            let request = SearchRequest {
                city: "Paris".to_string(),
                price_range: Some(price),
                ..Default::default()
            };
            assert_eq!(request.validate().is_ok(), valid, "price {}", price);
        }
    }

    #[test]
    fn test_refresh_body_type_field() {
        let body: RefreshBody = serde_json::from_value(serde_json::json!({
            "type": "restaurant",
            "city": "Paris",
            "placeId": "abc"
        }))
        .unwrap();

        let request = RefreshRequest::from(body);
        assert_eq!(request.category.as_deref(), Some("restaurant"));
        assert_eq!(request.place_id.as_deref(), Some("abc"));
    }
}
