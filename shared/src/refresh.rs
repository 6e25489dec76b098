//! Re-fetch a single venue for fresher details.

use tracing::info;

use crate::models::{Category, SearchQuery, Venue};
use crate::places::{PlaceSearch, PlacesProvider};
use crate::sanitize::sanitize_opt;
use crate::{Error, Result};

/// Raw refresh parameters as they arrive from the caller.
#[derive(Debug, Clone, Default)]
pub struct RefreshRequest {
    pub category: Option<String>,
    pub city: Option<String>,
    pub place_id: Option<String>,
    pub price_range: Option<u8>,
}

/// Return the freshest Venue for the request.
///
/// With a place id this is a direct details lookup. Without one, the
/// provider's top-ranked candidate for category, city and price wins;
/// which candidate that is depends on the provider's ranking.
pub async fn refresh(provider: &dyn PlacesProvider, request: &RefreshRequest) -> Result<Venue> {
    let raw_type = sanitize_opt(request.category.as_deref());
    if raw_type.is_empty() {
        return Err(Error::InvalidRequest("type is required".to_string()));
    }

    let query = SearchQuery::new(request.city.as_deref().unwrap_or_default())
        .with_price_range(request.price_range)
        .with_place_id(request.place_id.as_deref());
    if query.city.is_empty() {
        return Err(Error::InvalidRequest("city is required".to_string()));
    }

    let category: Category = raw_type.parse()?;

    if let Some(place_id) = &query.place_id {
        let place = provider
            .place_details(place_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Place {} not found", place_id)))?;

        let venue = place
            .into_venue(category)
            .ok_or_else(|| Error::NotFound(format!("Place {} has incomplete details", place_id)))?;

        info!("Refreshed {} {} by id", category, venue.id);
        return Ok(venue);
    }

    let search = PlaceSearch::for_category(category, &query.city, query.price_range);
    let venue = provider
        .text_search(&search)
        .await?
        .into_iter()
        .find_map(|place| place.into_venue(category))
        .ok_or_else(|| {
            Error::NotFound(format!("No {} found in {}", category, query.city))
        })?;

    info!("Refreshed {} in '{}' to {}", category, query.city, venue.id);
    Ok(venue)
}
