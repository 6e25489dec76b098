//! Category fan-out over the places provider.

use futures::future::join_all;
use tracing::{info, warn};

use crate::models::{Category, SearchQuery, SearchResult, Venue};
use crate::places::{PlaceSearch, PlacesProvider, ProviderPlace};
use crate::{Error, Result};

/// Map provider results to venues, skipping incomplete entries.
pub fn collect_venues(places: Vec<ProviderPlace>, category: Category, limit: usize) -> Vec<Venue> {
    places
        .into_iter()
        .filter_map(|place| place.into_venue(category))
        .take(limit)
        .collect()
}

/// Search every requested category and merge the results.
///
/// Categories are queried concurrently. A failed category is logged and
/// left out of the result; only when every category fails is the first
/// failure returned.
pub async fn search(
    provider: &dyn PlacesProvider,
    query: &SearchQuery,
    limit: usize,
) -> Result<SearchResult> {
    if query.city.is_empty() {
        return Err(Error::InvalidRequest("city is required".to_string()));
    }

    let categories = query.requested_categories();
    let lookups = categories.iter().map(|&category| {
        let search = PlaceSearch::for_category(category, &query.city, query.price_range);
        async move { (category, provider.text_search(&search).await) }
    });

    let mut result = SearchResult::new();
    let mut first_error = None;

    for (category, outcome) in join_all(lookups).await {
        match outcome {
            Ok(places) => result.insert(category, collect_venues(places, category, limit)),
            Err(e) => {
                warn!(
                    "Search for {} in '{}' failed: {}",
                    category.result_key(),
                    query.city,
                    e
                );
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if result.is_empty() {
        if let Some(e) = first_error {
            return Err(e);
        }
    }

    info!(
        "Search in '{}' returned {} venues across {} categories",
        query.city,
        result.venues().count(),
        result.len()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns three usable places per search and records every search it sees.
    struct FakeProvider {
        seen: Mutex<Vec<PlaceSearch>>,
        fail_phrase: Option<&'static str>,
        quota_everything: bool,
    }

    impl FakeProvider {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                fail_phrase: None,
                quota_everything: false,
            }
        }
    }

    fn place(id: &str) -> ProviderPlace {
        ProviderPlace {
            place_id: Some(id.to_string()),
            name: Some(format!("Place {id}")),
            formatted_address: Some("Somewhere".to_string()),
            ..Default::default()
        }
    }

    #[async_trait]
    impl PlacesProvider for FakeProvider {
        async fn text_search(&self, search: &PlaceSearch) -> Result<Vec<ProviderPlace>> {
            self.seen.lock().unwrap().push(search.clone());
            if self.quota_everything {
                return Err(Error::ProviderQuotaExceeded("limit".into()));
            }
            if let Some(phrase) = self.fail_phrase {
                if search.text.starts_with(phrase) {
                    return Err(Error::ProviderUnavailable("timeout".into()));
                }
            }
            let prefix = search.text.split(' ').next().unwrap_or_default().to_string();
            Ok(vec![
                place(&format!("{prefix}-1")),
                ProviderPlace::default(),
                place(&format!("{prefix}-2")),
                place(&format!("{prefix}-3")),
            ])
        }

        async fn place_details(&self, _place_id: &str) -> Result<Option<ProviderPlace>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_single_category_only() {
        let provider = FakeProvider::new();
        let query = SearchQuery::new("Paris").with_category(Category::Restaurant);

        let result = search(&provider, &query, 10).await.unwrap();

        assert_eq!(result.categories().collect::<Vec<_>>(), vec![Category::Restaurant]);
        let venues = result.get(Category::Restaurant).unwrap();
        assert_eq!(venues.len(), 3);
        assert!(venues.iter().all(|v| !v.id.is_empty()));
        assert!(venues.iter().all(|v| v.category == Category::Restaurant));

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "restaurants in Paris");
    }

    #[tokio::test]
    async fn test_all_categories_by_default() {
        let provider = FakeProvider::new();
        let query = SearchQuery::new("Austin").with_price_range(Some(3));

        let result = search(&provider, &query, 2).await.unwrap();

        assert_eq!(result.len(), 4);
        assert_eq!(result.venues().count(), 8);
        let seen = provider.seen.lock().unwrap();
        assert!(seen.iter().all(|s| s.max_price == Some(3)));
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_other_categories() {
        let mut provider = FakeProvider::new();
        provider.fail_phrase = Some("bars");
        let query = SearchQuery::new("Berlin")
            .with_category(Category::Drink)
            .with_category(Category::Outdoor);

        let result = search(&provider, &query, 10).await.unwrap();

        assert!(result.get(Category::Drink).is_none());
        assert_eq!(result.get(Category::Outdoor).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_total_failure_surfaces_error() {
        let mut provider = FakeProvider::new();
        provider.quota_everything = true;
        let query = SearchQuery::new("Rome");

        let err = search(&provider, &query, 10).await.unwrap_err();
        assert!(matches!(err, Error::ProviderQuotaExceeded(_)));
    }

    #[tokio::test]
    async fn test_empty_city_rejected() {
        let provider = FakeProvider::new();
        let query = SearchQuery::new("<>");

        let err = search(&provider, &query, 10).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(provider.seen.lock().unwrap().is_empty());
    }
}
