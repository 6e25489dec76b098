//! Shared data models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::sanitize::{sanitize, sanitize_place_id};
use crate::Error;

/// Kind of date venue. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Restaurant,
    Activity,
    Drink,
    Outdoor,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Restaurant,
        Category::Activity,
        Category::Drink,
        Category::Outdoor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Activity => "activity",
            Category::Drink => "drink",
            Category::Outdoor => "outdoor",
        }
    }

    /// Key used for this category in search requests and result maps.
    pub fn result_key(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurants",
            Category::Activity => "activities",
            Category::Drink => "drinks",
            Category::Outdoor => "outdoors",
        }
    }

    /// Phrase sent to the provider's text search, followed by "in {city}".
    pub fn search_phrase(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurants",
            Category::Activity => "fun activities",
            Category::Drink => "bars",
            Category::Outdoor => "parks",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| normalized == c.as_str() || normalized == c.result_key())
            .ok_or_else(|| Error::InvalidRequest(format!("Unknown venue type: {}", s.trim())))
    }
}

/// A single place returned by the places provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
}

/// Per-request search parameters. Free-text fields are sanitized on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub city: String,
    pub categories: Vec<Category>,
    pub price_range: Option<u8>,
    pub place_id: Option<String>,
}

impl SearchQuery {
    pub fn new(city: &str) -> Self {
        Self {
            city: sanitize(city),
            categories: Vec::new(),
            price_range: None,
            place_id: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    pub fn with_price_range(mut self, price_range: Option<u8>) -> Self {
        self.price_range = price_range;
        self
    }

    pub fn with_place_id(mut self, place_id: Option<&str>) -> Self {
        self.place_id = place_id.map(sanitize_place_id).filter(|id| !id.is_empty());
        self
    }

    /// Categories to query; no filter means all of them.
    pub fn requested_categories(&self) -> Vec<Category> {
        if self.categories.is_empty() {
            return Category::ALL.to_vec();
        }
        let mut categories = self.categories.clone();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Venues grouped by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult(BTreeMap<Category, Vec<Venue>>);

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, venues: Vec<Venue>) {
        self.0.insert(category, venues);
    }

    pub fn get(&self, category: Category) -> Option<&[Venue]> {
        self.0.get(&category).map(Vec::as_slice)
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.keys().copied()
    }

    pub fn venues(&self) -> impl Iterator<Item = &Venue> {
        self.0.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SearchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, venues) in &self.0 {
            map.serialize_entry(category.result_key(), venues)?;
        }
        map.end()
    }
}

/// A saved itinerary owned by the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatePlan {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub city: Option<String>,
    pub venues: Vec<Venue>,
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
