//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

/// Default endpoint of the places-search provider.
pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the places provider (no trailing slash)
    pub places_base_url: String,
    /// Places API key, when supplied directly
    pub places_api_key: Option<String>,
    /// ARN of the secret holding the places API key
    pub places_api_key_secret_arn: Option<String>,
    /// Maximum venues returned per category
    pub places_max_results: usize,
    /// Database host
    pub db_host: Option<String>,
    /// Database name
    pub db_name: String,
    /// ARN of the secret containing database credentials
    pub db_secret_arn: Option<String>,
    /// Keep date plans in process instead of Postgres (`DATE_PLAN_STORE=memory`)
    pub use_memory_store: bool,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let places_max_results = match lookup("PLACES_MAX_RESULTS") {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::Config(format!("Invalid PLACES_MAX_RESULTS: {}", raw)))?,
            None => 10,
        };

        Ok(Self {
            places_base_url: lookup("PLACES_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PLACES_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            places_api_key: lookup("PLACES_API_KEY").filter(|k| !k.is_empty()),
            places_api_key_secret_arn: lookup("PLACES_API_KEY_SECRET_ARN"),
            places_max_results,
            db_host: lookup("DB_HOST"),
            db_name: lookup("DB_NAME").unwrap_or_else(|| "datethinker".to_string()),
            db_secret_arn: lookup("DB_SECRET_ARN"),
            use_memory_store: lookup("DATE_PLAN_STORE")
                .map(|v| v.eq_ignore_ascii_case("memory"))
                .unwrap_or(false),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.places_base_url, DEFAULT_PLACES_BASE_URL);
        assert_eq!(config.places_max_results, 10);
        assert_eq!(config.db_name, "datethinker");
        assert_eq!(config.aws_region, "us-east-1");
        assert!(config.places_api_key.is_none());
        assert!(!config.use_memory_store);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PLACES_BASE_URL", "http://localhost:9000/"),
            ("PLACES_API_KEY", "abc"),
            ("PLACES_MAX_RESULTS", "5"),
            ("DB_HOST", "db.internal"),
            ("DATE_PLAN_STORE", "Memory"),
        ]))
        .unwrap();
        assert_eq!(config.places_base_url, "http://localhost:9000");
        assert_eq!(config.places_api_key.as_deref(), Some("abc"));
        assert_eq!(config.places_max_results, 5);
        assert_eq!(config.db_host.as_deref(), Some("db.internal"));
        assert!(config.use_memory_store);
    }

    #[test]
    fn test_invalid_max_results() {
        let result = Config::from_lookup(lookup_from(&[("PLACES_MAX_RESULTS", "zero")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = Config::from_lookup(lookup_from(&[("PLACES_MAX_RESULTS", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
