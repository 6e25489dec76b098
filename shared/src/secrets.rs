//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Config, Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Database credentials from Secrets Manager.
#[derive(Debug, Deserialize)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub dbname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlacesKeySecret {
    api_key: String,
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get database credentials from Secrets Manager.
pub async fn get_database_credentials(
    client: &SecretsClient,
    secret_arn: &str,
) -> Result<DatabaseCredentials> {
    let secret_string = get_secret(client, secret_arn).await?;

    serde_json::from_str(&secret_string)
        .map_err(|e| Error::Aws(format!("Failed to parse database credentials: {}", e)))
}

/// Resolve the places API key, preferring the plain environment value.
pub async fn get_places_api_key(client: &SecretsClient, config: &Config) -> Result<String> {
    if let Some(key) = &config.places_api_key {
        return Ok(key.clone());
    }

    let secret_arn = config.places_api_key_secret_arn.as_deref().ok_or_else(|| {
        Error::Config("PLACES_API_KEY or PLACES_API_KEY_SECRET_ARN must be set".to_string())
    })?;

    let secret_string = get_secret(client, secret_arn).await?;
    parse_places_key(&secret_string)
}

/// The secret is either `{"api_key": "..."}` or the bare key.
fn parse_places_key(secret_string: &str) -> Result<String> {
    let key = match serde_json::from_str::<PlacesKeySecret>(secret_string) {
        Ok(secret) => secret.api_key,
        Err(_) => secret_string.trim().to_string(),
    };

    if key.is_empty() || key.starts_with('{') {
        return Err(Error::Config("Places API key secret is empty or malformed".to_string()));
    }

    Ok(key)
}
