//! Shared library for DateThinker Lambda functions.
//!
//! This crate holds the venue search pipeline, the date-plan store and the
//! calendar export used by the API Lambdas, plus common utilities.

pub mod auth;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod places;
pub mod refresh;
pub mod sanitize;
pub mod search;
pub mod secrets;
pub mod store;

pub use auth::{AuthStatus, Session};
pub use calendar::{calendar_filename, generate_ical_event};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Category, DatePlan, SearchQuery, SearchResult, Venue};
pub use places::{PlacesClient, PlacesProvider};
pub use refresh::{refresh, RefreshRequest};
pub use sanitize::{sanitize, sanitize_opt};
pub use search::search;
pub use secrets::{get_database_credentials, get_places_api_key, get_secret, DatabaseCredentials};
pub use store::{DatePlanStore, MemoryDatePlanStore, PgDatePlanStore};
