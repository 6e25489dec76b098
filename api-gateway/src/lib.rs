//! HTTP route layer for the DateThinker API Lambdas.
//!
//! Each Lambda binary wires a handler from this crate to `lambda_http::run`.

pub mod date_plans;
pub mod places;

use datethinker_shared::http::error_to_response;
use lambda_http::{Body, Error, Response};
use tracing::{error, warn};

/// Strip the `/api` stage prefix API Gateway REST APIs put in the path.
pub fn route_path(raw_path: &str) -> &str {
    match raw_path.strip_prefix("/api") {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => raw_path,
    }
}

/// Log a failed operation and turn it into its error envelope.
///
/// Caller mistakes are logged at warn, everything else at error.
pub fn failure_response(
    endpoint: &str,
    context: &str,
    err: &datethinker_shared::Error,
) -> Result<Response<Body>, Error> {
    if err.status_code() >= 500 {
        error!("{} failed ({}): {}", endpoint, context, err);
    } else {
        warn!("{} rejected ({}): {}", endpoint, context, err);
    }
    error_to_response(err)
}
