//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Error;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success with no payload, e.g. after a delete.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>, lambda_http::Error> {
    let json = serde_json::to_string(data)?;
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(json))?)
}

/// Create an error response with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ApiResponse::<()>::error(message))
}

/// Translate a core error into its status code and `{ error }` envelope.
pub fn error_to_response(err: &Error) -> Result<Response<Body>, lambda_http::Error> {
    error_response(err.status_code(), err.to_string())
}

/// Serve a calendar file as a download.
pub fn calendar_response(filename: &str, ics: String) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "text/calendar; charset=utf-8")
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        )
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::from(ics))?)
}

/// Parse request body as JSON, returning a 400 response on failure.
///
/// Returns `Ok(Ok(T))` on successful parse, `Ok(Err(Response))` on parse error (400),
/// or `Err(lambda_http::Error)` on serialization failure.
pub fn parse_json_body<T: DeserializeOwned>(body: &Body) -> Result<Result<T, Response<Body>>, lambda_http::Error> {
    match serde_json::from_slice(body.as_ref()) {
        Ok(parsed) => Ok(Ok(parsed)),
        Err(e) => {
            let response = error_response(400, format!("Invalid request body: {}", e))?;
            Ok(Err(response))
        }
    }
}

/// Macro to parse request body, returning early with 400 on parse error.
///
/// Usage:
/// ```ignore
/// let request: MyRequest = parse_body!(event.body());
/// ```
#[macro_export]
macro_rules! parse_body {
    ($body:expr) => {
        match $crate::http::parse_json_body($body)? {
            Ok(parsed) => parsed,
            Err(response) => return Ok(response),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(response: &Response<Body>) -> serde_json::Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[test]
    fn test_error_envelope() {
        let response = error_to_response(&Error::NotFound("Date plan x not found".into())).unwrap();
        assert_eq!(response.status(), 404);
        let json = body_json(&response);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Not found: Date plan x not found");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_ok_envelope() {
        let response = json_response(200, &ApiResponse::<()>::ok()).unwrap();
        assert_eq!(body_json(&response), serde_json::json!({"success": true}));
    }

    #[test]
    fn test_calendar_headers() {
        let response = calendar_response("Date Night.ics", "BEGIN:VCALENDAR".into()).unwrap();
        assert_eq!(response.headers()["content-type"], "text/calendar; charset=utf-8");
        assert_eq!(
            response.headers()["content-disposition"],
            "attachment; filename=\"Date Night.ics\""
        );
    }

    #[test]
    fn test_parse_json_body_rejects_garbage() {
        let body = Body::from("not json");
        let parsed = parse_json_body::<serde_json::Value>(&body).unwrap();
        let response = parsed.unwrap_err();
        assert_eq!(response.status(), 400);
    }
}
