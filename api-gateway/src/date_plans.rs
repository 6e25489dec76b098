//! Date Plans API - read, delete and export saved date plans.
//!
//! Endpoints:
//! - GET /date-plans - List the caller's plans
//! - GET /date-plans/{id} - Get a single plan
//! - DELETE /date-plans/{id} - Delete one of the caller's plans
//! - GET /calendar/{id} - Download a plan as an iCal file

use std::sync::Arc;

use datethinker_shared::http::{calendar_response, error_response, json_response, ApiResponse};
use datethinker_shared::{
    calendar_filename, db, generate_ical_event, get_database_credentials, AuthStatus, Config,
    DatePlanStore, Error as CoreError, MemoryDatePlanStore, PgDatePlanStore, Session,
};
use lambda_http::{Body, Error, Request, Response};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{failure_response, route_path};

/// Application state
pub struct AppState {
    pub store: Arc<dyn DatePlanStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DatePlanStore>) -> Self {
        Self { store }
    }

    /// Connect the configured store.
    pub async fn from_env() -> Result<Self, Error> {
        let config = Config::from_env()?;

        if config.use_memory_store {
            warn!("DATE_PLAN_STORE=memory, plans will not outlive this process");
            return Ok(Self::new(Arc::new(MemoryDatePlanStore::new())));
        }

        let db_secret_arn = config
            .db_secret_arn
            .as_deref()
            .ok_or("DB_SECRET_ARN not set")?;

        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let credentials = get_database_credentials(&secrets_client, db_secret_arn).await?;
        let pool = db::create_pool(&config, &credentials).await?;

        Ok(Self::new(Arc::new(PgDatePlanStore::new(pool))))
    }
}

/// Parse a plan id from a path segment; a trailing `.ics` is allowed.
fn parse_plan_id(raw: &str) -> Result<Uuid, CoreError> {
    let raw = raw.trim_matches('/');
    let raw = raw.strip_suffix(".ics").unwrap_or(raw);
    Uuid::parse_str(raw)
        .map_err(|_| CoreError::InvalidRequest(format!("Invalid date plan ID: {}", raw)))
}

pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let method = event.method().as_str();
    let path = route_path(event.uri().path());

    info!("Date plans request: {} {}", method, path);

    match (method, path) {
        ("GET", "/date-plans") => list_plans(&state, &event).await,
        ("GET", p) if p.starts_with("/date-plans/") => {
            get_plan(&state, &p["/date-plans/".len()..]).await
        }
        ("DELETE", p) if p.starts_with("/date-plans/") => {
            delete_plan(&state, &event, &p["/date-plans/".len()..]).await
        }
        ("GET", p) if p.starts_with("/calendar/") => {
            export_calendar(&state, &p["/calendar/".len()..]).await
        }
        _ => error_response(404, "Not found"),
    }
}

/// The caller's user id; anonymous callers get an `Auth` error.
fn require_user(event: &Request) -> Result<String, CoreError> {
    let session = Session::from_request(event);
    debug!("Session status: {:?}", AuthStatus::from_result(&session));
    session?.require_user().map(String::from)
}

async fn list_plans(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let user_id = match require_user(event) {
        Ok(user_id) => user_id,
        Err(e) => return failure_response("GET /date-plans", "session", &e),
    };

    match state.store.list_date_plans(&user_id).await {
        Ok(plans) => json_response(200, &ApiResponse::success(plans)),
        Err(e) => failure_response("GET /date-plans", &format!("user={}", user_id), &e),
    }
}

async fn get_plan(state: &AppState, raw_id: &str) -> Result<Response<Body>, Error> {
    let id = match parse_plan_id(raw_id) {
        Ok(id) => id,
        Err(e) => return failure_response("GET /date-plans/{id}", raw_id, &e),
    };

    match state.store.get_date_plan(id).await {
        Ok(plan) => json_response(200, &ApiResponse::success(plan)),
        Err(e) => failure_response("GET /date-plans/{id}", &id.to_string(), &e),
    }
}

async fn delete_plan(
    state: &AppState,
    event: &Request,
    raw_id: &str,
) -> Result<Response<Body>, Error> {
    let user_id = match require_user(event) {
        Ok(user_id) => user_id,
        Err(e) => return failure_response("DELETE /date-plans/{id}", "session", &e),
    };
    let id = match parse_plan_id(raw_id) {
        Ok(id) => id,
        Err(e) => return failure_response("DELETE /date-plans/{id}", raw_id, &e),
    };

    match state.store.delete_date_plan(id, &user_id).await {
        Ok(()) => {
            info!("Deleted date plan {} for {}", id, user_id);
            json_response(200, &ApiResponse::<()>::ok())
        }
        Err(e) => failure_response("DELETE /date-plans/{id}", &id.to_string(), &e),
    }
}

async fn export_calendar(state: &AppState, raw_id: &str) -> Result<Response<Body>, Error> {
    let id = match parse_plan_id(raw_id) {
        Ok(id) => id,
        Err(e) => return failure_response("GET /calendar/{id}", raw_id, &e),
    };

    match state.store.get_date_plan(id).await {
        Ok(plan) => calendar_response(&calendar_filename(&plan.title), generate_ical_event(&plan)),
        Err(e) => failure_response("GET /calendar/{id}", &id.to_string(), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_plan_id(&id.to_string()).unwrap(), id);
        assert_eq!(parse_plan_id(&format!("{}.ics", id)).unwrap(), id);
        assert_eq!(parse_plan_id(&format!("{}/", id)).unwrap(), id);
    }

    #[test]
    fn test_parse_plan_id_rejects_garbage() {
        let err = parse_plan_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
