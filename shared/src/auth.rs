//! Session extraction from API Gateway requests.
//!
//! Identity is delegated to the Cognito authorizer configured on the API.
//! A request carrying authorizer claims is authenticated; anything else,
//! including a request with only an `Authorization` header, is anonymous.

use lambda_http::{Request, RequestExt};

use crate::{Error, Result};

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated {
        user_id: String,
        email: Option<String>,
    },
}

/// Resolution state of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// Claims not inspected yet
    #[default]
    Initializing,
    Authenticated,
    Unauthenticated,
    Error(String),
}

impl AuthStatus {
    pub fn from_result(result: &Result<Session>) -> Self {
        match result {
            Ok(session) => session.status(),
            Err(e) => AuthStatus::Error(e.to_string()),
        }
    }
}

impl Session {
    /// Build a session from API Gateway authorizer claims.
    pub fn from_claims(claims: &serde_json::Value) -> Result<Self> {
        let sub = claims
            .get("sub")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Auth("Missing sub claim".to_string()))?;

        let email = claims
            .get("email")
            .or_else(|| claims.get("cognito:username"))
            .and_then(|v| v.as_str())
            .map(String::from);

        Ok(Session::Authenticated {
            user_id: sub.to_string(),
            email,
        })
    }

    /// Resolve the session for a request from its authorizer claims.
    pub fn from_request(event: &Request) -> Result<Self> {
        let claims = event
            .request_context_ref()
            .and_then(|context| context.authorizer())
            .and_then(|authorizer| authorizer.fields.get("claims"));

        match claims {
            Some(claims) => Self::from_claims(claims),
            None => Ok(Session::Anonymous),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated { user_id, .. } => Some(user_id),
        }
    }

    /// The user id, or an `Auth` error for anonymous sessions.
    pub fn require_user(&self) -> Result<&str> {
        self.user_id()
            .ok_or_else(|| Error::Auth("Authentication required".to_string()))
    }

    pub fn status(&self) -> AuthStatus {
        match self {
            Session::Anonymous => AuthStatus::Unauthenticated,
            Session::Authenticated { .. } => AuthStatus::Authenticated,
        }
    }
}
