//! Unified error handling with Sentry integration.
//!
//! Two response shapes share this module:
//!
//! - [`AppError`] for the `/api` routes: an HTTP status plus `{"error": msg}`.
//! - [`ActionError`] and [`ActionResponse`] for the `/actions` routes: always
//!   `200 OK` with a `{"success": ..}` envelope.
//!
//! Server-side failures are captured to Sentry and their details are never
//! sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, ServiceError};

/// Message returned to clients for any server-side failure.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the JSON API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Snippet or tag operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(_) | Self::Internal(_) | Self::Service(ServiceError::Repository(_)) => {
                true
            }
            Self::Auth(err) => matches!(err, AuthError::Repository(_) | AuthError::PasswordHash),
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Service(err) => match err {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::InvalidName(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message shown to the client.
    fn public_message(&self) -> String {
        if self.is_server_error() {
            return INTERNAL_MESSAGE.to_owned();
        }
        match self {
            Self::Service(err) => err.to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid credentials".to_owned(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists".to_owned()
                }
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::InvalidName(e) => capitalize(&e.to_string()),
                _ => "Authentication error".to_owned(),
            },
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Server Action Envelope
// =============================================================================

/// Message reported by an action when the caller has no session.
pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated";

/// Message reported by an action when the store fails.
const ACTION_FAILURE_MESSAGE: &str = "Something went wrong, please try again";

/// Successful server action: `{"success": true, <key>: <payload>}`.
#[derive(Debug)]
pub struct ActionResponse(Map<String, Value>);

impl ActionResponse {
    /// A success envelope with no payload.
    #[must_use]
    pub fn success() -> Self {
        let mut body = Map::new();
        body.insert("success".to_owned(), Value::Bool(true));
        Self(body)
    }

    /// A success envelope carrying `payload` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::Internal` if the payload cannot be serialized.
    pub fn with<T: Serialize>(key: &str, payload: &T) -> std::result::Result<Self, ActionError> {
        let value =
            serde_json::to_value(payload).map_err(|e| ActionError::Internal(e.to_string()))?;
        let mut response = Self::success();
        response.0.insert(key.to_owned(), value);
        Ok(response)
    }
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(Value::Object(self.0))).into_response()
    }
}

/// Failed server action: `{"success": false, "error": <message>}`.
#[derive(Debug, Error)]
pub enum ActionError {
    /// No user in the session.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The service rejected or failed the operation.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Request body or query could not be understood.
    #[error("{0}")]
    BadInput(String),

    /// Unexpected server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ActionError {
    fn public_message(&self) -> String {
        match self {
            Self::NotAuthenticated => NOT_AUTHENTICATED_MESSAGE.to_owned(),
            Self::Service(ServiceError::Repository(_)) | Self::Internal(_) => {
                ACTION_FAILURE_MESSAGE.to_owned()
            }
            Self::Service(err) => err.to_string(),
            Self::BadInput(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Service(ServiceError::Repository(_)) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Action failed");
        } else {
            tracing::debug!(error = %self, "Action rejected");
        }

        let body = serde_json::json!({
            "success": false,
            "error": self.public_message(),
        });
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Result type for server action handlers.
pub type ActionResult = std::result::Result<ActionResponse, ActionError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(ServiceError::Forbidden("no".to_owned()).into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(ServiceError::Validation("bad".to_owned()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::UserAlreadyExists.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_app_error_body_is_json() {
        let response = AppError::from(ServiceError::NotFound("Snippet not found".to_owned()))
            .into_response();
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Snippet not found" })
        );
    }

    #[tokio::test]
    async fn test_app_error_hides_internal_details() {
        let response = AppError::from(RepositoryError::DataCorruption("secret".to_owned()))
            .into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_action_response_envelope() {
        let response = ActionResponse::with("removed", &3_u64).unwrap().into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": true, "removed": 3 })
        );
    }

    #[tokio::test]
    async fn test_action_error_envelope() {
        let response = ActionError::NotAuthenticated.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "success": false, "error": "Not authenticated" })
        );

        let response =
            ActionError::from(ServiceError::Repository(RepositoryError::NotFound)).into_response();
        assert_eq!(body_json(response).await["error"], ACTION_FAILURE_MESSAGE);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("name must be"), "Name must be");
        assert_eq!(capitalize(""), "");
    }
}
