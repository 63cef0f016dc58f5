//! Authentication route handlers.
//!
//! Password registration and login over JSON. A successful register or login
//! stores a [`CurrentUser`] in the session under a fresh session ID.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::state::AppState;

/// Registration request body.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

async fn start_session(session: &Session, user: &User) -> Result<CurrentUser> {
    let current = CurrentUser::from(user);
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_sentry_user(&current.id, Some(current.email.as_str()));
    Ok(current)
}

/// Register a new account and log it in.
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    let user = state
        .auth()
        .register(&req.name, &req.email, &req.password)
        .await?;

    let current = start_session(&session, &user).await?;
    Ok((StatusCode::CREATED, Json(current)))
}

/// Log in with email and password.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Json<CurrentUser>> {
    let user = match state
        .auth()
        .login(&req.email, &req.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::info!(error = %e, "login failed");
            return Err(e.into());
        }
    };

    let current = start_session(&session, &user).await?;
    tracing::info!(user = %current.id, "user logged in");
    Ok(Json(current))
}

/// Log out.
///
/// POST /api/auth/logout
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in user.
///
/// GET /api/auth/session
pub async fn session(RequireAuth(user): RequireAuth) -> Json<CurrentUser> {
    Json(user)
}
