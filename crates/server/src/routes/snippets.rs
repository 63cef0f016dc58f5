//! Snippet JSON API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use reusify_core::SnippetId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{OwnerSummary, Snippet, SnippetInput};
use crate::state::AppState;

/// A snippet together with a summary of its owner.
#[derive(Debug, Serialize)]
pub struct SnippetWithOwner {
    #[serde(flatten)]
    pub snippet: Snippet,
    pub user: OwnerSummary,
}

/// Confirmation body for a deleted snippet.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}

/// List the caller's snippets.
///
/// GET /api/snippets/me
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Snippet>>> {
    let snippets = state.snippets().list_mine(user.id).await?;
    Ok(Json(snippets))
}

/// Create a snippet.
///
/// POST /api/snippets/create
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<SnippetInput>,
) -> Result<(StatusCode, Json<Snippet>)> {
    let snippet = state.snippets().create(user.id, input).await?;
    Ok((StatusCode::CREATED, Json(snippet)))
}

/// Get a snippet with its tags and owner.
///
/// GET /api/snippets/{id}
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<SnippetId>,
) -> Result<Json<SnippetWithOwner>> {
    let (snippet, user) = state.snippets().get(id).await?;
    Ok(Json(SnippetWithOwner { snippet, user }))
}

/// Update one of the caller's snippets.
///
/// PUT /api/snippets/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<SnippetId>,
    Json(input): Json<SnippetInput>,
) -> Result<Json<Snippet>> {
    let snippet = state.snippets().update(user.id, id, input).await?;
    Ok(Json(snippet))
}

/// Delete one of the caller's snippets.
///
/// DELETE /api/snippets/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<SnippetId>,
) -> Result<Json<DeletedResponse>> {
    state.snippets().delete(user.id, id).await?;
    Ok(Json(DeletedResponse {
        message: "Snippet deleted successfully",
    }))
}
