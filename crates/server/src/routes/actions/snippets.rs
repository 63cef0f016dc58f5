//! Snippet actions.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::{SearchQuery, bad_json, bad_query};
use crate::error::{ActionResponse, ActionResult};
use crate::middleware::RequireAuth;
use crate::models::SnippetInput;
use crate::state::AppState;

/// createSnippet
///
/// POST /actions/snippets
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    input: Result<Json<SnippetInput>, JsonRejection>,
) -> ActionResult {
    let Json(input) = input.map_err(bad_json)?;
    let snippet = state.snippets().create(user.id, input).await?;
    ActionResponse::with("snippet", &snippet)
}

/// searchSnippets
///
/// GET /actions/snippets/search?q=
pub async fn search(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ActionResult {
    let Query(query) = query.map_err(bad_query)?;
    let snippets = state.snippets().search(user.id, query.text()).await?;
    ActionResponse::with("snippets", &snippets)
}
