//! Tag actions.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::Deserialize;

use reusify_core::TagId;

use super::{SearchQuery, bad_json, bad_path, bad_query};
use crate::error::{ActionResponse, ActionResult};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Body for creating or renaming a tag.
#[derive(Debug, Deserialize)]
pub struct TagNameRequest {
    pub name: String,
}

/// `?limit=` query for popular tags.
#[derive(Debug, Default, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<u32>,
}

/// getUserTags
pub async fn list_mine(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> ActionResult {
    let tags = state.tags().list_mine(user.id).await?;
    ActionResponse::with("tags", &tags)
}

/// getPopularTags
pub async fn popular(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    query: Result<Query<PopularQuery>, QueryRejection>,
) -> ActionResult {
    let Query(query) = query.map_err(bad_query)?;
    let tags = state.tags().popular(query.limit).await?;
    ActionResponse::with("tags", &tags)
}

/// searchTags
pub async fn search(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ActionResult {
    let Query(query) = query.map_err(bad_query)?;
    let tags = state.tags().search(query.text()).await?;
    ActionResponse::with("tags", &tags)
}

/// createTag
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<TagNameRequest>, JsonRejection>,
) -> ActionResult {
    let Json(body) = body.map_err(bad_json)?;
    let tag = state.tags().create(user.id, &body.name).await?;
    ActionResponse::with("tag", &tag)
}

/// updateTag
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: Result<Path<TagId>, PathRejection>,
    body: Result<Json<TagNameRequest>, JsonRejection>,
) -> ActionResult {
    let Path(id) = id.map_err(bad_path)?;
    let Json(body) = body.map_err(bad_json)?;
    let tag = state.tags().rename(user.id, id, &body.name).await?;
    ActionResponse::with("tag", &tag)
}

/// deleteTag
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: Result<Path<TagId>, PathRejection>,
) -> ActionResult {
    let Path(id) = id.map_err(bad_path)?;
    state.tags().delete(user.id, id).await?;
    Ok(ActionResponse::success())
}

/// removeTagFromUserSnippets
pub async fn remove_from_my_snippets(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: Result<Path<TagId>, PathRejection>,
) -> ActionResult {
    let Path(id) = id.map_err(bad_path)?;
    let removed = state.tags().remove_from_my_snippets(user.id, id).await?;
    ActionResponse::with("removed", &removed)
}

/// getSnippetsByTag
pub async fn snippets(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    id: Result<Path<TagId>, PathRejection>,
) -> ActionResult {
    let Path(id) = id.map_err(bad_path)?;
    let snippets = state.snippets().list_by_tag(user.id, id).await?;
    ActionResponse::with("snippets", &snippets)
}
