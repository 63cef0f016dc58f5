//! Snippet domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reusify_core::{SnippetId, TagName, UserId};

use super::Tag;

/// A stored piece of code with its metadata and tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Unique snippet ID.
    pub id: SnippetId,
    /// Short title.
    pub title: String,
    /// Raw code text.
    pub content: String,
    /// Free-text language label (e.g. "TypeScript").
    pub language: String,
    /// Owning user.
    pub user_id: UserId,
    /// Attached tags, ordered by name.
    pub tags: Vec<Tag>,
    /// When the snippet was created.
    pub created_at: DateTime<Utc>,
    /// When the snippet, or its tag set, last changed.
    pub updated_at: DateTime<Utc>,
}

impl Snippet {
    /// Names of the attached tags.
    #[must_use]
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Public view of a snippet's owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    /// Owner's user ID.
    pub id: UserId,
    /// Owner's display name.
    pub name: String,
}

/// Validated input for creating a snippet.
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub title: String,
    pub language: String,
    pub content: String,
    /// Tag names, already deduplicated; resolved by find-or-create.
    pub tags: Vec<TagName>,
}

/// Validated partial update. `None` leaves the field unchanged.
///
/// A `Some` tag list replaces the snippet's whole tag set.
#[derive(Debug, Clone, Default)]
pub struct SnippetChanges {
    pub title: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<TagName>>,
}

/// Unvalidated snippet fields as submitted by a client.
///
/// Used for both create and update bodies; the services decide which fields
/// are required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnippetInput {
    pub title: Option<String>,
    pub language: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}
