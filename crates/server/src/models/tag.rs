//! Tag domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use reusify_core::{TagId, TagName, UserId};

/// A label attachable to many snippets.
///
/// Names are unique across the platform; `user_id` records who created the
/// tag and is not used for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique tag ID.
    pub id: TagId,
    /// Unique tag name.
    pub name: TagName,
    /// User who first created the tag, `None` once that account is gone.
    pub user_id: Option<UserId>,
    /// When the tag was created.
    pub created_at: DateTime<Utc>,
}

/// A tag together with the number of snippets it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    /// Tag ID.
    pub id: TagId,
    /// Tag name.
    pub name: TagName,
    /// Number of snippets (across all users) carrying the tag.
    pub count: i64,
}
