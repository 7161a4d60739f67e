//! Records mirrored from the hosted backend, plus client-side identity state.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One travel post, exactly as the backend stores it.
///
/// `comments` is a dual-purpose text field: the free-form story followed by
/// an inline, append-only comment log (see [`crate::domain::thread`]).
/// `description` is only populated on reposts and carries the textual
/// back-reference to the original (see [`crate::domain::repost`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub title: String,
    pub username: String,
    /// Plaintext management key chosen at creation. Compared for equality,
    /// never displayed.
    #[serde(default)]
    pub user_password: String,
    pub location: Option<String>,
    pub travel_type: Option<String>,
    pub photos: Option<String>,
    pub comments: Option<String>,
    #[serde(default)]
    pub like: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl PostRecord {
    pub fn story_text(&self) -> &str {
        self.comments.as_deref().unwrap_or("")
    }
}

/// Insert payload for a freshly composed post.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub username: String,
    pub user_password: String,
    pub photos: String,
    pub location: String,
    pub travel_type: String,
    pub comments: String,
    pub like: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update payload; only populated fields are sent to the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like: Option<i64>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// The authenticated user as reported by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl UserIdentity {
    /// Display precedence: username, then email, then the raw id.
    pub fn display_name(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return username.to_string();
        }
        if !self.email.is_empty() {
            return self.email.clone();
        }
        self.id.to_string()
    }
}
