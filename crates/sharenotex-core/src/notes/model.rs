use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored note, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identity-provider id of the owner.
    pub user_id: String,
}

/// Title and content supplied by a client for a new or updated note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// A note that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

/// A record of one user sharing a note with another.
///
/// `note` is a copy of the note as it was when shared; later edits or
/// deletion of the original do not change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedNote {
    pub id: i64,
    pub shared_by: String,
    pub shared_to: String,
    pub shared_at: DateTime<Utc>,
    pub note: Note,
}

/// A share record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSharedNote {
    pub shared_by: String,
    pub shared_to: String,
    pub shared_at: DateTime<Utc>,
    pub note: Note,
}
