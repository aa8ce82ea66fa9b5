use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sharenotex_core::{Credentials, NewUser, Note, NoteDraft, SharedNote};
use validator::Validate;

use crate::validation::not_blank;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(rename = "firstName", default)]
    #[validate(custom(function = "not_blank", message = "First name cannot be empty"))]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    #[validate(custom(function = "not_blank", message = "Last name cannot be empty"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Password cannot be empty"))]
    pub password: String,
}

impl From<SignupRequest> for NewUser {
    fn from(req: SignupRequest) -> Self {
        NewUser {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(rename = "userName", default)]
    #[validate(custom(function = "not_blank", message = "Username cannot be empty"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Password cannot be empty"))]
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(req: LoginRequest) -> Self {
        Credentials {
            username: req.user_name,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NoteRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title cannot be empty"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Content cannot be empty"))]
    pub content: String,
}

impl From<NoteRequest> for NoteDraft {
    fn from(req: NoteRequest) -> Self {
        NoteDraft::new(req.title, req.content)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ShareNoteRequest {
    /// Missing ids deserialize to 0, which no note has.
    #[serde(rename = "noteId", default)]
    #[validate(range(min = 1, message = "Note id cannot be empty"))]
    pub note_id: i64,
    #[serde(rename = "sharedTo", default)]
    #[validate(custom(function = "not_blank", message = "Recipient cannot be empty"))]
    pub shared_to: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Query cannot be empty"))]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A note as returned to its owner.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        NoteResponse {
            id: note.id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedNoteResponse {
    pub id: i64,
    pub shared_by: String,
    pub shared_at: DateTime<Utc>,
    pub note: NoteResponse,
}

impl From<SharedNote> for SharedNoteResponse {
    fn from(shared: SharedNote) -> Self {
        SharedNoteResponse {
            id: shared.id,
            shared_by: shared.shared_by,
            shared_at: shared.shared_at,
            note: shared.note.into(),
        }
    }
}
