//! Persistence boundary for notes.

use async_trait::async_trait;

use super::model::{NewNote, NewSharedNote, Note, SharedNote};
use crate::error::CoreResult;

/// Storage for notes and share records, always scoped by owner.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> CoreResult<Option<Note>>;

    /// All notes owned by `owner`, ordered by id.
    async fn list_by_owner(&self, owner: &str) -> CoreResult<Vec<Note>>;

    /// Notes owned by `owner` whose content contains `query`, ignoring case.
    async fn search_by_owner(&self, owner: &str, query: &str) -> CoreResult<Vec<Note>>;

    async fn insert(&self, note: NewNote) -> CoreResult<Note>;

    /// Replace a stored note. Returns `None` if `note.id` is not stored.
    async fn update(&self, note: Note) -> CoreResult<Option<Note>>;

    /// Returns `true` if a note was removed.
    async fn delete(&self, id: i64) -> CoreResult<bool>;

    async fn insert_shared(&self, shared: NewSharedNote) -> CoreResult<SharedNote>;

    /// Share records whose recipient is `recipient`, ordered by id.
    async fn list_shared_with(&self, recipient: &str) -> CoreResult<Vec<SharedNote>>;
}
