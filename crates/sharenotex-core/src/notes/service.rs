use std::sync::Arc;

use chrono::Utc;

use super::model::{NewNote, NewSharedNote, Note, NoteDraft, SharedNote};
use super::store::NoteStore;
use crate::error::{CoreError, CoreResult};
use crate::identity::IdentityProvider;
use crate::messages;

/// Note operations on behalf of an authenticated user.
///
/// Every method takes the caller's user id; notes owned by anyone else are
/// reported as not found.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { store, identity }
    }

    pub async fn create(&self, owner: &str, draft: NoteDraft) -> CoreResult<Note> {
        tracing::info!(user = %owner, "creating note");
        let now = Utc::now();
        let note = self
            .store
            .insert(NewNote {
                title: draft.title,
                content: draft.content,
                created_at: now,
                updated_at: now,
                user_id: owner.to_string(),
            })
            .await?;
        tracing::info!(user = %owner, id = note.id, "note created");
        Ok(note)
    }

    pub async fn find(&self, owner: &str, id: i64) -> CoreResult<Note> {
        tracing::info!(user = %owner, id, "finding note");
        self.store
            .find_by_id_and_owner(id, owner)
            .await?
            .ok_or_else(|| CoreError::not_found("id", messages::NOTE_NOT_FOUND))
    }

    pub async fn find_all(&self, owner: &str) -> CoreResult<Vec<Note>> {
        let notes = self.store.list_by_owner(owner).await?;
        tracing::info!(user = %owner, count = notes.len(), "listed notes");
        Ok(notes)
    }

    pub async fn update(&self, owner: &str, id: i64, draft: NoteDraft) -> CoreResult<Note> {
        tracing::info!(user = %owner, id, "updating note");
        let mut note = self.owned(owner, id).await?;
        note.title = draft.title;
        note.content = draft.content;
        note.updated_at = Utc::now();
        self.store
            .update(note)
            .await?
            .ok_or_else(|| CoreError::not_found("id", messages::NOT_FOUND))
    }

    pub async fn delete(&self, owner: &str, id: i64) -> CoreResult<()> {
        tracing::info!(user = %owner, id, "deleting note");
        let note = self.owned(owner, id).await?;
        if !self.store.delete(note.id).await? {
            return Err(CoreError::not_found("id", messages::NOT_FOUND));
        }
        Ok(())
    }

    /// Share one of `owner`'s notes with `recipient`.
    ///
    /// The recipient must exist at the identity provider. The stored record
    /// holds a snapshot of the note.
    pub async fn share(&self, owner: &str, note_id: i64, recipient: &str) -> CoreResult<SharedNote> {
        tracing::info!(user = %owner, id = note_id, recipient = %recipient, "sharing note");
        let note = self.owned(owner, note_id).await?;

        self.identity
            .find_user(recipient)
            .await
            .map_err(|e| match e {
                CoreError::NotFound { .. } => CoreError::not_found("id", messages::NOT_FOUND),
                other => other,
            })?;

        let shared = self
            .store
            .insert_shared(NewSharedNote {
                shared_by: note.user_id.clone(),
                shared_to: recipient.to_string(),
                shared_at: Utc::now(),
                note,
            })
            .await?;
        tracing::info!(shared_id = shared.id, "note shared");
        Ok(shared)
    }

    pub async fn search(&self, owner: &str, query: &str) -> CoreResult<Vec<Note>> {
        let notes = self.store.search_by_owner(owner, query).await?;
        tracing::info!(user = %owner, query = %query, count = notes.len(), "searched notes");
        Ok(notes)
    }

    /// Notes other users have shared with `user`.
    pub async fn shared_with(&self, user: &str) -> CoreResult<Vec<SharedNote>> {
        self.store.list_shared_with(user).await
    }

    async fn owned(&self, owner: &str, id: i64) -> CoreResult<Note> {
        self.store
            .find_by_id_and_owner(id, owner)
            .await?
            .ok_or_else(|| CoreError::not_found("id", messages::NOT_FOUND))
    }
}
