//! In-process [`NoteStore`] backed by concurrent maps.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::model::{NewNote, NewSharedNote, Note, SharedNote};
use super::store::NoteStore;
use crate::error::CoreResult;

/// Notes and share records held in memory. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryNoteStore {
    notes: DashMap<i64, Note>,
    shared: DashMap<i64, SharedNote>,
    next_note_id: AtomicI64,
    next_shared_id: AtomicI64,
}

impl Default for InMemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: DashMap::new(),
            shared: DashMap::new(),
            next_note_id: AtomicI64::new(1),
            next_shared_id: AtomicI64::new(1),
        }
    }

    fn collect_notes(&self, keep: impl Fn(&Note) -> bool) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by_key(|n| n.id);
        notes
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> CoreResult<Option<Note>> {
        Ok(self
            .notes
            .get(&id)
            .filter(|n| n.user_id == owner)
            .map(|n| n.clone()))
    }

    async fn list_by_owner(&self, owner: &str) -> CoreResult<Vec<Note>> {
        Ok(self.collect_notes(|n| n.user_id == owner))
    }

    async fn search_by_owner(&self, owner: &str, query: &str) -> CoreResult<Vec<Note>> {
        let needle = query.to_lowercase();
        Ok(self.collect_notes(|n| n.user_id == owner && n.content.to_lowercase().contains(&needle)))
    }

    async fn insert(&self, note: NewNote) -> CoreResult<Note> {
        let id = self.next_note_id.fetch_add(1, Ordering::SeqCst);
        let stored = Note {
            id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
            user_id: note.user_id,
        };
        self.notes.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, note: Note) -> CoreResult<Option<Note>> {
        match self.notes.get_mut(&note.id) {
            Some(mut slot) => {
                *slot = note.clone();
                Ok(Some(note))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> CoreResult<bool> {
        Ok(self.notes.remove(&id).is_some())
    }

    async fn insert_shared(&self, shared: NewSharedNote) -> CoreResult<SharedNote> {
        let id = self.next_shared_id.fetch_add(1, Ordering::SeqCst);
        let stored = SharedNote {
            id,
            shared_by: shared.shared_by,
            shared_to: shared.shared_to,
            shared_at: shared.shared_at,
            note: shared.note,
        };
        self.shared.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_shared_with(&self, recipient: &str) -> CoreResult<Vec<SharedNote>> {
        let mut records: Vec<SharedNote> = self
            .shared
            .iter()
            .filter(|entry| entry.shared_to == recipient)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|s| s.id);
        Ok(records)
    }
}
