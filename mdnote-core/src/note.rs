//! Notes and the store the editor persists them through

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// A titled Markdown note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    /// Milliseconds since the Unix epoch
    pub created_at: u64,
    pub updated_at: u64,
}

impl Note {
    /// Create a note with a fresh id, stamped with the current time
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            content: content.into(),
            folder_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Current wall-clock time in milliseconds
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Backing store for note title and content.
///
/// The editor only ever reads a note by id and writes back its settled
/// title and content.
pub trait NoteStore {
    fn load(&self, id: &str) -> Result<Option<Note>>;
    fn update(&mut self, id: &str, title: &str, content: &str) -> Result<()>;
}

/// In-memory note store
#[derive(Debug, Default, Clone)]
pub struct MemoryNoteStore {
    notes: BTreeMap<String, Note>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note, returning its id
    pub fn insert(&mut self, note: Note) -> String {
        let id = note.id.clone();
        self.notes.insert(id.clone(), note);
        id
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }
}

impl NoteStore for MemoryNoteStore {
    fn load(&self, id: &str) -> Result<Option<Note>> {
        Ok(self.notes.get(id).cloned())
    }

    fn update(&mut self, id: &str, title: &str, content: &str) -> Result<()> {
        let Some(note) = self.notes.get_mut(id) else {
            bail!("Note not found: {id}");
        };
        note.title = title.to_string();
        note.content = content.to_string();
        note.updated_at = now_millis().max(note.updated_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note_has_id_and_timestamps() {
        let note = Note::new("Title", "body");
        assert!(!note.id.is_empty());
        assert_eq!(note.created_at, note.updated_at);
        assert!(note.folder_id.is_none());
    }

    #[test]
    fn test_memory_store_update() -> Result<()> {
        let mut store = MemoryNoteStore::new();
        let id = store.insert(Note::new("a", "b"));

        store.update(&id, "A", "B")?;
        let note = store.load(&id)?.unwrap();
        assert_eq!(note.title, "A");
        assert_eq!(note.content, "B");
        assert!(note.updated_at >= note.created_at);
        Ok(())
    }

    #[test]
    fn test_update_missing_note_fails() {
        let mut store = MemoryNoteStore::new();
        assert!(store.update("nope", "t", "c").is_err());
    }
}
