//! Editing session for one note: local draft, autosave and sync policy
//!
//! Keystrokes and toolbar actions change the local draft immediately. The
//! settled title and content are written to the note store once the
//! autosave window passes without further edits. Content arriving from
//! outside (for example a checkbox toggled in another view) is reconciled
//! against the draft with [`EditorSession::receive_external`].

use anyhow::Result;
use std::time::{Duration, Instant};

use crate::actions::EditorAction;
use crate::image::{self, ImageStore};
use crate::note::{Note, NoteStore};
use crate::selection::Selection;
use crate::tasks;
use crate::transform::{self, Edit};

/// Default idle window before an edit is written upstream
pub const DEFAULT_AUTOSAVE: Duration = Duration::from_millis(400);

/// Holds the most recent value until it has been left alone for `window`
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Replace any pending value and restart the idle window
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value if the window has elapsed since it was scheduled
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, scheduled) = self.pending.as_ref()?;
        if now.saturating_duration_since(*scheduled) < self.window {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value without firing
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// What happened to content received from outside the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The incoming text is what the editor already has
    Echo,
    /// The incoming text replaced the draft
    Adopted,
    /// The draft has unsaved edits, so it was kept
    KeptLocal,
}

/// Editor state for a single note
#[derive(Debug, Clone)]
pub struct EditorSession {
    note_id: String,
    title: String,
    local_draft: String,
    synced_title: String,
    last_synced: String,
    selection: Selection,
    autosave: Debouncer<()>,
}

impl EditorSession {
    /// Open a note for editing with the caret at the end of its content
    pub fn open(note: &Note, autosave_window: Duration) -> Self {
        Self {
            note_id: note.id.clone(),
            title: note.title.clone(),
            local_draft: note.content.clone(),
            synced_title: note.title.clone(),
            last_synced: note.content.clone(),
            selection: Selection::caret(note.content.chars().count()),
            autosave: Debouncer::new(autosave_window),
        }
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.local_draft
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamp(self.local_draft.chars().count());
    }

    /// True while the draft or title differ from what was last synced
    pub fn is_dirty(&self) -> bool {
        self.local_draft != self.last_synced || self.title != self.synced_title
    }

    pub fn set_title(&mut self, title: impl Into<String>, now: Instant) {
        self.title = title.into();
        self.autosave.schedule((), now);
    }

    /// Replace the draft with text typed by the user
    pub fn type_text(&mut self, text: impl Into<String>, selection: Selection, now: Instant) {
        self.apply_edit(
            Edit {
                text: text.into(),
                selection,
            },
            now,
        );
    }

    /// Apply a transform result as a local edit
    pub fn apply_edit(&mut self, edit: Edit, now: Instant) {
        self.local_draft = edit.text;
        self.set_selection(edit.selection);
        self.autosave.schedule((), now);
    }

    /// Run a toolbar action against the current draft and selection
    pub fn apply_action(&mut self, action: EditorAction, now: Instant) {
        let edit = action.apply(&self.local_draft, self.selection);
        self.apply_edit(edit, now);
    }

    /// Toggle the Nth checkbox. Returns false when there is no such checkbox.
    pub fn toggle_task(&mut self, ordinal: usize, now: Instant) -> bool {
        let Some(text) = tasks::toggle_task(&self.local_draft, ordinal) else {
            return false;
        };
        let selection = self.selection;
        self.apply_edit(Edit { text, selection }, now);
        true
    }

    /// Store an image payload and insert its reference at the selection.
    ///
    /// A payload that cannot be encoded is reported and leaves the draft
    /// untouched.
    pub fn insert_image(
        &mut self,
        images: &mut ImageStore,
        file_name: &str,
        bytes: &[u8],
        max_bytes: u64,
        now: Instant,
    ) -> Result<String> {
        let payload = image::data_url(file_name, bytes, max_bytes)?;
        let id = images.save(payload);
        let markdown = image::image_markdown(&image::alt_text(file_name), &id);
        let edit = transform::insert_block(&self.local_draft, self.selection, &markdown);
        self.apply_edit(edit, now);
        Ok(id)
    }

    /// Write the settled title and content once the autosave window passed.
    ///
    /// Returns true when a write happened.
    pub fn poll_autosave(&mut self, store: &mut dyn NoteStore, now: Instant) -> Result<bool> {
        if self.autosave.poll(now).is_none() {
            return Ok(false);
        }
        self.write_through(store)
    }

    /// Write pending changes immediately, ignoring the autosave window
    pub fn flush(&mut self, store: &mut dyn NoteStore) -> Result<bool> {
        self.autosave.cancel();
        self.write_through(store)
    }

    fn write_through(&mut self, store: &mut dyn NoteStore) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        store.update(&self.note_id, &self.title, &self.local_draft)?;
        log::debug!(
            "Saved note {} ({} chars)",
            self.note_id,
            self.local_draft.chars().count()
        );
        self.synced_title = self.title.clone();
        self.last_synced = self.local_draft.clone();
        Ok(true)
    }

    /// Reconcile content that changed outside the editor.
    ///
    /// The incoming text wins unless the user has typed since the last sync;
    /// text equal to the draft is the editor's own write coming back.
    pub fn receive_external(&mut self, content: &str) -> SyncOutcome {
        if content == self.local_draft {
            self.last_synced = content.to_string();
            return SyncOutcome::Echo;
        }
        if self.local_draft != self.last_synced {
            log::debug!("Keeping local draft of note {} over external update", self.note_id);
            return SyncOutcome::KeptLocal;
        }

        self.local_draft = content.to_string();
        self.last_synced = content.to_string();
        self.set_selection(self.selection);
        SyncOutcome::Adopted
    }
}
