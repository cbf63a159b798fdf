//! Client-side note cache and list projections.
//!
//! # Responsibility
//! - Hold the in-memory projection of the server's note list.
//! - Track the note currently being edited.
//! - Provide the pure sort projection used for rendering.
//!
//! # Invariants
//! - The cache reflects the last successful server response; it is
//!   replaced wholesale, never merged.
//! - `sort_notes` never mutates the cache or changes its cardinality.

use crate::model::note::{Note, SortOrder};

/// In-memory note collection synchronized from the server.
#[derive(Debug, Default)]
pub struct NoteCache {
    notes: Vec<Note>,
    editing_id: Option<String>,
}

impl NoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Replaces the whole cache with a fresh server response.
    pub fn replace(&mut self, notes: Vec<Note>) {
        self.notes = notes;
    }

    /// Drops every cached note (failed load, sign-out).
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn find(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Marks `id` as the edit target; returns false when it is not cached.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if self.find(id).is_none() {
            return false;
        }
        self.editing_id = Some(id.to_string());
        true
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }
}

/// Pure ordering projection over the cached notes.
///
/// Missing creation timestamps order like the epoch, so they land last
/// under `Newest` and first under `Oldest`. Title ordering is
/// case-insensitive with a case-sensitive tiebreak.
pub fn sort_notes(notes: &[Note], order: SortOrder) -> Vec<Note> {
    let mut sorted = notes.to_vec();
    match order {
        SortOrder::Newest => {
            sorted.sort_by(|a, b| created_key(b).cmp(created_key(a)));
        }
        SortOrder::Oldest => {
            sorted.sort_by(|a, b| created_key(a).cmp(created_key(b)));
        }
        SortOrder::Title => {
            sorted.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title))
            });
        }
    }
    sorted
}

/// RFC 3339 strings compare chronologically as plain strings; the empty
/// string stands in for the epoch.
fn created_key(note: &Note) -> &str {
    note.created_at.as_deref().unwrap_or("")
}
