//! Note domain model.
//!
//! # Responsibility
//! - Define the note record served by the notes API.
//! - Validate draft input fully before any network call is made.
//!
//! # Invariants
//! - `id` is server-assigned and uniquely identifies a note in the cache.
//! - Draft limits: title ≤ 200 chars, content ≤ 20000 chars, neither empty.
//! - Timestamps stay opaque RFC 3339 strings; a missing timestamp orders
//!   like the epoch.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum accepted note title length, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum accepted note content length, in characters.
pub const CONTENT_MAX_CHARS: usize = 20_000;

/// Note record as returned by the notes API.
///
/// The server is authoritative for every field; the client cache only
/// projects the last successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned stable id. Some deployments send it as `_id`.
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub content: String,
    /// Creation timestamp (RFC 3339) when the server supplies one.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last-update timestamp (RFC 3339) when the server supplies one.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Validation error for note drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title or content is empty after trimming.
    MissingFields,
    /// Title exceeds [`TITLE_MAX_CHARS`].
    TitleTooLong(usize),
    /// Content exceeds [`CONTENT_MAX_CHARS`].
    ContentTooLong(usize),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Please fill in both title and content"),
            Self::TitleTooLong(_) => {
                write!(f, "Title must be {TITLE_MAX_CHARS} characters or less")
            }
            Self::ContentTooLong(_) => {
                write!(f, "Content must be {CONTENT_MAX_CHARS} characters or less")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// User-entered note input, normalized and validated client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    /// Builds a draft from raw form input, trimming surrounding whitespace.
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
        }
    }

    /// Checks every local rule; the draft must pass before it is sent.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.is_empty() || self.content.is_empty() {
            return Err(NoteValidationError::MissingFields);
        }

        let title_chars = self.title.chars().count();
        if title_chars > TITLE_MAX_CHARS {
            return Err(NoteValidationError::TitleTooLong(title_chars));
        }

        let content_chars = self.content.chars().count();
        if content_chars > CONTENT_MAX_CHARS {
            return Err(NoteValidationError::ContentTooLong(content_chars));
        }

        Ok(())
    }
}

/// Recognized orderings for the note list projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Descending creation time; missing timestamps sort last.
    #[default]
    Newest,
    /// Ascending creation time; missing timestamps sort first.
    Oldest,
    /// Case-insensitive title ordering.
    Title,
}

impl SortOrder {
    /// Parses the criterion names used by the presentation layer.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" => Some(Self::Newest),
            "oldest" => Some(Self::Oldest),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteDraft, NoteValidationError, SortOrder, CONTENT_MAX_CHARS, TITLE_MAX_CHARS};

    #[test]
    fn draft_trims_and_accepts_valid_input() {
        let draft = NoteDraft::new("  groceries  ", "  milk, eggs  ");
        assert_eq!(draft.title, "groceries");
        assert_eq!(draft.content, "milk, eggs");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn draft_rejects_empty_fields() {
        assert_eq!(
            NoteDraft::new("title", "   ").validate(),
            Err(NoteValidationError::MissingFields)
        );
        assert_eq!(
            NoteDraft::new("", "content").validate(),
            Err(NoteValidationError::MissingFields)
        );
    }

    #[test]
    fn draft_enforces_character_limits() {
        let long_title = "t".repeat(TITLE_MAX_CHARS + 1);
        assert_eq!(
            NoteDraft::new(&long_title, "content").validate(),
            Err(NoteValidationError::TitleTooLong(TITLE_MAX_CHARS + 1))
        );

        let long_content = "c".repeat(CONTENT_MAX_CHARS + 1);
        assert_eq!(
            NoteDraft::new("title", &long_content).validate(),
            Err(NoteValidationError::ContentTooLong(CONTENT_MAX_CHARS + 1))
        );

        let exact_title = "t".repeat(TITLE_MAX_CHARS);
        assert!(NoteDraft::new(&exact_title, "content").validate().is_ok());
    }

    #[test]
    fn sort_order_parses_known_criteria() {
        assert_eq!(SortOrder::parse("newest"), Some(SortOrder::Newest));
        assert_eq!(SortOrder::parse(" Title "), Some(SortOrder::Title));
        assert_eq!(SortOrder::parse("recent"), None);
    }
}
