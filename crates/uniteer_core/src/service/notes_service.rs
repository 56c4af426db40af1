//! Sticky-note wall use-case service.
//!
//! # Responsibility
//! - Keep one single-stage notes board per owner under `notes:<owner>`.
//! - Validate note input before it reaches the board store.
//!
//! # Invariants
//! - A wall is created lazily on the first note; listing a missing wall
//!   yields an empty list.
//! - Archiving only recolors a note; it never leaves the wall.

use crate::engine::hook::NoHook;
use crate::model::board::{BoardError, IgnoreReason, Item, ItemId, MoveOutcome, StageId};
use crate::model::payload::StickyNote;
use crate::model::template::{BoardTemplate, NOTES_STAGE_ID};
use crate::repo::board_repo::BoardRepository;
use crate::service::board_service::{BoardService, BoardServiceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTES_KEY_PREFIX: &str = "notes:";

/// Service error for notes-wall use-cases.
#[derive(Debug)]
pub enum NotesServiceError {
    /// Owner id is blank after trim.
    InvalidOwner,
    /// Named note field is blank.
    InvalidNote(&'static str),
    /// Target note does not exist on the owner's wall.
    NoteNotFound(ItemId),
    /// Board service failure.
    Board(BoardServiceError),
}

impl Display for NotesServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidOwner => write!(f, "note owner must not be blank"),
            Self::InvalidNote(field) => write!(f, "note {field} must not be blank"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Board(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotesServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardServiceError> for NotesServiceError {
    fn from(value: BoardServiceError) -> Self {
        match value {
            BoardServiceError::Board(BoardError::ItemNotFound(id)) => Self::NoteNotFound(id),
            other => Self::Board(other),
        }
    }
}

/// Notes-wall facade over a board repository.
pub struct NotesService<R: BoardRepository> {
    boards: BoardService<R, StickyNote>,
}

impl<R: BoardRepository> NotesService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            boards: BoardService::new(repo),
        }
    }

    /// Adds a note at the end of the owner's wall.
    ///
    /// `color` falls back to the default yellow when `None` or blank.
    pub fn create_note(
        &self,
        owner: &str,
        title: &str,
        content: &str,
        color: Option<&str>,
    ) -> Result<Item<StickyNote>, NotesServiceError> {
        let key = wall_key(owner)?;
        let title = required_field(title, "title")?;
        let content = required_field(content, "content")?;

        let mut note = StickyNote::new(title, content);
        if let Some(color) = color.map(str::trim).filter(|color| !color.is_empty()) {
            note.color = color.to_string();
        }

        self.boards.open_or_create(&key, BoardTemplate::NotesWall)?;
        let id = self
            .boards
            .create_item(&key, &notes_stage(), note.clone())?;
        Ok(Item::with_id(id, note))
    }

    pub fn delete_note(&self, owner: &str, id: ItemId) -> Result<(), NotesServiceError> {
        let key = self.existing_wall(owner, id)?;
        self.boards.delete_item(&key, id)?;
        Ok(())
    }

    pub fn archive_note(&self, owner: &str, id: ItemId) -> Result<(), NotesServiceError> {
        let key = self.existing_wall(owner, id)?;
        self.boards.update_item(&key, id, StickyNote::archive)?;
        Ok(())
    }

    pub fn change_color(
        &self,
        owner: &str,
        id: ItemId,
        color: &str,
    ) -> Result<(), NotesServiceError> {
        let color = required_field(color, "color")?.to_string();
        let key = self.existing_wall(owner, id)?;
        self.boards
            .update_item(&key, id, move |note| note.color = color)?;
        Ok(())
    }

    /// Notes in wall order.
    pub fn list_notes(&self, owner: &str) -> Result<Vec<Item<StickyNote>>, NotesServiceError> {
        let key = wall_key(owner)?;
        if !self.boards.exists(&key)? {
            return Ok(Vec::new());
        }
        let board = self.boards.load(&key)?;
        Ok(board
            .stage(&notes_stage())
            .map(|stage| stage.items().to_vec())
            .unwrap_or_default())
    }

    /// Moves one note within the wall; `to = None` is a cancelled drag.
    pub fn reorder_notes(
        &self,
        owner: &str,
        from: usize,
        to: Option<usize>,
    ) -> Result<MoveOutcome, NotesServiceError> {
        let key = wall_key(owner)?;
        let Some(to) = to else {
            return Ok(MoveOutcome::Ignored(IgnoreReason::Cancelled));
        };
        if !self.boards.exists(&key)? {
            return Ok(MoveOutcome::Ignored(IgnoreReason::StageNotFound));
        }
        let stage = notes_stage();
        Ok(self
            .boards
            .move_item(&key, &stage, from, &stage, to, &NoHook)?)
    }

    fn existing_wall(&self, owner: &str, id: ItemId) -> Result<String, NotesServiceError> {
        let key = wall_key(owner)?;
        if !self.boards.exists(&key)? {
            return Err(NotesServiceError::NoteNotFound(id));
        }
        Ok(key)
    }
}

fn wall_key(owner: &str) -> Result<String, NotesServiceError> {
    let owner = owner.trim();
    if owner.is_empty() {
        return Err(NotesServiceError::InvalidOwner);
    }
    Ok(format!("{NOTES_KEY_PREFIX}{owner}"))
}

fn required_field<'a>(value: &'a str, field: &'static str) -> Result<&'a str, NotesServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NotesServiceError::InvalidNote(field));
    }
    Ok(trimmed)
}

fn notes_stage() -> StageId {
    StageId::new(NOTES_STAGE_ID)
}

#[cfg(test)]
mod tests {
    use super::{required_field, wall_key, NotesServiceError};

    #[test]
    fn wall_key_is_scoped_by_trimmed_owner() {
        assert_eq!(wall_key(" user-1 ").unwrap(), "notes:user-1");
        assert!(matches!(wall_key("  "), Err(NotesServiceError::InvalidOwner)));
    }

    #[test]
    fn blank_fields_name_the_field() {
        assert!(matches!(
            required_field(" \t", "content"),
            Err(NotesServiceError::InvalidNote("content"))
        ));
    }
}
