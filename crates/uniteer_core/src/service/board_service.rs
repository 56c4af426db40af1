//! Board use-case service.
//!
//! # Responsibility
//! - Load a board, apply one store or engine operation, persist the result.
//! - Map store and repository failures into one use-case error type.
//!
//! # Invariants
//! - A failed or ignored operation never writes to the repository.
//! - Every successful mutation is saved before the call returns.

use crate::engine::drag::{apply_drag, DragResult};
use crate::engine::hook::MoveHook;
use crate::model::board::{Board, BoardError, BoardResult, Item, ItemId, MoveOutcome, StageId};
use crate::model::template::BoardTemplate;
use crate::repo::board_repo::{BoardRepoError, BoardRepository};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::time::Instant;

/// Errors from board service operations.
#[derive(Debug)]
pub enum BoardServiceError {
    /// No board is stored under this key.
    BoardNotFound(String),
    /// A board already exists under this key.
    BoardAlreadyExists(String),
    /// Store-level rejection (blank title, duplicate stage, unknown id).
    Board(BoardError),
    /// Repository-level failure.
    Repo(BoardRepoError),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoardNotFound(key) => write!(f, "board not found: {key}"),
            Self::BoardAlreadyExists(key) => write!(f, "board already exists: {key}"),
            Self::Board(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Board(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for BoardServiceError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<BoardRepoError> for BoardServiceError {
    fn from(value: BoardRepoError) -> Self {
        match value {
            BoardRepoError::NotFound(key) => Self::BoardNotFound(key),
            other => Self::Repo(other),
        }
    }
}

/// Board service facade for one payload type.
pub struct BoardService<R: BoardRepository, P> {
    repo: R,
    _payload: PhantomData<fn() -> P>,
}

impl<R, P> BoardService<R, P>
where
    R: BoardRepository,
    P: Serialize + DeserializeOwned,
{
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _payload: PhantomData,
        }
    }

    pub fn exists(&self, key: &str) -> Result<bool, BoardServiceError> {
        self.repo.exists(key).map_err(Into::into)
    }

    /// Loads the board stored under `key`.
    pub fn load(&self, key: &str) -> Result<Board<P>, BoardServiceError> {
        self.repo.load(key).map_err(Into::into)
    }

    /// Creates and saves a new board from `template`.
    pub fn create_board(
        &self,
        key: &str,
        template: BoardTemplate,
    ) -> Result<Board<P>, BoardServiceError> {
        if self.repo.exists(key)? {
            return Err(BoardServiceError::BoardAlreadyExists(key.trim().to_string()));
        }
        let board = template.build()?;
        self.repo.save(key, &board)?;
        info!(
            "event=board_create module=service status=ok board_key={} stages={}",
            key.trim(),
            board.stage_count()
        );
        Ok(board)
    }

    /// Loads the board under `key`, creating it from `template` when absent.
    pub fn open_or_create(
        &self,
        key: &str,
        template: BoardTemplate,
    ) -> Result<Board<P>, BoardServiceError> {
        if self.repo.exists(key)? {
            return self.load(key);
        }
        self.create_board(key, template)
    }

    /// Deletes a stored board with all its stages and items.
    pub fn delete_board(&self, key: &str) -> Result<(), BoardServiceError> {
        self.repo.delete(key).map_err(Into::into)
    }

    pub fn create_stage(&self, key: &str, title: &str) -> Result<StageId, BoardServiceError> {
        self.mutate(key, "create_stage", |board| board.create_stage(title))
    }

    pub fn rename_stage(
        &self,
        key: &str,
        stage_id: &StageId,
        title: &str,
    ) -> Result<(), BoardServiceError> {
        self.mutate(key, "rename_stage", |board| {
            board.rename_stage(stage_id, title)
        })
    }

    /// Deletes a stage; returns how many items were discarded with it.
    pub fn delete_stage(&self, key: &str, stage_id: &StageId) -> Result<usize, BoardServiceError> {
        self.mutate(key, "delete_stage", |board| {
            board.delete_stage(stage_id).map(|stage| stage.len())
        })
    }

    pub fn create_item(
        &self,
        key: &str,
        stage_id: &StageId,
        payload: P,
    ) -> Result<ItemId, BoardServiceError> {
        self.mutate(key, "create_item", |board| {
            board.create_item(stage_id, payload)
        })
    }

    /// Creates an item and lets `hook` stamp it for its starting stage.
    pub fn create_item_with<H>(
        &self,
        key: &str,
        stage_id: &StageId,
        payload: P,
        hook: &H,
    ) -> Result<ItemId, BoardServiceError>
    where
        H: MoveHook<P> + ?Sized,
    {
        self.mutate(key, "create_item", |board| {
            board.create_item_with(stage_id, payload, hook)
        })
    }

    /// Edits one payload in place.
    pub fn update_item<F>(&self, key: &str, item_id: ItemId, edit: F) -> Result<(), BoardServiceError>
    where
        F: FnOnce(&mut P),
    {
        self.mutate(key, "update_item", |board| board.update_item(item_id, edit))
    }

    pub fn delete_item(&self, key: &str, item_id: ItemId) -> Result<Item<P>, BoardServiceError> {
        self.mutate(key, "delete_item", |board| board.delete_item(item_id))
    }

    pub fn reorder_stages(
        &self,
        key: &str,
        from: usize,
        to: usize,
    ) -> Result<MoveOutcome, BoardServiceError> {
        self.apply_move(key, "reorder_stages", |board| board.reorder_stages(from, to))
    }

    pub fn move_item<H>(
        &self,
        key: &str,
        from_stage: &StageId,
        from_index: usize,
        to_stage: &StageId,
        to_index: usize,
        hook: &H,
    ) -> Result<MoveOutcome, BoardServiceError>
    where
        H: MoveHook<P> + ?Sized,
    {
        self.apply_move(key, "move_item", |board| {
            board.move_item(from_stage, from_index, to_stage, to_index, hook)
        })
    }

    /// Applies one drag result; ignored drags are not persisted.
    pub fn apply_drag<H>(
        &self,
        key: &str,
        drag: &DragResult,
        hook: &H,
    ) -> Result<MoveOutcome, BoardServiceError>
    where
        H: MoveHook<P> + ?Sized,
    {
        self.apply_move(key, "apply_drag", |board| apply_drag(board, drag, hook))
    }

    fn mutate<T, F>(&self, key: &str, op: &'static str, apply: F) -> Result<T, BoardServiceError>
    where
        F: FnOnce(&mut Board<P>) -> BoardResult<T>,
    {
        let started_at = Instant::now();
        let mut board = self.load(key)?;
        let value = match apply(&mut board) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    "event=board_mutate module=service op={op} status=rejected board_key={} error={}",
                    key.trim(),
                    err
                );
                return Err(err.into());
            }
        };
        self.repo.save(key, &board)?;
        info!(
            "event=board_mutate module=service op={op} status=ok board_key={} duration_ms={}",
            key.trim(),
            started_at.elapsed().as_millis()
        );
        Ok(value)
    }

    fn apply_move<F>(
        &self,
        key: &str,
        op: &'static str,
        apply: F,
    ) -> Result<MoveOutcome, BoardServiceError>
    where
        F: FnOnce(&mut Board<P>) -> MoveOutcome,
    {
        let mut board = self.load(key)?;
        let outcome = apply(&mut board);
        if outcome.is_applied() {
            self.repo.save(key, &board)?;
            info!(
                "event=board_mutate module=service op={op} status=ok board_key={}",
                key.trim()
            );
        }
        Ok(outcome)
    }
}
