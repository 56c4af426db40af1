//! Ordered Board / Stage / Item collection.
//!
//! # Responsibility
//! - Hold one in-memory board snapshot and expose its mutation operations.
//! - Keep stage order and stage map consistent across every mutation.
//!
//! # Invariants
//! - Every id in `stage_order` is a key of `stages` and appears once.
//! - Every stage key equals the `id` of the stage stored under it.
//! - Item ids are unique across all stages of one board.
//! - Reorder and move calls validate before mutating; a rejected call leaves
//!   the board untouched and reports `MoveOutcome::Ignored`.

use crate::engine::hook::{MoveHook, NoHook};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Stable identifier of one card.
pub type ItemId = Uuid;

/// Result type used by board store operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Stage identifier, derived from the stage title at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    /// Wraps an existing identifier without normalization.
    ///
    /// Used for ids that already exist (storage, templates, drag events).
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derives a stage id from a user title.
    ///
    /// Trims, lowercases and collapses every whitespace run into `-`.
    /// Returns `None` when the title is blank.
    pub fn from_title(title: &str) -> Option<Self> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();
        Some(Self(WHITESPACE_RUN_RE.replace_all(&lowered, "-").into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StageId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from board store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// Stage title is blank after trim.
    InvalidTitle,
    /// Derived stage id already exists on this board.
    DuplicateStage(StageId),
    /// Target stage does not exist.
    StageNotFound(StageId),
    /// Target item does not exist.
    ItemNotFound(ItemId),
    /// Item id already exists on this board.
    DuplicateItem(ItemId),
    /// Board structure violates an invariant.
    Corrupted(String),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "stage title must not be blank"),
            Self::DuplicateStage(id) => write!(f, "stage already exists: {id}"),
            Self::StageNotFound(id) => write!(f, "stage not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::DuplicateItem(id) => write!(f, "item already exists: {id}"),
            Self::Corrupted(details) => write!(f, "corrupted board: {details}"),
        }
    }
}

impl Error for BoardError {}

/// Why a reorder or move request left the board unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Drag ended without a drop target.
    Cancelled,
    /// Source and destination are the same slot.
    NoChange,
    /// Source or destination stage is unknown.
    StageNotFound,
    /// Source or destination index is outside the list.
    IndexOutOfRange,
    /// Dragged element does not match the element at the source slot.
    StaleEvent,
}

impl IgnoreReason {
    /// Stable snake_case tag for log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::NoChange => "no_change",
            Self::StageNotFound => "stage_not_found",
            Self::IndexOutOfRange => "index_out_of_range",
            Self::StaleEvent => "stale_event",
        }
    }
}

/// Result of one reorder/move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The board changed.
    Applied,
    /// The board is unchanged.
    Ignored(IgnoreReason),
}

impl MoveOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// One card held by a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<P> {
    /// Stable id, kept across moves and payload edits.
    pub id: ItemId,
    /// Card data; not interpreted by the board.
    pub payload: P,
}

impl<P> Item<P> {
    /// Creates an item with a fresh random id.
    pub fn new(payload: P) -> Self {
        Self::with_id(Uuid::new_v4(), payload)
    }

    /// Creates an item with a caller-provided id (imports, storage).
    pub fn with_id(id: ItemId, payload: P) -> Self {
        Self { id, payload }
    }
}

/// Ordered container of items (one Kanban column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage<P> {
    id: StageId,
    title: String,
    items: Vec<Item<P>>,
}

impl<P> Stage<P> {
    /// Builds a stage from stored parts. Item uniqueness is checked by the
    /// owning board.
    pub fn from_parts(id: StageId, title: impl Into<String>, items: Vec<Item<P>>) -> Self {
        Self {
            id,
            title: title.into(),
            items,
        }
    }

    pub fn id(&self) -> &StageId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Items in display order.
    pub fn items(&self) -> &[Item<P>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Ordered sequence of stages plus the stage lookup map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawBoard<P>",
    bound(deserialize = "P: Deserialize<'de>")
)]
pub struct Board<P> {
    stage_order: Vec<StageId>,
    stages: BTreeMap<StageId, Stage<P>>,
}

#[derive(Deserialize)]
struct RawBoard<P> {
    stage_order: Vec<StageId>,
    stages: BTreeMap<StageId, Stage<P>>,
}

impl<P> TryFrom<RawBoard<P>> for Board<P> {
    type Error = BoardError;

    fn try_from(raw: RawBoard<P>) -> Result<Self, Self::Error> {
        let board = Self {
            stage_order: raw.stage_order,
            stages: raw.stages,
        };
        board.validate()?;
        Ok(board)
    }
}

impl<P> Default for Board<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Board<P> {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            stage_order: Vec::new(),
            stages: BTreeMap::new(),
        }
    }

    /// Rebuilds a board from stages listed in display order.
    ///
    /// # Errors
    /// - `Corrupted` when stage ids repeat or item ids collide.
    pub fn from_stages(stages: Vec<Stage<P>>) -> BoardResult<Self> {
        let mut board = Self::new();
        for stage in stages {
            if board.stages.contains_key(&stage.id) {
                return Err(BoardError::Corrupted(format!(
                    "stage `{}` listed twice",
                    stage.id
                )));
            }
            board.stage_order.push(stage.id.clone());
            board.stages.insert(stage.id.clone(), stage);
        }
        board.validate()?;
        Ok(board)
    }

    /// Stage ids in display order.
    pub fn stage_order(&self) -> &[StageId] {
        &self.stage_order
    }

    /// Stages in display order.
    pub fn stages(&self) -> impl Iterator<Item = &Stage<P>> + '_ {
        self.stage_order
            .iter()
            .filter_map(move |id| self.stages.get(id))
    }

    pub fn stage(&self, id: &StageId) -> Option<&Stage<P>> {
        self.stages.get(id)
    }

    pub fn contains_stage(&self, id: &StageId) -> bool {
        self.stages.contains_key(id)
    }

    pub fn stage_count(&self) -> usize {
        self.stage_order.len()
    }

    /// Total number of items across all stages.
    pub fn item_count(&self) -> usize {
        self.stages.values().map(Stage::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.stage_order.is_empty()
    }

    /// Appends a new empty stage derived from `title`.
    ///
    /// # Errors
    /// - `InvalidTitle` when `title` is blank.
    /// - `DuplicateStage` when the derived id is already used.
    pub fn create_stage(&mut self, title: &str) -> BoardResult<StageId> {
        let id = StageId::from_title(title).ok_or(BoardError::InvalidTitle)?;
        self.insert_stage(id.clone(), title.trim())?;
        Ok(id)
    }

    /// Appends a new empty stage with an explicit id.
    pub fn insert_stage(&mut self, id: StageId, title: &str) -> BoardResult<()> {
        if title.trim().is_empty() {
            return Err(BoardError::InvalidTitle);
        }
        if self.stages.contains_key(&id) {
            return Err(BoardError::DuplicateStage(id));
        }
        self.stage_order.push(id.clone());
        self.stages
            .insert(id.clone(), Stage::from_parts(id, title.trim(), Vec::new()));
        Ok(())
    }

    /// Changes the display title; the stage id is unchanged.
    pub fn rename_stage(&mut self, id: &StageId, title: &str) -> BoardResult<()> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(BoardError::InvalidTitle);
        }
        let stage = self
            .stages
            .get_mut(id)
            .ok_or_else(|| BoardError::StageNotFound(id.clone()))?;
        stage.title = trimmed.to_string();
        Ok(())
    }

    /// Removes a stage and every item it holds.
    ///
    /// Returns the removed stage so callers can report what was discarded.
    pub fn delete_stage(&mut self, id: &StageId) -> BoardResult<Stage<P>> {
        let stage = self
            .stages
            .remove(id)
            .ok_or_else(|| BoardError::StageNotFound(id.clone()))?;
        self.stage_order.retain(|current| current != id);
        Ok(stage)
    }

    /// Appends a new item with a fresh id to the end of one stage.
    pub fn create_item(&mut self, stage_id: &StageId, payload: P) -> BoardResult<ItemId> {
        self.create_item_with(stage_id, payload, &NoHook)
    }

    /// Like `create_item`, but `hook` sees the new item as entering
    /// `stage_id` before it is appended.
    pub fn create_item_with<H>(
        &mut self,
        stage_id: &StageId,
        payload: P,
        hook: &H,
    ) -> BoardResult<ItemId>
    where
        H: MoveHook<P> + ?Sized,
    {
        if !self.stages.contains_key(stage_id) {
            return Err(BoardError::StageNotFound(stage_id.clone()));
        }
        let mut item = Item::new(payload);
        let id = item.id;
        hook.on_moved(&mut item, stage_id);
        self.insert_item(stage_id, item)?;
        Ok(id)
    }

    /// Appends an existing item to the end of one stage.
    pub fn insert_item(&mut self, stage_id: &StageId, item: Item<P>) -> BoardResult<()> {
        if self.locate_item(item.id).is_some() {
            return Err(BoardError::DuplicateItem(item.id));
        }
        let stage = self
            .stages
            .get_mut(stage_id)
            .ok_or_else(|| BoardError::StageNotFound(stage_id.clone()))?;
        stage.items.push(item);
        Ok(())
    }

    /// Finds the stage id and index holding `item_id`.
    pub fn locate_item(&self, item_id: ItemId) -> Option<(&StageId, usize)> {
        self.stages.values().find_map(|stage| {
            stage
                .items
                .iter()
                .position(|item| item.id == item_id)
                .map(|index| (&stage.id, index))
        })
    }

    pub fn find_item(&self, item_id: ItemId) -> Option<&Item<P>> {
        self.stages
            .values()
            .flat_map(|stage| stage.items.iter())
            .find(|item| item.id == item_id)
    }

    /// Edits one payload in place, keeping id and position.
    pub fn update_item<F>(&mut self, item_id: ItemId, edit: F) -> BoardResult<()>
    where
        F: FnOnce(&mut P),
    {
        let item = self
            .find_item_mut(item_id)
            .ok_or(BoardError::ItemNotFound(item_id))?;
        edit(&mut item.payload);
        Ok(())
    }

    /// Replaces one payload and returns the previous value.
    pub fn replace_payload(&mut self, item_id: ItemId, payload: P) -> BoardResult<P> {
        let item = self
            .find_item_mut(item_id)
            .ok_or(BoardError::ItemNotFound(item_id))?;
        Ok(std::mem::replace(&mut item.payload, payload))
    }

    /// Removes one item from whichever stage holds it.
    pub fn delete_item(&mut self, item_id: ItemId) -> BoardResult<Item<P>> {
        for stage in self.stages.values_mut() {
            if let Some(index) = stage.items.iter().position(|item| item.id == item_id) {
                return Ok(stage.items.remove(index));
            }
        }
        Err(BoardError::ItemNotFound(item_id))
    }

    /// Moves the stage at `from` to position `to` in the stage order.
    ///
    /// Both indices address the pre-move order and must be in `[0, len)`.
    pub fn reorder_stages(&mut self, from: usize, to: usize) -> MoveOutcome {
        splice_move(&mut self.stage_order, from, to)
    }

    /// Moves one item inside a single stage.
    pub fn reorder_items(&mut self, stage_id: &StageId, from: usize, to: usize) -> MoveOutcome {
        match self.stages.get_mut(stage_id) {
            Some(stage) => splice_move(&mut stage.items, from, to),
            None => MoveOutcome::Ignored(IgnoreReason::StageNotFound),
        }
    }

    /// Moves one item from a source slot to a destination slot.
    ///
    /// Within one stage this is exactly `reorder_items`. Across stages the
    /// destination index may equal the destination length (append), and
    /// `hook` sees the item before it is inserted.
    pub fn move_item<H>(
        &mut self,
        from_stage: &StageId,
        from_index: usize,
        to_stage: &StageId,
        to_index: usize,
        hook: &H,
    ) -> MoveOutcome
    where
        H: MoveHook<P> + ?Sized,
    {
        if from_stage == to_stage {
            return self.reorder_items(from_stage, from_index, to_index);
        }

        let Some(mut source) = self.stages.remove(from_stage) else {
            return MoveOutcome::Ignored(IgnoreReason::StageNotFound);
        };

        let outcome = match self.stages.get_mut(to_stage) {
            None => MoveOutcome::Ignored(IgnoreReason::StageNotFound),
            Some(destination)
                if from_index >= source.items.len() || to_index > destination.items.len() =>
            {
                MoveOutcome::Ignored(IgnoreReason::IndexOutOfRange)
            }
            Some(destination) => {
                let mut item = source.items.remove(from_index);
                hook.on_moved(&mut item, &destination.id);
                destination.items.insert(to_index, item);
                MoveOutcome::Applied
            }
        };

        self.stages.insert(source.id.clone(), source);
        outcome
    }

    /// Checks every structural invariant.
    pub fn validate(&self) -> BoardResult<()> {
        if self.stage_order.len() != self.stages.len() {
            return Err(BoardError::Corrupted(format!(
                "stage order has {} entries for {} stages",
                self.stage_order.len(),
                self.stages.len()
            )));
        }

        let mut seen_stages = HashSet::new();
        for id in &self.stage_order {
            if !seen_stages.insert(id) {
                return Err(BoardError::Corrupted(format!(
                    "stage `{id}` repeated in stage order"
                )));
            }
            if !self.stages.contains_key(id) {
                return Err(BoardError::Corrupted(format!(
                    "stage `{id}` missing from stage map"
                )));
            }
        }

        let mut seen_items = HashSet::new();
        for (key, stage) in &self.stages {
            if key != &stage.id {
                return Err(BoardError::Corrupted(format!(
                    "stage stored under `{key}` has id `{}`",
                    stage.id
                )));
            }
            for item in &stage.items {
                if !seen_items.insert(item.id) {
                    return Err(BoardError::Corrupted(format!(
                        "item `{}` held more than once",
                        item.id
                    )));
                }
            }
        }

        Ok(())
    }

    fn find_item_mut(&mut self, item_id: ItemId) -> Option<&mut Item<P>> {
        self.stages
            .values_mut()
            .flat_map(|stage| stage.items.iter_mut())
            .find(|item| item.id == item_id)
    }
}

fn splice_move<T>(list: &mut Vec<T>, from: usize, to: usize) -> MoveOutcome {
    if from >= list.len() || to >= list.len() {
        return MoveOutcome::Ignored(IgnoreReason::IndexOutOfRange);
    }
    if from == to {
        return MoveOutcome::Ignored(IgnoreReason::NoChange);
    }
    let value = list.remove(from);
    list.insert(to, value);
    MoveOutcome::Applied
}
