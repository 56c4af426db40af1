//! Drag-result events and their application to a board.
//!
//! # Responsibility
//! - Define the toolkit-neutral drag record UI shims produce.
//! - Dispatch stage drags to stage reorders and item drags to item moves.
//!
//! # Invariants
//! - The dragged id must match the element at the source slot; otherwise
//!   the event is treated as stale and ignored.
//! - Only metadata (kind, indices, reason) is logged, never payloads.

use crate::engine::hook::MoveHook;
use crate::model::board::{Board, IgnoreReason, MoveOutcome, StageId};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Drop zone name used for board-level (stage) drags.
pub const BOARD_DROP_ZONE: &str = "board";

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    /// A whole stage column.
    Stage,
    /// One card.
    Item,
}

impl DragKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Item => "item",
        }
    }
}

/// One slot in a drop zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropLocation {
    /// Stage id for item drags; `BOARD_DROP_ZONE` for stage drags.
    pub container: StageId,
    /// Position in the container before the move.
    pub index: usize,
}

impl DropLocation {
    pub fn new(container: impl Into<String>, index: usize) -> Self {
        Self {
            container: StageId::new(container),
            index,
        }
    }
}

/// Result of one finished drag gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragResult {
    /// Stage id or item id (UUID text) of the dragged element.
    pub draggable_id: String,
    pub kind: DragKind,
    pub source: DropLocation,
    /// `None` when the gesture was dropped outside any drop zone.
    pub destination: Option<DropLocation>,
}

impl DragResult {
    /// Stage column drag inside the board-level drop zone.
    pub fn stage(stage_id: &StageId, from: usize, to: Option<usize>) -> Self {
        Self {
            draggable_id: stage_id.as_str().to_string(),
            kind: DragKind::Stage,
            source: DropLocation::new(BOARD_DROP_ZONE, from),
            destination: to.map(|index| DropLocation::new(BOARD_DROP_ZONE, index)),
        }
    }

    /// Card drag between (or within) stages.
    pub fn item(item_id: Uuid, source: DropLocation, destination: Option<DropLocation>) -> Self {
        Self {
            draggable_id: item_id.to_string(),
            kind: DragKind::Item,
            source,
            destination,
        }
    }
}

/// Applies one drag result to `board` in place.
///
/// Returns `MoveOutcome::Ignored` and leaves the board untouched when the
/// drag was cancelled, dropped on its own slot, or refers to a board state
/// that no longer exists.
pub fn apply_drag<P, H>(board: &mut Board<P>, drag: &DragResult, hook: &H) -> MoveOutcome
where
    H: MoveHook<P> + ?Sized,
{
    let outcome = resolve_drag(board, drag, hook);
    let destination_index = drag
        .destination
        .as_ref()
        .map_or_else(|| "none".to_string(), |dest| dest.index.to_string());

    match outcome {
        MoveOutcome::Applied => debug!(
            "event=drag_apply module=engine status=ok kind={} source_index={} destination_index={}",
            drag.kind.as_str(),
            drag.source.index,
            destination_index
        ),
        MoveOutcome::Ignored(reason @ (IgnoreReason::Cancelled | IgnoreReason::NoChange)) => {
            debug!(
                "event=drag_apply module=engine status=ignored kind={} reason={}",
                drag.kind.as_str(),
                reason.as_str()
            )
        }
        MoveOutcome::Ignored(reason) => warn!(
            "event=drag_apply module=engine status=ignored kind={} reason={} source_index={} destination_index={}",
            drag.kind.as_str(),
            reason.as_str(),
            drag.source.index,
            destination_index
        ),
    }
    outcome
}

/// By-value form of `apply_drag` for callers holding boards immutably.
pub fn reduce<P, H>(mut board: Board<P>, drag: &DragResult, hook: &H) -> Board<P>
where
    H: MoveHook<P> + ?Sized,
{
    apply_drag(&mut board, drag, hook);
    board
}

fn resolve_drag<P, H>(board: &mut Board<P>, drag: &DragResult, hook: &H) -> MoveOutcome
where
    H: MoveHook<P> + ?Sized,
{
    let Some(destination) = drag.destination.as_ref() else {
        return MoveOutcome::Ignored(IgnoreReason::Cancelled);
    };
    if destination == &drag.source {
        return MoveOutcome::Ignored(IgnoreReason::NoChange);
    }

    match drag.kind {
        DragKind::Stage => {
            let Some(stage_id) = board.stage_order().get(drag.source.index) else {
                return MoveOutcome::Ignored(IgnoreReason::IndexOutOfRange);
            };
            if stage_id.as_str() != drag.draggable_id {
                return MoveOutcome::Ignored(IgnoreReason::StaleEvent);
            }
            board.reorder_stages(drag.source.index, destination.index)
        }
        DragKind::Item => {
            let Some(stage) = board.stage(&drag.source.container) else {
                return MoveOutcome::Ignored(IgnoreReason::StageNotFound);
            };
            let Some(item) = stage.items().get(drag.source.index) else {
                return MoveOutcome::Ignored(IgnoreReason::IndexOutOfRange);
            };
            let same_item = Uuid::parse_str(&drag.draggable_id).is_ok_and(|id| id == item.id);
            if !same_item {
                return MoveOutcome::Ignored(IgnoreReason::StaleEvent);
            }
            board.move_item(
                &drag.source.container,
                drag.source.index,
                &destination.container,
                destination.index,
                hook,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_drag, DragResult, DropLocation};
    use crate::engine::hook::{FnHook, NoHook};
    use crate::model::board::{Board, IgnoreReason, MoveOutcome, StageId};

    fn two_stage_board() -> (Board<String>, StageId, StageId) {
        let mut board = Board::new();
        let a = board.create_stage("A").unwrap();
        let b = board.create_stage("B").unwrap();
        board.create_item(&a, "a1".to_string()).unwrap();
        board.create_item(&a, "a2".to_string()).unwrap();
        (board, a, b)
    }

    #[test]
    fn stale_item_id_is_ignored() {
        let (mut board, a, b) = two_stage_board();
        let second = board.stage(&a).unwrap().items()[1].id;
        let before = board.clone();

        let drag = DragResult::item(
            second,
            DropLocation::new("a", 0),
            Some(DropLocation::new("b", 0)),
        );
        assert_eq!(
            apply_drag(&mut board, &drag, &NoHook),
            MoveOutcome::Ignored(IgnoreReason::StaleEvent)
        );
        assert_eq!(board, before);
        assert!(board.stage(&b).unwrap().is_empty());
    }

    #[test]
    fn stage_drag_requires_matching_stage_id() {
        let (mut board, _a, b) = two_stage_board();
        let drag = DragResult::stage(&b, 0, Some(1));
        assert_eq!(
            apply_drag(&mut board, &drag, &NoHook),
            MoveOutcome::Ignored(IgnoreReason::StaleEvent)
        );
    }

    #[test]
    fn hook_runs_only_for_cross_stage_moves() {
        let (mut board, a, _b) = two_stage_board();
        let first = board.stage(&a).unwrap().items()[0].id;
        let stamp = FnHook(|item: &mut crate::model::board::Item<String>, dest: &StageId| {
            item.payload = format!("{}@{dest}", item.payload);
        });

        let reorder = DragResult::item(
            first,
            DropLocation::new("a", 0),
            Some(DropLocation::new("a", 1)),
        );
        assert!(apply_drag(&mut board, &reorder, &stamp).is_applied());
        assert_eq!(board.stage(&a).unwrap().items()[1].payload, "a1");

        let cross = DragResult::item(
            first,
            DropLocation::new("a", 1),
            Some(DropLocation::new("b", 0)),
        );
        assert!(apply_drag(&mut board, &cross, &stamp).is_applied());
        assert_eq!(board.find_item(first).unwrap().payload, "a1@b");
    }
}
