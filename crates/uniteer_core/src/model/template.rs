//! Default stage layouts for new boards.

use crate::model::board::{Board, BoardResult, StageId};

/// Stage layout a new board starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardTemplate {
    /// No stages.
    Empty,
    /// Sales funnel: lead, qualified, proposal, closed.
    SalesFunnel,
    /// Project tracker: todo, in-progress, done.
    ProjectTracker,
    /// Single-stage wall used for personal sticky notes.
    NotesWall,
}

/// Stage id of the single notes-wall stage.
pub const NOTES_STAGE_ID: &str = "notes";

impl BoardTemplate {
    /// `(stage id, title)` pairs in display order.
    pub fn stages(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Empty => &[],
            Self::SalesFunnel => &[
                ("lead", "Lead"),
                ("qualified", "Qualified"),
                ("proposal", "Proposal"),
                ("closed", "Closed"),
            ],
            Self::ProjectTracker => &[
                ("todo", "To Do"),
                ("in-progress", "In Progress"),
                ("done", "Done"),
            ],
            Self::NotesWall => &[(NOTES_STAGE_ID, "Notes")],
        }
    }

    /// Builds an empty board with this template's stages.
    pub fn build<P>(self) -> BoardResult<Board<P>> {
        let mut board = Board::new();
        for (id, title) in self.stages() {
            board.insert_stage(StageId::new(*id), title)?;
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::BoardTemplate;
    use crate::model::board::Board;
    use crate::model::payload::Deal;

    #[test]
    fn funnel_template_has_four_ordered_stages() {
        let board: Board<Deal> = BoardTemplate::SalesFunnel.build().unwrap();
        let order: Vec<&str> = board.stage_order().iter().map(|id| id.as_str()).collect();
        assert_eq!(order, vec!["lead", "qualified", "proposal", "closed"]);
        assert_eq!(board.item_count(), 0);
    }

    #[test]
    fn project_ids_match_title_derivation() {
        for (id, title) in BoardTemplate::ProjectTracker.stages() {
            if *id == "todo" {
                continue;
            }
            let derived = crate::model::board::StageId::from_title(title).unwrap();
            assert_eq!(derived.as_str(), *id);
        }
    }
}
