//! Card payloads for the product boards.
//!
//! # Responsibility
//! - Define deal, project task and sticky-note records carried by items.
//! - Provide form-input helpers matching the board dialogs.
//!
//! # Invariants
//! - Payloads never carry their own board position; ordering lives in the
//!   board.
//! - `ProjectTask::status` mirrors its stage only through `StatusStamp`.

use crate::engine::hook::MoveHook;
use crate::model::board::{Item, StageId};
use serde::{Deserialize, Serialize};

/// Image used when a deal is created without one.
pub const DEFAULT_DEAL_IMAGE: &str = "/placeholder.svg?height=100&width=200";
/// Color of a freshly created sticky note.
pub const DEFAULT_NOTE_COLOR: &str = "bg-yellow-300";
/// Color marking an archived sticky note.
pub const ARCHIVED_NOTE_COLOR: &str = "bg-gray-300";

/// Likelihood that a deal closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probability {
    Low,
    #[default]
    Medium,
    High,
}

/// Person attached to a deal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Sales-funnel card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub company: String,
    /// Expected deal value in the organization currency.
    pub value: f64,
    pub probability: Probability,
    pub image: Option<String>,
    pub description: String,
    pub contacts: Vec<Contact>,
    pub assigned_team: Vec<String>,
}

impl Deal {
    /// Creates a deal with form defaults: zero value, medium probability and
    /// the placeholder image.
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            value: 0.0,
            probability: Probability::Medium,
            image: Some(DEFAULT_DEAL_IMAGE.to_string()),
            description: String::new(),
            contacts: Vec::new(),
            assigned_team: Vec::new(),
        }
    }

    /// Parses the free-text value field; unparsable input counts as zero.
    pub fn parse_value(input: &str) -> f64 {
        input
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .unwrap_or(0.0)
    }

    /// Splits the comma-separated team field, dropping blank names.
    pub fn parse_team(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Project-board task lifecycle, mirrored from the default stage ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Maps a stage id to a status; custom stages have none.
    pub fn from_stage_id(stage_id: &StageId) -> Option<Self> {
        match stage_id.as_str() {
            "todo" => Some(Self::Todo),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Project-board card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectTask {
    pub title: String,
    pub description: String,
    pub assignee: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    pub due_date: Option<String>,
    pub report: Option<String>,
    pub attachments: Vec<String>,
}

impl ProjectTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Personal sticky note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickyNote {
    pub title: String,
    pub content: String,
    /// Tailwind background class used by the notes wall.
    pub color: String,
}

impl StickyNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            color: DEFAULT_NOTE_COLOR.to_string(),
        }
    }

    /// Archiving only recolors the note; it stays on the wall.
    pub fn archive(&mut self) {
        self.color = ARCHIVED_NOTE_COLOR.to_string();
    }

    pub fn is_archived(&self) -> bool {
        self.color == ARCHIVED_NOTE_COLOR
    }
}

/// Move hook stamping `ProjectTask::status` from the destination stage.
///
/// Destinations without a matching status keep the previous value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusStamp;

impl MoveHook<ProjectTask> for StatusStamp {
    fn on_moved(&self, item: &mut Item<ProjectTask>, destination: &StageId) {
        if let Some(status) = TaskStatus::from_stage_id(destination) {
            item.payload.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Deal, StatusStamp, StickyNote, TaskStatus};
    use crate::engine::hook::MoveHook;
    use crate::model::board::{Item, StageId};
    use crate::model::payload::ProjectTask;

    #[test]
    fn parse_value_falls_back_to_zero() {
        assert_eq!(Deal::parse_value(" 1500.5 "), 1500.5);
        assert_eq!(Deal::parse_value("lots"), 0.0);
        assert_eq!(Deal::parse_value("NaN"), 0.0);
    }

    #[test]
    fn parse_team_trims_and_drops_blanks() {
        assert_eq!(
            Deal::parse_team("Alice, Bob ,, "),
            vec!["Alice".to_string(), "Bob".to_string()]
        );
    }

    #[test]
    fn task_status_serializes_as_stage_id() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(TaskStatus::InProgress.as_str(), "in-progress");
    }

    #[test]
    fn status_stamp_ignores_custom_stage() {
        let mut item = Item::new(ProjectTask::new("Ship"));
        StatusStamp.on_moved(&mut item, &StageId::new("done"));
        assert_eq!(item.payload.status, TaskStatus::Done);

        StatusStamp.on_moved(&mut item, &StageId::new("blocked"));
        assert_eq!(item.payload.status, TaskStatus::Done);
    }

    #[test]
    fn archive_recolors_note() {
        let mut note = StickyNote::new("Call", "Call the bank");
        assert!(!note.is_archived());
        note.archive();
        assert!(note.is_archived());
    }
}
