//! Core domain logic for Uniteer boards.
//! This crate is the single source of truth for board invariants.

pub mod chat;
pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use chat::channel::{LocalChannelHub, MessageChannel, SubscriptionId, CHAT_CHANNEL};
pub use chat::conversation::ConversationBook;
pub use chat::message::{ChatError, ChatMessage};
pub use config::{default_log_level, ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use engine::drag::{apply_drag, reduce, DragKind, DragResult, DropLocation};
pub use engine::hook::{FnHook, MoveHook, NoHook};
pub use logging::{init_logging, init_logging_from_config, logging_status, LoggingError};
pub use model::board::{
    Board, BoardError, BoardResult, IgnoreReason, Item, ItemId, MoveOutcome, Stage, StageId,
};
pub use model::payload::{
    Contact, Deal, Probability, ProjectTask, StatusStamp, StickyNote, TaskPriority, TaskStatus,
};
pub use model::template::BoardTemplate;
pub use repo::board_repo::{
    BoardRepoError, BoardRepoResult, BoardRepository, SqliteBoardRepository,
};
pub use service::board_service::{BoardService, BoardServiceError};
pub use service::notes_service::{NotesService, NotesServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
