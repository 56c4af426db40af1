//! Repository layer for board persistence.
//!
//! # Responsibility
//! - Define the save/load contract the service layer persists through.
//! - Isolate SQLite query details from board use cases.
//!
//! # Invariants
//! - Repositories return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to transport errors.
//! - Boards leaving a repository always satisfy `Board::validate()`.

pub mod board_repo;
