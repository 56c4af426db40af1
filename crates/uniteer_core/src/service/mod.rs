//! Use-case services over board repositories.
//!
//! # Responsibility
//! - Orchestrate load/apply/save cycles for stored boards.
//! - Keep UI-facing callers away from repository details.

pub mod board_service;
pub mod notes_service;
