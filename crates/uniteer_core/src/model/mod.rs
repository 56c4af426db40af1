//! Board domain model shared by the funnel, project and notes views.
//!
//! # Responsibility
//! - Define the ordered Board / Stage / Item collection and its invariants.
//! - Define the concrete card payloads rendered by product boards.
//!
//! # Invariants
//! - `stage_order` is always a permutation of the stage key set.
//! - Every item belongs to exactly one stage; item ids are board-unique.
//! - Stage ids are fixed at creation; titles may change independently.

pub mod board;
pub mod payload;
pub mod template;
