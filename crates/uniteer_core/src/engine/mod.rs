//! Reorder engine driven by drag-and-drop results.
//!
//! # Responsibility
//! - Translate UI drag results into board reorder/move operations.
//! - Keep domain policies (status stamping) pluggable through `MoveHook`.
//!
//! # Invariants
//! - A cancelled, stale or out-of-range drag never changes the board.
//! - Engine calls complete synchronously; there is no pending state.

pub mod drag;
pub mod hook;
