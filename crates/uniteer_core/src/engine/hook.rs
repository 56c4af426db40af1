//! Post-move hooks for cross-stage moves.

use crate::model::board::{Item, StageId};

/// Policy applied to an item that is moving to another stage.
///
/// Called once per cross-stage move, after removal from the source and
/// before insertion into `destination`. Never called for in-stage reorders.
/// `Board::create_item_with` also calls it once for a new item, with the
/// stage it is created in.
pub trait MoveHook<P> {
    fn on_moved(&self, item: &mut Item<P>, destination: &StageId);
}

/// Hook that leaves moved items untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl<P> MoveHook<P> for NoHook {
    fn on_moved(&self, _item: &mut Item<P>, _destination: &StageId) {}
}

/// Adapter turning a closure into a `MoveHook`.
pub struct FnHook<F>(pub F);

impl<P, F> MoveHook<P> for FnHook<F>
where
    F: Fn(&mut Item<P>, &StageId),
{
    fn on_moved(&self, item: &mut Item<P>, destination: &StageId) {
        (self.0)(item, destination)
    }
}
