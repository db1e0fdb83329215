//! Conflict detection and displacement for a record being dragged.
//!
//! When the dragged record `A` hovers over a candidate rectangle, every other
//! record intersecting that rectangle is relocated with the first-fit solver.
//! Each relocation is computed independently against the same record state,
//! with `A`'s candidate rectangle reserved so nothing lands back under it.
//!
//! Resolution is one level deep: a displaced record's new position is not
//! re-checked against the other displaced records. Two records displaced in
//! the same step can therefore end up on the same free slot.

use crate::grid::GridModel;
use crate::id::WidgetId;
use crate::model::{Cell, GridRect, PlacementRecord, PositionUpdate};
use crate::placement::place_or_origin;
use smallvec::SmallVec;

/// Relocations produced by one conflict-resolution step.
pub type Displacements = SmallVec<[PositionUpdate; 4]>;

/// Where the dragged rectangle would land when `hovered` is under the
/// pointer and the record was grabbed `grab_offset` cells from its
/// top-left. Clamped so the rectangle stays inside the grid.
#[must_use]
pub fn candidate_rect(rect: GridRect, hovered: Cell, grab_offset: Cell, size: u16) -> GridRect {
    let max_x = size.saturating_sub(rect.width);
    let max_y = size.saturating_sub(rect.height);
    let x = hovered.x.saturating_sub(grab_offset.x).min(max_x);
    let y = hovered.y.saturating_sub(grab_offset.y).min(max_y);
    rect.at(Cell::new(x, y))
}

/// Every record other than `moving` whose rectangle intersects `candidate`,
/// in record order.
#[must_use]
pub fn find_conflicts(
    records: &[PlacementRecord],
    moving: WidgetId,
    candidate: GridRect,
) -> SmallVec<[WidgetId; 4]> {
    records
        .iter()
        .filter(|r| r.id != moving && r.rect().intersects(&candidate))
        .map(|r| r.id)
        .collect()
}

/// Compute new positions for every record that conflicts with `moving`
/// placed at `candidate`.
///
/// `records` is left untouched; the caller applies the returned updates.
/// Records the solver leaves where they already are produce no update.
#[must_use]
pub fn resolve_conflicts(
    records: &[PlacementRecord],
    moving: WidgetId,
    candidate: GridRect,
    size: u16,
) -> Displacements {
    let mut updates = Displacements::new();
    for record in records
        .iter()
        .filter(|r| r.id != moving && r.rect().intersects(&candidate))
    {
        let grid = GridModel::build(records, size, &[moving, record.id], Some(candidate));
        let target = place_or_origin(&grid, record.width, record.height);
        log::trace!(
            "{moving:?} at {candidate} displaces {:?} {} -> {target}",
            record.id,
            record.rect()
        );
        if target != record.origin() {
            updates.push(PositionUpdate::new(record.id, target));
        }
    }
    updates
}

/// Apply position updates to a record list in place. Unknown ids are skipped.
pub fn apply_updates(records: &mut [PlacementRecord], updates: &[PositionUpdate]) {
    for update in updates {
        if let Some(record) = records.iter_mut().find(|r| r.id == update.id) {
            record.move_to(update.cell());
        }
    }
}
