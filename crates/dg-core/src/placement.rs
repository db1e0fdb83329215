//! First-fit placement on the occupancy grid.
//!
//! Candidates are scanned row by row (`y` ascending), left to right within a
//! row. The first top-left corner whose rectangle is entirely free wins.
//! This is a reproducible first-fit, not an optimal packing: it can leave
//! fragmented gaps.

use crate::grid::GridModel;
use crate::model::{Cell, GridRect};

/// Find the first free top-left cell for a `width × height` rectangle.
///
/// Returns `None` when no position fits.
#[must_use]
pub fn find_free(grid: &GridModel, width: u16, height: u16) -> Option<Cell> {
    if width == 0 || height == 0 || width > grid.size() || height > grid.size() {
        return None;
    }
    let max_x = grid.size() - width;
    let max_y = grid.size() - height;
    let rect = GridRect::new(0, 0, width, height);
    (0..=max_y)
        .flat_map(|y| (0..=max_x).map(move |x| Cell::new(x, y)))
        .find(|&cell| grid.is_free(rect.at(cell)))
}

/// Like [`find_free`], but falls back to `(0, 0)` when nothing fits.
///
/// The fallback can overlap an existing record. Conflict resolution keeps
/// it for compatibility with stored layouts; new placements should use
/// `find_free` and report the failure instead.
#[must_use]
pub fn place_or_origin(grid: &GridModel, width: u16, height: u16) -> Cell {
    find_free(grid, width, height).unwrap_or_else(|| {
        log::warn!(
            "no free {width}×{height} slot on {size}×{size} grid, falling back to origin",
            size = grid.size()
        );
        Cell::ORIGIN
    })
}
