//! Occupancy view of a dashboard grid.
//!
//! A `GridModel` is never stored: it is rebuilt from the record list each
//! time a question is asked. At 4×4 that is sixteen booleans, so rebuilding
//! per hover event costs nothing.

use crate::id::WidgetId;
use crate::model::{Cell, GridRect, PlacementRecord};
use smallvec::{SmallVec, smallvec};

/// Which cells of an `N×N` grid are taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridModel {
    size: u16,
    occupied: SmallVec<[bool; 16]>,
}

impl GridModel {
    /// An `size × size` grid with nothing on it.
    pub fn empty(size: u16) -> Self {
        let cells = usize::from(size) * usize::from(size);
        Self {
            size,
            occupied: smallvec![false; cells],
        }
    }

    /// Mark every cell covered by a record whose id is not in `exclude`,
    /// plus the `reserved` rectangle if given.
    ///
    /// `reserved` is how a displaced record is kept from landing back
    /// under the item being dragged.
    pub fn build(
        records: &[PlacementRecord],
        size: u16,
        exclude: &[WidgetId],
        reserved: Option<GridRect>,
    ) -> Self {
        let mut grid = Self::empty(size);
        for record in records.iter().filter(|r| !exclude.contains(&r.id)) {
            grid.occupy(record.rect());
        }
        if let Some(rect) = reserved {
            grid.occupy(rect);
        }
        grid
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    /// Mark a rectangle as taken. Cells outside the grid are ignored.
    pub fn occupy(&mut self, rect: GridRect) {
        for cell in rect.cells() {
            if let Some(i) = self.index(cell) {
                self.occupied[i] = true;
            }
        }
    }

    /// Cells outside the grid count as occupied.
    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.index(cell).is_none_or(|i| self.occupied[i])
    }

    /// A rectangle is free iff it lies inside the grid and none of its
    /// cells are taken.
    pub fn is_free(&self, rect: GridRect) -> bool {
        rect.fits_within(self.size) && rect.cells().all(|c| !self.is_occupied(c))
    }

    pub fn free_cell_count(&self) -> usize {
        self.occupied.iter().filter(|taken| !**taken).count()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x >= self.size || cell.y >= self.size {
            return None;
        }
        let size = usize::from(self.size);
        Some(usize::from(cell.y) * size + usize::from(cell.x))
    }
}
