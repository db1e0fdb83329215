//! The in-memory working set for one dashboard.
//!
//! A `Board` is the only mutable layout state in the engine. Everything it
//! holds passed boundary validation, so the geometry code downstream can
//! assume well-formed spans.

use crate::grid::GridModel;
use crate::id::{DashboardId, WidgetId};
use crate::model::{Cell, GRID_SIZE, GridConfig, GridRect, PlacementRecord, PositionUpdate};
use crate::placement::find_free;
use crate::responsive::WidgetSize;
use crate::validate::{Severity, has_errors, validate_records};

/// Saved copy of a board's records, used to roll back a gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    records: Vec<PlacementRecord>,
}

impl BoardSnapshot {
    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }

    pub fn origin_of(&self, id: WidgetId) -> Option<Cell> {
        self.records.iter().find(|r| r.id == id).map(PlacementRecord::origin)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    dashboard: DashboardId,
    records: Vec<PlacementRecord>,
    config: GridConfig,
}

impl Board {
    /// Build a board from host records.
    ///
    /// # Errors
    /// Returns every error-severity finding, one per line, if the records
    /// are malformed (empty spans, out of bounds, duplicate ids, or records
    /// from another dashboard). Overlaps are only logged.
    pub fn new(
        dashboard: DashboardId,
        records: Vec<PlacementRecord>,
        config: GridConfig,
    ) -> Result<Self, String> {
        let diags = validate_records(&records, dashboard, GRID_SIZE);
        if has_errors(&diags) {
            let errors: Vec<String> = diags
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .map(|d| format!("{}: {}", d.rule, d.message))
                .collect();
            return Err(errors.join("\n"));
        }
        for d in &diags {
            log::warn!("dashboard `{dashboard}`: {}", d.message);
        }
        Ok(Self {
            dashboard,
            records,
            config,
        })
    }

    pub fn empty(dashboard: DashboardId, config: GridConfig) -> Self {
        Self {
            dashboard,
            records: Vec::new(),
            config,
        }
    }

    pub fn dashboard(&self) -> DashboardId {
        self.dashboard
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn size(&self) -> u16 {
        GRID_SIZE
    }

    pub fn records(&self) -> &[PlacementRecord] {
        &self.records
    }

    pub fn get(&self, id: WidgetId) -> Option<&PlacementRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Occupancy of the whole board.
    pub fn occupancy(&self) -> GridModel {
        GridModel::build(&self.records, GRID_SIZE, &[], None)
    }

    /// Move records to the given positions. Unknown ids are skipped.
    pub fn apply(&mut self, updates: &[PositionUpdate]) {
        crate::conflict::apply_updates(&mut self.records, updates);
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            records: self.records.clone(),
        }
    }

    /// Replace the records wholesale with a saved copy.
    pub fn restore(&mut self, snapshot: BoardSnapshot) {
        self.records = snapshot.records;
    }

    /// Place a new widget at the first free slot in scan order.
    ///
    /// # Errors
    /// Returns a message if no `width × height` slot is free. Unlike
    /// conflict resolution, adding never falls back to an overlapping
    /// origin placement.
    pub fn add_widget(
        &mut self,
        kind: &str,
        size: WidgetSize,
        config: serde_json::Value,
    ) -> Result<WidgetId, String> {
        let Some(cell) = find_free(&self.occupancy(), size.width, size.height) else {
            return Err(format!(
                "no free {}×{} slot for `{kind}` on dashboard `{}`",
                size.width, size.height, self.dashboard
            ));
        };
        let id = WidgetId::with_prefix(kind);
        let mut record = PlacementRecord::new(
            id,
            self.dashboard,
            kind,
            GridRect::new(cell.x, cell.y, size.width, size.height),
        );
        record.config = config;
        log::debug!("added {id:?} at {cell}");
        self.records.push(record);
        Ok(id)
    }

    pub fn remove_widget(&mut self, id: WidgetId) -> Option<PlacementRecord> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(pos))
    }

    /// Every pair of records whose rectangles intersect.
    pub fn overlapping_pairs(&self) -> Vec<(WidgetId, WidgetId)> {
        let mut pairs = Vec::new();
        for (i, a) in self.records.iter().enumerate() {
            for b in &self.records[i + 1..] {
                if a.rect().intersects(&b.rect()) {
                    pairs.push((a.id, b.id));
                }
            }
        }
        pairs
    }

    /// Current top-left of `id`, if it is on the board.
    pub fn origin_of(&self, id: WidgetId) -> Option<Cell> {
        self.get(id).map(PlacementRecord::origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dashboard() -> DashboardId {
        DashboardId::intern("board_tests")
    }

    #[test]
    fn add_widget_uses_first_fit() {
        let mut board = Board::empty(dashboard(), GridConfig::default());
        let big = board
            .add_widget("calendar", WidgetSize::new(2, 2), serde_json::Value::Null)
            .unwrap();
        let strip = board
            .add_widget("stocks", WidgetSize::new(2, 1), serde_json::Value::Null)
            .unwrap();
        assert_eq!(board.origin_of(big), Some(Cell::new(0, 0)));
        assert_eq!(board.origin_of(strip), Some(Cell::new(2, 0)));
        assert!(board.overlapping_pairs().is_empty());
    }

    #[test]
    fn add_widget_reports_full_board() {
        let mut board = Board::empty(dashboard(), GridConfig::default());
        board
            .add_widget("wall", WidgetSize::new(4, 4), serde_json::Value::Null)
            .unwrap();
        let err = board
            .add_widget("clock", WidgetSize::new(1, 1), serde_json::Value::Null)
            .unwrap_err();
        assert!(err.contains("no free 1×1 slot"), "unexpected error: {err}");
        assert_eq!(board.records().len(), 1);
    }

    #[test]
    fn new_rejects_malformed_records() {
        let bad = PlacementRecord::new(
            WidgetId::intern("spill"),
            dashboard(),
            "notes",
            GridRect::new(3, 0, 2, 1),
        );
        let err = Board::new(dashboard(), vec![bad], GridConfig::default()).unwrap_err();
        assert!(err.starts_with("out-of-bounds"), "unexpected error: {err}");
    }

    #[test]
    fn records_beyond_the_fixed_grid_are_rejected() {
        let far = PlacementRecord::new(
            WidgetId::intern("far"),
            dashboard(),
            "clock",
            GridRect::new(5, 5, 1, 1),
        );
        let config = GridConfig { cache_capacity: 0 };
        let err = Board::new(dashboard(), vec![far], config).unwrap_err();
        assert!(err.contains("4×4"), "unexpected error: {err}");
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut board = Board::empty(dashboard(), GridConfig::default());
        let id = board
            .add_widget("clock", WidgetSize::new(1, 1), serde_json::Value::Null)
            .unwrap();
        let snap = board.snapshot();
        board.apply(&[PositionUpdate::new(id, Cell::new(3, 3))]);
        assert_eq!(board.origin_of(id), Some(Cell::new(3, 3)));
        board.restore(snap.clone());
        assert_eq!(board.snapshot(), snap);
    }

    #[test]
    fn remove_widget_frees_its_cells() {
        let mut board = Board::empty(dashboard(), GridConfig::default());
        let id = board
            .add_widget("notes", WidgetSize::new(2, 2), serde_json::Value::Null)
            .unwrap();
        assert_eq!(board.occupancy().free_cell_count(), 12);
        assert!(board.remove_widget(id).is_some());
        assert!(board.remove_widget(id).is_none());
        assert_eq!(board.occupancy().free_cell_count(), 16);
    }
}
