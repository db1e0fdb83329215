//! Core data model for grid dashboards.
//!
//! A dashboard is a flat list of `PlacementRecord`s on a small square grid.
//! Records are value objects owned by the host: the engine reads their
//! rectangles and emits `PositionUpdate`s, never touching the opaque
//! `config` payload.

use crate::id::{DashboardId, WidgetId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─── Geometry ────────────────────────────────────────────────────────────

/// A single grid cell, zero-based, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: u16,
    pub y: u16,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl GridRect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The same size, moved so its top-left is `cell`.
    pub fn at(self, cell: Cell) -> Self {
        Self {
            x: cell.x,
            y: cell.y,
            ..self
        }
    }

    pub fn origin(&self) -> Cell {
        Cell::new(self.x, self.y)
    }

    /// Exclusive right edge. Computed in `u32` so huge spans cannot wrap.
    pub fn right(&self) -> u32 {
        u32::from(self.x) + u32::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        u32::from(self.y) + u32::from(self.height)
    }

    /// Standard overlap test: the rectangles intersect unless they are
    /// fully separated on at least one axis. Empty rectangles never intersect.
    pub fn intersects(&self, other: &GridRect) -> bool {
        if self.width == 0 || self.height == 0 || other.width == 0 || other.height == 0 {
            return false;
        }
        u32::from(self.x) < other.right()
            && u32::from(other.x) < self.right()
            && u32::from(self.y) < other.bottom()
            && u32::from(other.y) < self.bottom()
    }

    /// Whether the rectangle lies fully inside a `size × size` grid.
    pub fn fits_within(&self, size: u16) -> bool {
        self.width >= 1
            && self.height >= 1
            && self.right() <= u32::from(size)
            && self.bottom() <= u32::from(size)
    }

    /// Whether `cell` is one of the covered cells.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x
            && cell.y >= self.y
            && u32::from(cell.x) < self.right()
            && u32::from(cell.y) < self.bottom()
    }

    /// Every covered cell, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let (x, width) = (self.x, self.width);
        let rows = self.y..self.y.saturating_add(self.height);
        rows.flat_map(move |row| {
            let cols = x..x.saturating_add(width);
            cols.map(move |col| Cell::new(col, row))
        })
    }
}

impl fmt::Display for GridRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}×{})",
            self.x, self.y, self.width, self.height
        )
    }
}

// ─── Records ─────────────────────────────────────────────────────────────

/// A placed widget. The engine treats it as a value object: only the
/// rectangle is ever rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRecord {
    pub id: WidgetId,
    pub dashboard_id: DashboardId,
    /// Widget type name; the key into the size table.
    #[serde(default)]
    pub kind: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Opaque widget payload, carried through unchanged.
    #[serde(default)]
    pub config: serde_json::Value,
    /// Version marker, only used to detect "no change" for caching.
    #[serde(default)]
    pub updated_at: u64,
}

impl PlacementRecord {
    pub fn new(
        id: WidgetId,
        dashboard_id: DashboardId,
        kind: impl Into<String>,
        rect: GridRect,
    ) -> Self {
        Self {
            id,
            dashboard_id,
            kind: kind.into(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            config: serde_json::Value::Null,
            updated_at: 0,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.width, self.height)
    }

    pub fn origin(&self) -> Cell {
        Cell::new(self.x, self.y)
    }

    /// Move the top-left corner, keeping the span.
    pub fn move_to(&mut self, cell: Cell) {
        self.x = cell.x;
        self.y = cell.y;
    }
}

/// A position change emitted by the engine: the unit of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: WidgetId,
    pub x: u16,
    pub y: u16,
}

impl PositionUpdate {
    pub fn new(id: WidgetId, cell: Cell) -> Self {
        Self {
            id,
            x: cell.x,
            y: cell.y,
        }
    }

    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

// ─── Breakpoints ─────────────────────────────────────────────────────────

/// Viewport class. Dragging only happens at `Wide`; the other two are
/// display-only layouts derived by the responsive transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Narrow,
    Medium,
    Wide,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Narrow, Breakpoint::Medium, Breakpoint::Wide];

    /// Number of grid columns at this breakpoint.
    pub const fn columns(self) -> u16 {
        match self {
            Breakpoint::Wide => 4,
            Breakpoint::Medium => 2,
            Breakpoint::Narrow => 1,
        }
    }

    /// Classify a viewport width.
    pub fn from_viewport_width(width: u32, thresholds: &BreakpointThresholds) -> Self {
        if width < thresholds.narrow_below {
            Breakpoint::Narrow
        } else if width < thresholds.medium_below {
            Breakpoint::Medium
        } else {
            Breakpoint::Wide
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Narrow => "narrow",
            Breakpoint::Medium => "medium",
            Breakpoint::Wide => "wide",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Config ───────────────────────────────────────────────────────────────

/// Viewport widths (in host units) at which the layout steps down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BreakpointThresholds {
    /// Widths below this are `Narrow`. Default: **768**.
    pub narrow_below: u32,
    /// Widths below this (and not narrow) are `Medium`. Default: **1280**.
    pub medium_below: u32,
}

impl Default for BreakpointThresholds {
    fn default() -> Self {
        Self {
            narrow_below: 768,
            medium_below: 1280,
        }
    }
}

/// Side length of the square grid records are stored on. Fixed: the wide
/// layout shows stored rectangles as-is, so both must agree.
pub const GRID_SIZE: u16 = Breakpoint::Wide.columns();

/// Engine configuration for one dashboard surface.
///
/// The grid dimensions are not configurable; see [`GRID_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct GridConfig {
    /// Maximum number of memoized responsive layouts. Default: **50**.
    pub cache_capacity: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { cache_capacity: 50 }
    }
}
