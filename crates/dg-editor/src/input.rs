//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen gestures into a `GestureEvent` enum
//! consumed by the drag controller. Hit-testing is the host's job: events
//! arrive with the grid cell already resolved.

use dg_core::id::WidgetId;
use dg_core::model::Cell;

/// Which kind of device started the gesture. Touch needs a press-and-hold
/// before it becomes a drag so it can be told apart from a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    pub fn is_touch(self) -> bool {
        matches!(self, PointerKind::Touch)
    }
}

/// Pointer-down / touch-start on a widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureStart {
    /// The widget under the pointer.
    pub id: WidgetId,
    /// The grid cell under the pointer (inside the widget).
    pub cell: Cell,
    /// Pointer position in host units, for activation thresholds.
    pub x: f32,
    pub y: f32,
    /// Host timestamp in milliseconds.
    pub at_ms: u64,
    pub kind: PointerKind,
}

/// A normalized gesture event.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    Start(GestureStart),

    /// Pointer moved. Hosts re-send the last position while a touch is
    /// held still so the hold delay can elapse.
    Move { x: f32, y: f32, at_ms: u64 },

    /// The grid cell under the pointer changed. `None` = outside the grid.
    Hover { cell: Option<Cell> },

    /// Pointer released over `cell` (`None` = outside the grid).
    Drop { cell: Option<Cell> },

    /// The input system lost the gesture (pointer capture lost, Escape).
    Cancel,
}

impl GestureEvent {
    pub fn start(id: WidgetId, cell: Cell, kind: PointerKind, at_ms: u64) -> Self {
        Self::Start(GestureStart {
            id,
            cell,
            x: 0.0,
            y: 0.0,
            at_ms,
            kind,
        })
    }
}
