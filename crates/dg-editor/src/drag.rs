//! Drag gesture state machine.
//!
//! ```text
//! Idle ──start──▶ Armed ──threshold──▶ Dragging ──drop──▶ Committed ─┐
//!   ▲               │                     │                           │
//!   │               └──tap / scroll───────┤──cancel──▶ Cancelled ─────┤
//!   └─────────────────────────────────────┴───────────────────────────┘
//! ```
//!
//! `Committed` and `Cancelled` are reported as the [`DragEffect`] of the
//! call that ends the gesture; the controller is back in `Idle` right after.
//!
//! While dragging, every hovered-cell change runs conflict resolution and
//! applies the displacements to the board straight away. The dragged widget
//! itself stays at its origin on the board until the drop. Cancelling
//! restores the board snapshot taken when the drag activated.

use crate::input::{GestureEvent, GestureStart, PointerKind};
use crate::sink::PositionSink;
use dg_core::board::{Board, BoardSnapshot};
use dg_core::conflict::{Displacements, candidate_rect, resolve_conflicts};
use dg_core::id::WidgetId;
use dg_core::model::{Cell, GridRect, PositionUpdate};
use serde::{Deserialize, Serialize};

// ─── Config ───────────────────────────────────────────────────────────────

/// When a press becomes a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActivationThresholds {
    /// Mouse/pen travel (host units) before a press becomes a drag.
    /// `0.0` activates on press. Default: **0.0**.
    pub pointer_distance: f32,
    /// How long a touch must be held before it becomes a drag. Default: **250**.
    pub touch_delay_ms: u64,
    /// Touch travel allowed during the hold; more means the user is
    /// scrolling. Default: **5.0**.
    pub touch_tolerance: f32,
}

impl Default for ActivationThresholds {
    fn default() -> Self {
        Self {
            pointer_distance: 0.0,
            touch_delay_ms: 250,
            touch_tolerance: 5.0,
        }
    }
}

// ─── Handler interface ────────────────────────────────────────────────────

/// What a handler call did.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    /// Nothing changed (not in edit mode, no gesture, or a repeat event).
    Ignored,
    /// A press landed on a widget; waiting for the activation threshold.
    Armed(WidgetId),
    /// The press became a drag.
    Activated(WidgetId),
    /// An armed press ended before activating (tap, scroll, release).
    Abandoned,
    /// Hovered a new cell; these displacements were applied to the board.
    Hovered(Displacements),
    /// The drop was committed; these updates went to the sink.
    Committed(Vec<PositionUpdate>),
    /// The gesture was rolled back; the board equals its pre-drag state.
    Cancelled,
}

/// Capability interface between an input library and the drag state
/// machine. Any input stack that can report these five things can drive a
/// controller.
pub trait DragHandler {
    fn on_gesture_start(&mut self, start: &GestureStart) -> DragEffect;

    fn on_pointer_move(&mut self, x: f32, y: f32, at_ms: u64) -> DragEffect;

    fn on_hover_cell(&mut self, cell: Option<Cell>) -> DragEffect;

    fn on_drop(&mut self, cell: Option<Cell>) -> DragEffect;

    fn on_cancel(&mut self) -> DragEffect;

    /// Route a normalized event to the matching callback.
    fn dispatch(&mut self, event: &GestureEvent) -> DragEffect {
        match event {
            GestureEvent::Start(start) => self.on_gesture_start(start),
            GestureEvent::Move { x, y, at_ms } => self.on_pointer_move(*x, *y, *at_ms),
            GestureEvent::Hover { cell } => self.on_hover_cell(*cell),
            GestureEvent::Drop { cell } => self.on_drop(*cell),
            GestureEvent::Cancel => self.on_cancel(),
        }
    }
}

// ─── State ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Armed,
    Dragging,
}

#[derive(Debug, Clone)]
struct ArmedGesture {
    id: WidgetId,
    grab_offset: Cell,
    kind: PointerKind,
    start_x: f32,
    start_y: f32,
    started_at: u64,
}

/// State of one activated drag. Lives exactly as long as the gesture.
#[derive(Debug, Clone)]
pub struct DragSession {
    active_id: WidgetId,
    /// Grab cell minus the widget's top-left.
    grab_offset: Cell,
    origin: GridRect,
    last_hover: Option<Cell>,
    /// Latest position of every widget displaced so far, in the order they
    /// were first displaced.
    displaced: Vec<PositionUpdate>,
    snapshot: BoardSnapshot,
}

impl DragSession {
    pub fn active_id(&self) -> WidgetId {
        self.active_id
    }

    pub fn grab_offset(&self) -> Cell {
        self.grab_offset
    }

    pub fn last_hover(&self) -> Option<Cell> {
        self.last_hover
    }

    pub fn displaced(&self) -> &[PositionUpdate] {
        &self.displaced
    }

    fn record_displacements(&mut self, updates: &[PositionUpdate]) {
        for update in updates {
            match self.displaced.iter_mut().find(|d| d.id == update.id) {
                Some(existing) => *existing = *update,
                None => self.displaced.push(*update),
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Armed(ArmedGesture),
    Dragging(DragSession),
}

// ─── Controller ───────────────────────────────────────────────────────────

/// Drives one dashboard's working set through drag gestures.
pub struct DragController<S: PositionSink> {
    board: Board,
    sink: S,
    thresholds: ActivationThresholds,
    edit_mode: bool,
    state: DragState,
}

impl<S: PositionSink> DragController<S> {
    /// A controller starts outside edit mode, where it ignores all input.
    pub fn new(board: Board, thresholds: ActivationThresholds, sink: S) -> Self {
        Self {
            board,
            sink,
            thresholds,
            edit_mode: false,
            state: DragState::Idle,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Leaving edit mode mid-gesture cancels the gesture.
    pub fn set_edit_mode(&mut self, on: bool) -> DragEffect {
        self.edit_mode = on;
        if on {
            DragEffect::Ignored
        } else {
            self.on_cancel()
        }
    }

    /// Replace the working set (e.g. after the host reloaded records).
    /// Any gesture in flight is cancelled against the old board first.
    pub fn load(&mut self, board: Board) {
        self.on_cancel();
        self.board = board;
    }

    pub fn phase(&self) -> DragPhase {
        match self.state {
            DragState::Idle => DragPhase::Idle,
            DragState::Armed(_) => DragPhase::Armed,
            DragState::Dragging(_) => DragPhase::Dragging,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Widgets displaced so far in the live gesture, for optimistic
    /// rendering. Empty outside a drag.
    pub fn displaced(&self) -> &[PositionUpdate] {
        match self.session() {
            Some(session) => session.displaced(),
            None => &[],
        }
    }

    fn activate(&mut self, armed: ArmedGesture) -> DragEffect {
        let Some(record) = self.board.get(armed.id) else {
            self.state = DragState::Idle;
            return DragEffect::Abandoned;
        };
        log::debug!("drag activated for {:?} from {}", armed.id, record.rect());
        self.state = DragState::Dragging(DragSession {
            active_id: armed.id,
            grab_offset: armed.grab_offset,
            origin: record.rect(),
            last_hover: None,
            displaced: Vec::new(),
            snapshot: self.board.snapshot(),
        });
        DragEffect::Activated(armed.id)
    }

    /// `cell` if it lies on the board, `None` otherwise. Hosts may report
    /// cells past the edge; those count as outside any target.
    fn on_board(&self, cell: Option<Cell>) -> Option<Cell> {
        let size = self.board.size();
        cell.filter(|c| c.x < size && c.y < size)
    }

    /// Candidate rectangle for the active widget with `cell` under the pointer.
    fn candidate(&self, session: &DragSession, cell: Cell) -> GridRect {
        candidate_rect(session.origin, cell, session.grab_offset, self.board.size())
    }

    fn hover(&mut self, cell: Option<Cell>) -> DragEffect {
        let DragState::Dragging(session) = &self.state else {
            return DragEffect::Ignored;
        };
        if session.last_hover == cell {
            return DragEffect::Ignored;
        }
        let active = session.active_id;
        let updates = match cell {
            Some(cell) => {
                let candidate = self.candidate(session, cell);
                resolve_conflicts(self.board.records(), active, candidate, self.board.size())
            }
            None => Displacements::new(),
        };
        self.board.apply(&updates);
        if let DragState::Dragging(session) = &mut self.state {
            session.last_hover = cell;
            session.record_displacements(&updates);
        }
        log::trace!("{active:?} hovering {cell:?}, displaced {}", updates.len());
        DragEffect::Hovered(updates)
    }

    fn rollback(&mut self) -> DragEffect {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragEffect::Ignored,
            DragState::Armed(_) => DragEffect::Abandoned,
            DragState::Dragging(session) => {
                log::debug!(
                    "drag of {:?} cancelled, rolling back {} displacements",
                    session.active_id,
                    session.displaced.len()
                );
                self.board.restore(session.snapshot);
                DragEffect::Cancelled
            }
        }
    }

    fn commit(&mut self, cell: Cell) -> DragEffect {
        // The drop cell may differ from the last hover event the host sent.
        self.hover(Some(cell));

        let DragState::Dragging(session) = &self.state else {
            return DragEffect::Ignored;
        };
        let target = self.candidate(session, cell).origin();
        if target == session.origin.origin() {
            return self.rollback();
        }

        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return DragEffect::Ignored;
        };
        let mut updates = vec![PositionUpdate::new(session.active_id, target)];
        updates.extend(
            session
                .displaced
                .iter()
                .filter(|d| session.snapshot.origin_of(d.id) != Some(d.cell())),
        );
        self.board.apply(&updates[..1]);

        let overlaps = self.board.overlapping_pairs();
        if !overlaps.is_empty() {
            log::warn!(
                "commit of {:?} left {} overlapping pair(s): {overlaps:?}",
                session.active_id,
                overlaps.len()
            );
        }
        log::debug!(
            "drag of {:?} committed at {target} with {} update(s)",
            session.active_id,
            updates.len()
        );
        self.sink.commit(self.board.dashboard(), &updates);
        DragEffect::Committed(updates)
    }
}

impl<S: PositionSink> DragHandler for DragController<S> {
    fn on_gesture_start(&mut self, start: &GestureStart) -> DragEffect {
        if !self.edit_mode {
            return DragEffect::Ignored;
        }
        if !matches!(self.state, DragState::Idle) {
            log::debug!(
                "ignoring gesture on {:?}: another gesture is active",
                start.id
            );
            return DragEffect::Ignored;
        }
        let Some(record) = self.board.get(start.id) else {
            log::debug!("ignoring gesture on unknown widget {:?}", start.id);
            return DragEffect::Ignored;
        };

        let rect = record.rect();
        let grab_offset = if rect.contains(start.cell) {
            Cell::new(start.cell.x - rect.x, start.cell.y - rect.y)
        } else {
            Cell::ORIGIN
        };
        let armed = ArmedGesture {
            id: start.id,
            grab_offset,
            kind: start.kind,
            start_x: start.x,
            start_y: start.y,
            started_at: start.at_ms,
        };

        if !start.kind.is_touch() && self.thresholds.pointer_distance <= 0.0 {
            return self.activate(armed);
        }
        log::debug!("armed {:?} ({:?})", start.id, start.kind);
        self.state = DragState::Armed(armed);
        DragEffect::Armed(start.id)
    }

    fn on_pointer_move(&mut self, x: f32, y: f32, at_ms: u64) -> DragEffect {
        let DragState::Armed(armed) = &self.state else {
            return DragEffect::Ignored;
        };
        let distance = (x - armed.start_x).hypot(y - armed.start_y);

        if armed.kind.is_touch() {
            let held = at_ms.saturating_sub(armed.started_at);
            if held >= self.thresholds.touch_delay_ms {
                let armed = armed.clone();
                return self.activate(armed);
            }
            if distance > self.thresholds.touch_tolerance {
                log::debug!(
                    "touch on {:?} moved {distance:.1} before hold, treating as scroll",
                    armed.id
                );
                self.state = DragState::Idle;
                return DragEffect::Abandoned;
            }
            return DragEffect::Ignored;
        }

        if distance > self.thresholds.pointer_distance {
            let armed = armed.clone();
            return self.activate(armed);
        }
        DragEffect::Ignored
    }

    fn on_hover_cell(&mut self, cell: Option<Cell>) -> DragEffect {
        if !self.edit_mode {
            return DragEffect::Ignored;
        }
        self.hover(self.on_board(cell))
    }

    fn on_drop(&mut self, cell: Option<Cell>) -> DragEffect {
        match (self.phase(), self.on_board(cell)) {
            (DragPhase::Idle, _) => DragEffect::Ignored,
            (DragPhase::Armed, _) => {
                self.state = DragState::Idle;
                DragEffect::Abandoned
            }
            (DragPhase::Dragging, Some(cell)) => self.commit(cell),
            (DragPhase::Dragging, None) => self.rollback(),
        }
    }

    fn on_cancel(&mut self) -> DragEffect {
        self.rollback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CommitBatch;
    use dg_core::id::DashboardId;
    use dg_core::model::{GridConfig, PlacementRecord};
    use pretty_assertions::assert_eq;

    fn dashboard() -> DashboardId {
        DashboardId::intern("drag_tests")
    }

    fn record(id: &str, rect: GridRect) -> PlacementRecord {
        PlacementRecord::new(WidgetId::intern(id), dashboard(), "notes", rect)
    }

    fn controller(records: Vec<PlacementRecord>) -> DragController<Vec<CommitBatch>> {
        let board = Board::new(dashboard(), records, GridConfig::default()).unwrap();
        let mut c = DragController::new(board, ActivationThresholds::default(), Vec::new());
        c.set_edit_mode(true);
        c
    }

    fn press(id: &str, cell: Cell, kind: PointerKind, at_ms: u64) -> GestureStart {
        GestureStart {
            id: WidgetId::intern(id),
            cell,
            x: 0.0,
            y: 0.0,
            at_ms,
            kind,
        }
    }

    #[test]
    fn mouse_activates_immediately_by_default() {
        let mut c = controller(vec![record("a", GridRect::new(0, 0, 1, 1))]);
        let effect = c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        assert_eq!(effect, DragEffect::Activated(WidgetId::intern("a")));
        assert_eq!(c.phase(), DragPhase::Dragging);
    }

    #[test]
    fn mouse_waits_for_distance_threshold() {
        let board = Board::new(
            dashboard(),
            vec![record("a", GridRect::new(0, 0, 1, 1))],
            GridConfig::default(),
        )
        .unwrap();
        let thresholds = ActivationThresholds {
            pointer_distance: 8.0,
            ..Default::default()
        };
        let mut c = DragController::new(board, thresholds, Vec::<CommitBatch>::new());
        c.set_edit_mode(true);

        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        assert_eq!(c.phase(), DragPhase::Armed);
        assert_eq!(c.on_pointer_move(3.0, 4.0, 10), DragEffect::Ignored);
        assert_eq!(
            c.on_pointer_move(6.0, 8.0, 20),
            DragEffect::Activated(WidgetId::intern("a"))
        );
    }

    #[test]
    fn touch_hold_activates_after_delay() {
        let mut c = controller(vec![record("a", GridRect::new(0, 0, 1, 1))]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Touch, 1_000));
        assert_eq!(c.phase(), DragPhase::Armed);
        assert_eq!(c.on_pointer_move(2.0, 0.0, 1_100), DragEffect::Ignored);
        assert_eq!(
            c.on_pointer_move(2.0, 1.0, 1_250),
            DragEffect::Activated(WidgetId::intern("a"))
        );
    }

    #[test]
    fn touch_moving_early_is_a_scroll() {
        let mut c = controller(vec![record("a", GridRect::new(0, 0, 1, 1))]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Touch, 0));
        assert_eq!(c.on_pointer_move(0.0, 30.0, 50), DragEffect::Abandoned);
        assert_eq!(c.phase(), DragPhase::Idle);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn release_while_armed_is_a_tap() {
        let mut c = controller(vec![record("a", GridRect::new(0, 0, 1, 1))]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Touch, 0));
        assert_eq!(c.on_drop(Some(Cell::new(2, 2))), DragEffect::Abandoned);
        assert_eq!(c.phase(), DragPhase::Idle);
    }

    #[test]
    fn grab_offset_is_relative_to_origin() {
        let mut c = controller(vec![record("big", GridRect::new(1, 1, 2, 2))]);
        c.on_gesture_start(&press("big", Cell::new(2, 2), PointerKind::Mouse, 0));
        let offset = c.session().map(DragSession::grab_offset);
        assert_eq!(offset, Some(Cell::new(1, 1)));
    }

    #[test]
    fn repeated_hover_on_same_cell_is_ignored() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        let first = c.on_hover_cell(Some(Cell::new(1, 1)));
        assert!(matches!(first, DragEffect::Hovered(ref u) if u.len() == 1));
        assert_eq!(c.on_hover_cell(Some(Cell::new(1, 1))), DragEffect::Ignored);
        assert_eq!(c.displaced().len(), 1);
    }

    #[test]
    fn dragged_widget_stays_put_until_drop() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        c.on_hover_cell(Some(Cell::new(3, 3)));
        let a = WidgetId::intern("a");
        assert_eq!(c.board().origin_of(a), Some(Cell::ORIGIN));
    }

    #[test]
    fn drop_back_on_origin_rolls_back() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ]);
        let before = c.board().clone();
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        c.on_hover_cell(Some(Cell::new(1, 1)));
        assert_eq!(c.on_drop(Some(Cell::ORIGIN)), DragEffect::Cancelled);
        assert_eq!(c.board(), &before);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn leaving_edit_mode_cancels_drag() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ]);
        let before = c.board().clone();
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        c.on_hover_cell(Some(Cell::new(1, 1)));
        assert_eq!(c.set_edit_mode(false), DragEffect::Cancelled);
        assert_eq!(c.board(), &before);
        assert_eq!(c.phase(), DragPhase::Idle);
    }

    #[test]
    fn unknown_widget_does_not_arm() {
        let mut c = controller(vec![record("a", GridRect::new(0, 0, 1, 1))]);
        let effect = c.on_gesture_start(&press("ghost", Cell::ORIGIN, PointerKind::Mouse, 0));
        assert_eq!(effect, DragEffect::Ignored);
        assert_eq!(c.phase(), DragPhase::Idle);
    }

    #[test]
    fn pen_behaves_like_mouse() {
        let mut c = controller(vec![record("a", GridRect::new(0, 0, 1, 1))]);
        let effect = c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Pen, 0));
        assert_eq!(effect, DragEffect::Activated(WidgetId::intern("a")));

        let board = c.board().clone();
        let thresholds = ActivationThresholds {
            pointer_distance: 8.0,
            ..Default::default()
        };
        let mut c = DragController::new(board, thresholds, Vec::<CommitBatch>::new());
        c.set_edit_mode(true);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Pen, 0));
        assert_eq!(c.phase(), DragPhase::Armed);
        // Pens never wait for a hold, however long they sit still.
        assert_eq!(c.on_pointer_move(1.0, 1.0, 5_000), DragEffect::Ignored);
        assert_eq!(
            c.on_pointer_move(0.0, 9.0, 5_010),
            DragEffect::Activated(WidgetId::intern("a"))
        );
    }

    #[test]
    fn hover_past_the_edge_counts_as_outside() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        c.on_hover_cell(Some(Cell::new(1, 1)));
        let effect = c.on_hover_cell(Some(Cell::new(7, 1)));
        assert_eq!(effect, DragEffect::Hovered(Displacements::new()));
        assert_eq!(c.session().and_then(DragSession::last_hover), None);
        // A second off-board report is the same "outside" as the first.
        assert_eq!(c.on_hover_cell(Some(Cell::new(1, 9))), DragEffect::Ignored);
    }

    #[test]
    fn drop_past_the_edge_cancels() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(3, 3, 1, 1)),
        ]);
        let before = c.board().clone();
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        c.on_hover_cell(Some(Cell::new(3, 3)));
        assert_eq!(c.on_drop(Some(Cell::new(9, 9))), DragEffect::Cancelled);
        assert_eq!(c.board(), &before);
        assert!(c.sink().is_empty());
    }

    #[test]
    fn load_cancels_gesture_in_flight() {
        let mut c = controller(vec![
            record("a", GridRect::new(0, 0, 1, 1)),
            record("b", GridRect::new(1, 1, 1, 1)),
        ]);
        c.on_gesture_start(&press("a", Cell::ORIGIN, PointerKind::Mouse, 0));
        c.on_hover_cell(Some(Cell::new(1, 1)));

        let fresh = vec![record("c", GridRect::new(2, 2, 1, 1))];
        let fresh = Board::new(dashboard(), fresh, GridConfig::default()).unwrap();
        c.load(fresh.clone());

        assert_eq!(c.phase(), DragPhase::Idle);
        assert_eq!(c.board(), &fresh);
        assert!(c.displaced().is_empty());
        assert!(c.sink().is_empty());
        assert_eq!(c.on_drop(Some(Cell::new(1, 1))), DragEffect::Ignored);
    }
}
