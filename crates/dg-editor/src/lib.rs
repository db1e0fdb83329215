pub mod drag;
pub mod input;
pub mod sink;

pub use drag::{
    ActivationThresholds, DragController, DragEffect, DragHandler, DragPhase, DragSession,
};
pub use input::{GestureEvent, GestureStart, PointerKind};
pub use sink::{CommitBatch, PositionSink};
