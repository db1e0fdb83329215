pub mod board;
pub mod conflict;
pub mod grid;
pub mod id;
pub mod model;
pub mod placement;
pub mod responsive;
pub mod validate;

pub use board::{Board, BoardSnapshot};
pub use conflict::{Displacements, candidate_rect, find_conflicts, resolve_conflicts};
pub use grid::GridModel;
pub use id::{DashboardId, WidgetId};
pub use model::*;
pub use placement::{find_free, place_or_origin};
pub use responsive::{
    BreakpointSizes, CacheStats, DisplayItem, ResponsiveTransformer, SizeTable, WidgetSize,
    layout_for,
};
pub use validate::{RecordDiagnostic, Severity, validate_records};
