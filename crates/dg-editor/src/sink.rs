//! Hand-off of committed positions to the persistence layer.
//!
//! The engine fires and forgets: once a commit is handed to the sink,
//! retries and server-side rollback are the host's business.

use dg_core::id::DashboardId;
use dg_core::model::PositionUpdate;
use serde::Serialize;

/// Receives the position updates of every committed gesture.
pub trait PositionSink {
    fn commit(&mut self, dashboard: DashboardId, updates: &[PositionUpdate]);
}

/// One committed gesture, as queued by the `Vec` sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitBatch {
    pub dashboard_id: DashboardId,
    pub updates: Vec<PositionUpdate>,
}

/// Queue commits in memory for the host to drain.
impl PositionSink for Vec<CommitBatch> {
    fn commit(&mut self, dashboard: DashboardId, updates: &[PositionUpdate]) {
        self.push(CommitBatch {
            dashboard_id: dashboard,
            updates: updates.to_vec(),
        });
    }
}

impl<S: PositionSink + ?Sized> PositionSink for &mut S {
    fn commit(&mut self, dashboard: DashboardId, updates: &[PositionUpdate]) {
        (**self).commit(dashboard, updates);
    }
}
