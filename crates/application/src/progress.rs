use corvus_domain::{ProgressSnapshot, Result, TaskRecordRepository};
use corvus_shared::TaskId;
use std::sync::Arc;
use tracing::debug;

/// Derives completion from progress snapshots and owns the ledger's
/// completion-marking transition.
///
/// Together with the commissioner's creation transition, this is the only
/// permitted writer to the task ledger.
pub struct ProgressAggregator {
    records: Arc<dyn TaskRecordRepository>,
}

impl ProgressAggregator {
    pub fn new(records: Arc<dyn TaskRecordRepository>) -> Self {
        Self { records }
    }

    /// Observe a freshly derived snapshot for a task.
    ///
    /// Reaching 100 percent triggers the one-time completion marking; marking
    /// an already-completed record is a no-op, not an error.
    pub async fn observe(&self, task_id: &TaskId, snapshot: &ProgressSnapshot) -> Result<()> {
        if snapshot.percent == 100 {
            debug!(task_id = %task_id, state = %snapshot.state, "marking task completed");
            self.records.mark_completed(task_id).await?;
        }
        Ok(())
    }
}
