use crate::commissioner::TaskCommissioner;
use crate::progress::ProgressAggregator;
use corvus_domain::{Result, TaskRecordRepository};
use corvus_shared::{CustomerId, TaskId, TaskState, UniverseId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// One row of a customer task listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOverview {
    pub id: TaskId,
    pub title: String,
    pub percent_complete: u8,
    pub state: TaskState,
    pub success: bool,
}

/// Customer-facing read path over recent tasks
///
/// Each listed record is annotated with a freshly polled snapshot via a
/// direct in-process call to the commissioner; no network round-trip is
/// involved. Reaching 100 percent marks the ledger record completed.
pub struct TaskQueryFacade {
    records: Arc<dyn TaskRecordRepository>,
    commissioner: Arc<TaskCommissioner>,
    aggregator: Arc<ProgressAggregator>,
    history_limit: usize,
}

impl TaskQueryFacade {
    pub fn new(
        records: Arc<dyn TaskRecordRepository>,
        commissioner: Arc<TaskCommissioner>,
        aggregator: Arc<ProgressAggregator>,
        history_limit: usize,
    ) -> Self {
        Self {
            records,
            commissioner,
            aggregator,
            history_limit,
        }
    }

    /// List the customer's most recent tasks, newest first, optionally
    /// filtered to one target universe.
    ///
    /// A task whose status poll fails is logged and omitted from the listing.
    pub async fn list(
        &self,
        customer_id: &CustomerId,
        universe_id: Option<&UniverseId>,
    ) -> Result<Vec<TaskOverview>> {
        let records = self
            .records
            .find_recent(customer_id, universe_id, self.history_limit)
            .await?;

        let mut overviews = Vec::with_capacity(records.len());
        for record in records {
            let snapshot = match self.commissioner.get_status(&record.id).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    error!(task_id = %record.id, error = %e, "error fetching task progress");
                    continue;
                }
            };

            self.aggregator.observe(&record.id, &snapshot).await?;

            overviews.push(TaskOverview {
                id: record.id,
                title: record.description,
                percent_complete: snapshot.percent,
                success: snapshot.state == TaskState::Success,
                state: snapshot.state,
            });
        }
        Ok(overviews)
    }
}
