use crate::error::Result;
use chrono::{DateTime, Utc};
use corvus_shared::{CustomerId, TaskId, UniverseId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of infrastructure operation a task executes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    CreateUniverse,
    EditUniverse,
    DestroyUniverse,
    ConfigureAlerts,
}

impl OperationKind {
    /// Human-readable verb used to build task descriptions
    pub fn friendly_verb(&self) -> &'static str {
        match self {
            OperationKind::CreateUniverse => "Creating",
            OperationKind::EditUniverse => "Editing",
            OperationKind::DestroyUniverse => "Destroying",
            OperationKind::ConfigureAlerts => "Configuring alerts for",
        }
    }

    /// Whether this operation targets a specific universe
    pub fn requires_universe(&self) -> bool {
        matches!(
            self,
            OperationKind::CreateUniverse
                | OperationKind::EditUniverse
                | OperationKind::DestroyUniverse
                | OperationKind::ConfigureAlerts
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::CreateUniverse => write!(f, "CREATE_UNIVERSE"),
            OperationKind::EditUniverse => write!(f, "EDIT_UNIVERSE"),
            OperationKind::DestroyUniverse => write!(f, "DESTROY_UNIVERSE"),
            OperationKind::ConfigureAlerts => write!(f, "CONFIGURE_ALERTS"),
        }
    }
}

/// Durable ledger entry for one submitted operation
///
/// Created at submission time, mutated only by the completion-marking
/// transition, never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub customer_id: CustomerId,
    /// Target resource, when the operation mutates one
    pub universe_id: Option<UniverseId>,
    pub task_type: OperationKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Set at most once, only after percent-complete reaches 100
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn new(
        id: TaskId,
        customer_id: CustomerId,
        universe_id: Option<UniverseId>,
        task_type: OperationKind,
        description: String,
    ) -> Self {
        Self {
            id,
            customer_id,
            universe_id,
            task_type,
            description,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Marks the record completed. Marking an already-completed record is a
    /// no-op; the original completion timestamp is preserved.
    pub fn mark_completed(&mut self) {
        if self.completed_at.is_none() {
            self.completed_at = Some(Utc::now());
        }
    }

    /// A record without a completion timestamp is still pending
    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }
}

/// Port for the durable task ledger
///
/// The ledger is the single source of truth for terminal state. Its only
/// permitted writers are the commissioner's creation transition (`save`) and
/// the progress aggregator's completion-marking transition (`mark_completed`).
#[async_trait::async_trait]
pub trait TaskRecordRepository: Send + Sync {
    async fn save(&self, record: &TaskRecord) -> Result<()>;
    async fn find_by_id(&self, task_id: &TaskId) -> Result<Option<TaskRecord>>;
    /// At most `limit` most-recently-created records for a customer,
    /// optionally filtered to one target universe, newest first.
    async fn find_recent(
        &self,
        customer_id: &CustomerId,
        universe_id: Option<&UniverseId>,
        limit: usize,
    ) -> Result<Vec<TaskRecord>>;
    /// Idempotent: marking an already-completed record is a no-op
    async fn mark_completed(&self, task_id: &TaskId) -> Result<()>;
}
