use corvus_domain::{DomainError, OperationKind, Result};
use corvus_shared::{CustomerId, TaskId, UniverseId};
use serde::{Deserialize, Serialize};

/// A customer's request for one infrastructure operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub customer_id: CustomerId,
    pub kind: OperationKind,
    pub universe_id: Option<UniverseId>,
    /// Name of the target resource, used to build the task description
    pub resource_name: String,
}

impl OperationSpec {
    /// Reject malformed requests before any TaskRecord is created
    pub fn validate(&self) -> Result<()> {
        if self.resource_name.trim().is_empty() {
            return Err(DomainError::InvalidSpec {
                reason: "resource name must not be blank".to_string(),
            });
        }
        if self.kind.requires_universe() && self.universe_id.is_none() {
            return Err(DomainError::InvalidSpec {
                reason: format!("operation {} requires a universe id", self.kind),
            });
        }
        Ok(())
    }

    pub fn description(&self) -> String {
        format!("{} {}", self.kind.friendly_verb(), self.resource_name)
    }
}

/// Submission acknowledgement returned to the transport layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedTask {
    pub task_id: TaskId,
    /// Resource being modified by the task, when there is one
    pub resource_id: Option<UniverseId>,
}
