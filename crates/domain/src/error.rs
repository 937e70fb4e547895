// Domain error taxonomy. Every internal fault is converted to one of these
// kinds at the commissioner boundary; nothing crosses the core's external
// interface as an unstructured failure.

use corvus_shared::TaskId;

#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    /// Malformed or unsupported operation request; rejected at submission
    #[error("Invalid operation spec: {reason}")]
    InvalidSpec { reason: String },

    /// Identifier outside the caller's scope; a client-side error
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: TaskId },

    #[error("Repository error: {0}")]
    Repository(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
