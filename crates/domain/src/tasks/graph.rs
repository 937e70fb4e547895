use corvus_shared::{CustomerId, TaskId, UniverseId};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of one subtask unit execution
///
/// `Retryable` is re-run by the commissioner up to its configured retry
/// budget; `Fatal` immediately transitions the owning task to `Failure`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubtaskOutcome {
    Success,
    Retryable(String),
    Fatal(String),
}

impl fmt::Display for SubtaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubtaskOutcome::Success => write!(f, "SUCCESS"),
            SubtaskOutcome::Retryable(cause) => write!(f, "RETRYABLE: {}", cause),
            SubtaskOutcome::Fatal(cause) => write!(f, "FATAL: {}", cause),
        }
    }
}

/// Execution context handed to every unit of one task
///
/// The abort flag is task-local; units observe it at their next checkpoint.
#[derive(Debug, Clone)]
pub struct SubtaskContext {
    pub task_id: TaskId,
    pub customer_id: CustomerId,
    pub universe_id: Option<UniverseId>,
    aborted: Arc<AtomicBool>,
}

impl SubtaskContext {
    pub fn new(task_id: TaskId, customer_id: CustomerId, universe_id: Option<UniverseId>) -> Self {
        Self {
            task_id,
            customer_id,
            universe_id,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn request_abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }
}

/// One atomic, idempotent unit of work within a task's execution graph
///
/// Given the same desired-state input, re-running a unit must converge to the
/// same observable state without duplicating side effects.
#[async_trait::async_trait]
pub trait Subtask: Send + Sync {
    fn name(&self) -> &str;
    async fn execute(&self, ctx: &SubtaskContext) -> SubtaskOutcome;
}

/// Ordered stages of subtask units owned by a single task
///
/// Units within one stage may run concurrently; a later stage never starts
/// before every unit of the previous stage completed. The structure is
/// task-local and passed by reference only within that task's execution scope.
#[derive(Default)]
pub struct SubtaskGraph {
    stages: Vec<Vec<Arc<dyn Subtask>>>,
}

impl SubtaskGraph {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage of units that may execute concurrently
    pub fn add_stage(mut self, units: Vec<Arc<dyn Subtask>>) -> Self {
        self.stages.push(units);
        self
    }

    /// Append a stage containing a single unit
    pub fn add_unit(self, unit: Arc<dyn Subtask>) -> Self {
        self.add_stage(vec![unit])
    }

    pub fn stages(&self) -> &[Vec<Arc<dyn Subtask>>] {
        &self.stages
    }

    pub fn total_units(&self) -> usize {
        self.stages.iter().map(|stage| stage.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }
}
