use corvus_shared::TaskState;
use serde::{Deserialize, Serialize};

/// Derived view of a task's progress; never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// 0..=100, monotonically non-decreasing within one task's lifetime
    pub percent: u8,
    pub state: TaskState,
    /// Human-readable cause, present only on Failure
    pub error_message: Option<String>,
}

impl ProgressSnapshot {
    /// Derive a snapshot from subtask completion counts.
    ///
    /// An empty graph is trivially complete. A fatal outcome forces `Failure`
    /// regardless of the percent reached by other subtasks; an abort freezes
    /// the percent below 100 with state `Aborted`.
    pub fn derive(
        total: usize,
        completed: usize,
        started: bool,
        failure: Option<&str>,
        aborted: bool,
    ) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (100 * completed.min(total) / total) as u8
        };

        if let Some(cause) = failure {
            return Self {
                percent,
                state: TaskState::Failure,
                error_message: Some(cause.to_string()),
            };
        }

        // An abort that lands after the last unit completed changes nothing;
        // the task already ran to completion.
        if aborted && percent < 100 {
            return Self {
                percent,
                state: TaskState::Aborted,
                error_message: None,
            };
        }

        let state = if percent == 100 {
            TaskState::Success
        } else if started {
            TaskState::Running
        } else {
            TaskState::Created
        };

        Self {
            percent,
            state,
            error_message: None,
        }
    }

    /// Snapshot of a task known only from its completed ledger record
    pub fn completed() -> Self {
        Self {
            percent: 100,
            state: TaskState::Success,
            error_message: None,
        }
    }
}
